//! Keyed entity storage.
//!
//! Every record type the portal persists goes through the same five
//! operations: create / get / patch / delete / list. A record type opts in by
//! implementing [`KeyedRecord`] (an entity name plus a deterministic key);
//! the storage backends are interchangeable behind the object-safe
//! [`EntityStore`] trait, with the typed API layered on top by
//! [`EntityStoreExt`].
//!
//! # Atomic create
//!
//! `create` is put-if-absent at the backend level, never an unguarded
//! existence-check-then-write. Concurrent creates racing on one key yield
//! exactly one winner; the losers see [`StoreError::AlreadyExists`]. The
//! in-memory backend holds its write lock across the whole check-and-insert;
//! the Postgres backend leans on `INSERT .. ON CONFLICT DO NOTHING`.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

mod entities;
mod memory;
mod pg;

pub use entities::{monthly_due_key, KEY_SEPARATOR};
pub use memory::MemoryStore;
pub use pg::{PgStore, ENV_DB_URL};

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// Failure modes of the entity store.
///
/// `AlreadyExists` and `NotFound` are caller-visible outcomes the ledger
/// branches on; `Backend` wraps infrastructure failures.
#[derive(Debug)]
pub enum StoreError {
    AlreadyExists { entity: &'static str, key: String },
    NotFound { entity: &'static str, key: String },
    Backend(anyhow::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::AlreadyExists { entity, key } => {
                write!(f, "{entity} '{key}' already exists")
            }
            StoreError::NotFound { entity, key } => {
                write!(f, "{entity} '{key}' not found")
            }
            StoreError::Backend(err) => write!(f, "storage backend error: {err}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Backend(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// KeyedRecord
// ---------------------------------------------------------------------------

/// A record type the store knows how to file.
///
/// `ENTITY` namespaces the key space: records live at `{entity}/{key}`, so
/// composite keys of one type cannot collide with keys of an unrelated type.
/// `key` must be deterministic over the record's identity fields: a plain id
/// for most types, `studentId:YYYY-MM` for monthly dues.
pub trait KeyedRecord: Serialize + DeserializeOwned + Send + Sync {
    const ENTITY: &'static str;

    fn key(&self) -> String;
}

// ---------------------------------------------------------------------------
// EntityStore (object-safe raw layer)
// ---------------------------------------------------------------------------

/// The five storage operations over raw JSON state.
///
/// Object-safe so handlers can share an `Arc<dyn EntityStore>`; call sites
/// use the typed [`EntityStoreExt`] methods instead of these directly.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Put-if-absent. `AlreadyExists` when the key is taken.
    async fn create_raw(
        &self,
        entity: &'static str,
        key: &str,
        state: Value,
    ) -> Result<(), StoreError>;

    async fn get_raw(&self, entity: &'static str, key: &str) -> Result<Option<Value>, StoreError>;

    /// Shallow-merge `partial`'s fields into the stored state. `NotFound`
    /// when the key is absent; this is not an upsert.
    async fn patch_raw(
        &self,
        entity: &'static str,
        key: &str,
        partial: Value,
    ) -> Result<Value, StoreError>;

    /// Remove record and index entry. `Ok(false)` when the key was absent.
    async fn delete_raw(&self, entity: &'static str, key: &str) -> Result<bool, StoreError>;

    /// Every record of the type, in insertion order.
    async fn list_raw(&self, entity: &'static str) -> Result<Vec<Value>, StoreError>;
}

// ---------------------------------------------------------------------------
// EntityStoreExt (typed layer)
// ---------------------------------------------------------------------------

/// Typed convenience layer over [`EntityStore`], blanket-implemented for
/// every backend (including `dyn EntityStore`).
#[async_trait]
pub trait EntityStoreExt: EntityStore {
    async fn create<T: KeyedRecord>(&self, record: &T) -> Result<(), StoreError> {
        let state = serde_json::to_value(record).map_err(|e| StoreError::Backend(e.into()))?;
        self.create_raw(T::ENTITY, &record.key(), state).await
    }

    async fn get<T: KeyedRecord>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.get_raw(T::ENTITY, key).await? {
            Some(state) => serde_json::from_value(state)
                .map(Some)
                .map_err(|e| StoreError::Backend(e.into())),
            None => Ok(None),
        }
    }

    async fn exists<T: KeyedRecord>(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get_raw(T::ENTITY, key).await?.is_some())
    }

    async fn patch<T: KeyedRecord>(&self, key: &str, partial: Value) -> Result<T, StoreError> {
        let merged = self.patch_raw(T::ENTITY, key, partial).await?;
        serde_json::from_value(merged).map_err(|e| StoreError::Backend(e.into()))
    }

    async fn delete<T: KeyedRecord>(&self, key: &str) -> Result<bool, StoreError> {
        self.delete_raw(T::ENTITY, key).await
    }

    async fn list<T: KeyedRecord>(&self) -> Result<Vec<T>, StoreError> {
        self.list_raw(T::ENTITY)
            .await?
            .into_iter()
            .map(|state| serde_json::from_value(state).map_err(|e| StoreError::Backend(e.into())))
            .collect()
    }
}

#[async_trait]
impl<S: EntityStore + ?Sized> EntityStoreExt for S {}
