//! In-memory backend. Used by the scenario tests and by single-process dev
//! runs where no database is configured.

use std::collections::HashMap;

use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::{EntityStore, StoreError};

/// One entity type's storage: the records keyed `{key} -> state`, plus the
/// index of existing keys in insertion order. Both live under the same lock,
/// so they cannot diverge.
#[derive(Default)]
struct Bucket {
    records: HashMap<String, Value>,
    index: Vec<String>,
}

#[derive(Default)]
pub struct MemoryStore {
    buckets: RwLock<HashMap<&'static str, Bucket>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The index keys of one entity type, in insertion order. Test hook for
    /// asserting record/index consistency.
    pub async fn index_keys(&self, entity: &'static str) -> Vec<String> {
        let buckets = self.buckets.read().await;
        buckets
            .get(entity)
            .map(|b| b.index.clone())
            .unwrap_or_default()
    }
}

/// Shallow-merge `partial`'s top-level fields into `state`. Both must be
/// JSON objects.
fn merge_fields(state: &mut Value, partial: Value) -> Result<(), StoreError> {
    let Value::Object(patch) = partial else {
        return Err(StoreError::Backend(anyhow!(
            "patch partial must be a JSON object"
        )));
    };
    let Value::Object(target) = state else {
        return Err(StoreError::Backend(anyhow!(
            "stored state is not a JSON object"
        )));
    };
    for (k, v) in patch {
        target.insert(k, v);
    }
    Ok(())
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn create_raw(
        &self,
        entity: &'static str,
        key: &str,
        state: Value,
    ) -> Result<(), StoreError> {
        // Single write lock across the existence check and the insert: the
        // put-if-absent contract for this backend.
        let mut buckets = self.buckets.write().await;
        let bucket = buckets.entry(entity).or_default();
        if bucket.records.contains_key(key) {
            return Err(StoreError::AlreadyExists {
                entity,
                key: key.to_string(),
            });
        }
        bucket.records.insert(key.to_string(), state);
        bucket.index.push(key.to_string());
        Ok(())
    }

    async fn get_raw(&self, entity: &'static str, key: &str) -> Result<Option<Value>, StoreError> {
        let buckets = self.buckets.read().await;
        Ok(buckets
            .get(entity)
            .and_then(|b| b.records.get(key))
            .cloned())
    }

    async fn patch_raw(
        &self,
        entity: &'static str,
        key: &str,
        partial: Value,
    ) -> Result<Value, StoreError> {
        let mut buckets = self.buckets.write().await;
        let state = buckets
            .get_mut(entity)
            .and_then(|b| b.records.get_mut(key))
            .ok_or_else(|| StoreError::NotFound {
                entity,
                key: key.to_string(),
            })?;
        merge_fields(state, partial)?;
        Ok(state.clone())
    }

    async fn delete_raw(&self, entity: &'static str, key: &str) -> Result<bool, StoreError> {
        let mut buckets = self.buckets.write().await;
        let Some(bucket) = buckets.get_mut(entity) else {
            return Ok(false);
        };
        let removed = bucket.records.remove(key).is_some();
        if removed {
            bucket.index.retain(|k| k != key);
        }
        Ok(removed)
    }

    async fn list_raw(&self, entity: &'static str) -> Result<Vec<Value>, StoreError> {
        let buckets = self.buckets.read().await;
        let Some(bucket) = buckets.get(entity) else {
            return Ok(Vec::new());
        };
        // The index is authoritative for ordering; every indexed key has a
        // record because both are written under one lock.
        bucket
            .index
            .iter()
            .map(|k| {
                bucket.records.get(k).cloned().ok_or_else(|| {
                    StoreError::Backend(anyhow!("index entry '{k}' has no record"))
                })
            })
            .collect()
    }
}
