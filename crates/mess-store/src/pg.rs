//! Postgres backend.
//!
//! One `entities` table holds every record: `(entity_name, key)` is the
//! primary key, `state` is the record's JSON, and a bigserial `seq` gives
//! insertion order for listing. Uniqueness is enforced by the database, not
//! by a check-then-write in application code; `create` is
//! `INSERT .. ON CONFLICT DO NOTHING` and `patch` is the server-side jsonb
//! shallow merge, so both are atomic under concurrent requests.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::{EntityStore, StoreError};

pub const ENV_DB_URL: &str = "MESS_DATABASE_URL";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect using MESS_DATABASE_URL.
    pub async fn connect_from_env() -> Result<Self> {
        let url = std::env::var(ENV_DB_URL)
            .with_context(|| format!("missing env var {ENV_DB_URL}"))?;

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&url)
            .await
            .context("failed to connect to Postgres")?;

        Ok(Self::new(pool))
    }

    /// Run embedded SQLx migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("db migrate failed")?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.into())
}

#[async_trait]
impl EntityStore for PgStore {
    async fn create_raw(
        &self,
        entity: &'static str,
        key: &str,
        state: Value,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            insert into entities (entity_name, key, state)
            values ($1, $2, $3)
            on conflict do nothing
            "#,
        )
        .bind(entity)
        .bind(key)
        .bind(state)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AlreadyExists {
                entity,
                key: key.to_string(),
            });
        }
        Ok(())
    }

    async fn get_raw(&self, entity: &'static str, key: &str) -> Result<Option<Value>, StoreError> {
        sqlx::query_scalar::<_, Value>(
            "select state from entities where entity_name = $1 and key = $2",
        )
        .bind(entity)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)
    }

    async fn patch_raw(
        &self,
        entity: &'static str,
        key: &str,
        partial: Value,
    ) -> Result<Value, StoreError> {
        if !partial.is_object() {
            return Err(StoreError::Backend(anyhow!(
                "patch partial must be a JSON object"
            )));
        }

        // `||` shallow-merges jsonb objects in a single atomic statement.
        sqlx::query_scalar::<_, Value>(
            r#"
            update entities
               set state = state || $3
             where entity_name = $1 and key = $2
            returning state
            "#,
        )
        .bind(entity)
        .bind(key)
        .bind(partial)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?
        .ok_or_else(|| StoreError::NotFound {
            entity,
            key: key.to_string(),
        })
    }

    async fn delete_raw(&self, entity: &'static str, key: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("delete from entities where entity_name = $1 and key = $2")
            .bind(entity)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_raw(&self, entity: &'static str) -> Result<Vec<Value>, StoreError> {
        sqlx::query_scalar::<_, Value>(
            "select state from entities where entity_name = $1 order by seq",
        )
        .bind(entity)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)
    }
}
