//! PostgreSQL implementation of MetaRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use vip_core::traits::{MetaRepository, RepoResult};

use super::error::map_db_error;

/// PostgreSQL implementation of MetaRepository (small durable key/value table)
#[derive(Clone)]
pub struct PgMetaRepository {
    pool: PgPool,
}

impl PgMetaRepository {
    /// Create a new PgMetaRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MetaRepository for PgMetaRepository {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> RepoResult<Option<String>> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT value FROM meta WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn put(&self, key: &str, value: &str) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO meta (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}
