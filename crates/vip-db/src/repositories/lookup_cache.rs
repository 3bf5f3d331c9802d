//! PostgreSQL implementation of LookupCacheRepository
//!
//! Lazy invalidation only: stale rows stay until the next refresh overwrites
//! them. Concurrent refreshes for the same key race benignly (last write
//! wins, payloads are idempotent for a given instant).

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use vip_core::entities::CacheEntry;
use vip_core::error::DomainError;
use vip_core::traits::{LookupCacheRepository, RepoResult};
use vip_core::value_objects::AccountId;

use crate::mappers::cache_entry_from_model;
use crate::models::CacheEntryModel;

use super::error::map_db_error;

/// PostgreSQL implementation of LookupCacheRepository
#[derive(Clone)]
pub struct PgLookupCacheRepository {
    pool: PgPool,
}

impl PgLookupCacheRepository {
    /// Create a new PgLookupCacheRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LookupCacheRepository for PgLookupCacheRepository {
    #[instrument(skip(self))]
    async fn get(&self, account_id: &AccountId) -> RepoResult<Option<CacheEntry>> {
        let result = sqlx::query_as::<_, CacheEntryModel>(
            r#"
            SELECT account_id, payload, fetched_at
            FROM lookup_cache
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(cache_entry_from_model).transpose()
    }

    #[instrument(skip(self, entry), fields(account_id = %entry.account_id))]
    async fn put(&self, entry: &CacheEntry) -> RepoResult<()> {
        let payload = serde_json::to_value(&entry.payload)
            .map_err(|e| DomainError::InternalError(format!("cache payload encode: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO lookup_cache (account_id, payload, fetched_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (account_id) DO UPDATE SET
                payload = EXCLUDED.payload,
                fetched_at = EXCLUDED.fetched_at
            "#,
        )
        .bind(entry.account_id.as_str())
        .bind(payload)
        .bind(entry.fetched_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}
