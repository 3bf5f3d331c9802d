//! PostgreSQL implementation of TrackedAccountRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use vip_core::entities::TrackedAccount;
use vip_core::traits::{RepoResult, TrackedAccountRepository};

use crate::mappers::tracked_account_from_model;
use crate::models::TrackedAccountModel;

use super::error::map_db_error;

/// PostgreSQL implementation of TrackedAccountRepository
#[derive(Clone)]
pub struct PgTrackedAccountRepository {
    pool: PgPool,
}

impl PgTrackedAccountRepository {
    /// Create a new PgTrackedAccountRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrackedAccountRepository for PgTrackedAccountRepository {
    #[instrument(skip(self, account), fields(account_id = %account.account_id))]
    async fn add(&self, account: &TrackedAccount) -> RepoResult<()> {
        // Idempotent: re-registering an id keeps the first source/added_at
        sqlx::query(
            r#"
            INSERT INTO tracked_accounts (account_id, source, added_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (account_id) DO NOTHING
            "#,
        )
        .bind(account.account_id.as_str())
        .bind(account.source.as_str())
        .bind(account.added_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self) -> RepoResult<Vec<TrackedAccount>> {
        let results = sqlx::query_as::<_, TrackedAccountModel>(
            r#"
            SELECT account_id, source, added_at
            FROM tracked_accounts
            ORDER BY added_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(tracked_account_from_model).collect()
    }

    #[instrument(skip(self))]
    async fn count(&self) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM tracked_accounts
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }
}
