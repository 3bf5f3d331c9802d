//! PostgreSQL implementation of MemberRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use vip_core::entities::Member;
use vip_core::traits::{MemberRepository, RepoResult};
use vip_core::value_objects::ParticipantId;

use crate::mappers::member_from_model;
use crate::models::MemberModel;

use super::error::map_db_error;

/// PostgreSQL implementation of MemberRepository
#[derive(Clone)]
pub struct PgMemberRepository {
    pool: PgPool,
}

impl PgMemberRepository {
    /// Create a new PgMemberRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    #[instrument(skip(self))]
    async fn find(&self, id: ParticipantId) -> RepoResult<Option<Member>> {
        let result = sqlx::query_as::<_, MemberModel>(
            r#"
            SELECT participant_id, external_account_id, requested_at, joined_at,
                   membership_active, updated_at
            FROM members
            WHERE participant_id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(member_from_model).transpose()
    }

    #[instrument(skip(self, member), fields(participant_id = %member.participant_id))]
    async fn upsert(&self, member: &Member) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO members (participant_id, external_account_id, requested_at,
                                 joined_at, membership_active, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (participant_id) DO UPDATE SET
                external_account_id = EXCLUDED.external_account_id,
                requested_at = EXCLUDED.requested_at,
                joined_at = EXCLUDED.joined_at,
                membership_active = EXCLUDED.membership_active,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(member.participant_id.into_inner())
        .bind(member.external_account_id.as_ref().map(|a| a.as_str()))
        .bind(member.requested_at)
        .bind(member.joined_at)
        .bind(member.membership_active)
        .bind(member.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_active(&self) -> RepoResult<Vec<Member>> {
        let results = sqlx::query_as::<_, MemberModel>(
            r#"
            SELECT participant_id, external_account_id, requested_at, joined_at,
                   membership_active, updated_at
            FROM members
            WHERE membership_active
            ORDER BY joined_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(member_from_model).collect()
    }

    #[instrument(skip(self))]
    async fn count_active(&self) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM members WHERE membership_active
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }
}
