//! Repository traits (ports) - define the interface for data access
//!
//! The membership store is the system of record; in-memory state never
//! survives a restart. Last-write-wins per row is acceptable, no multi-row
//! transactional guarantees are required.

use async_trait::async_trait;

use crate::entities::{CacheEntry, Member, TrackedAccount};
use crate::error::DomainError;
use crate::value_objects::{AccountId, ParticipantId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Member Repository
// ============================================================================

#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Find member by participant id
    async fn find(&self, id: ParticipantId) -> RepoResult<Option<Member>>;

    /// Insert or replace a member row (last-write-wins)
    async fn upsert(&self, member: &Member) -> RepoResult<()>;

    /// All members currently inside the group
    async fn list_active(&self) -> RepoResult<Vec<Member>>;

    /// Count of members currently inside the group
    async fn count_active(&self) -> RepoResult<i64>;
}

// ============================================================================
// Tracked Account Repository
// ============================================================================

#[async_trait]
pub trait TrackedAccountRepository: Send + Sync {
    /// Register an account id for aggregate reporting; idempotent
    async fn add(&self, account: &TrackedAccount) -> RepoResult<()>;

    /// All tracked accounts
    async fn list(&self) -> RepoResult<Vec<TrackedAccount>>;

    /// Count of tracked accounts
    async fn count(&self) -> RepoResult<i64>;
}

// ============================================================================
// Lookup Cache Repository
// ============================================================================

#[async_trait]
pub trait LookupCacheRepository: Send + Sync {
    /// Fetch the memoized lookup for an account id, stale or not
    async fn get(&self, account_id: &AccountId) -> RepoResult<Option<CacheEntry>>;

    /// Upsert a memoized lookup (concurrent refreshes race; last write wins)
    async fn put(&self, entry: &CacheEntry) -> RepoResult<()>;
}

// ============================================================================
// Meta Repository
// ============================================================================

#[async_trait]
pub trait MetaRepository: Send + Sync {
    /// Read a meta value (e.g. the monthly report cursor)
    async fn get(&self, key: &str) -> RepoResult<Option<String>>;

    /// Write a meta value
    async fn put(&self, key: &str, value: &str) -> RepoResult<()>;
}
