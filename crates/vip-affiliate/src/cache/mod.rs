//! Verification cache - short-TTL memoization of affiliate lookups
//!
//! Wraps any [`AffiliateLookup`] so repeated checks for the same account id
//! within the TTL never hit the upstream API. `NotFound` answers are cached
//! (repeated invalid-UID submissions must not hammer the upstream), transient
//! `LookupFailed` errors never are.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

use vip_core::entities::{CacheEntry, LookupOutcome};
use vip_core::error::DomainError;
use vip_core::traits::{AffiliateLookup, LookupCacheRepository};
use vip_core::value_objects::AccountId;

/// TTL-memoizing decorator over an affiliate lookup
pub struct CachedLookup<L> {
    inner: L,
    store: Arc<dyn LookupCacheRepository>,
    ttl: Duration,
}

impl<L: AffiliateLookup> CachedLookup<L> {
    /// Create with a TTL in seconds (default configuration: 600)
    pub fn new(inner: L, store: Arc<dyn LookupCacheRepository>, ttl_seconds: u64) -> Self {
        Self {
            inner,
            store,
            ttl: Duration::seconds(ttl_seconds.min(i64::MAX as u64) as i64),
        }
    }
}

#[async_trait]
impl<L: AffiliateLookup> AffiliateLookup for CachedLookup<L> {
    async fn fetch_detail(&self, account_id: &AccountId) -> Result<LookupOutcome, DomainError> {
        let now = Utc::now();

        if let Some(entry) = self.store.get(account_id).await? {
            if !entry.is_stale(now, self.ttl) {
                debug!(account_id = %account_id, "verification cache hit");
                return Ok(entry.payload);
            }
        }

        // Miss or stale: refresh through the client. Transient failures
        // propagate uncached so the next attempt retries upstream.
        let outcome = self.inner.fetch_detail(account_id).await?;

        let entry = CacheEntry::new(account_id.clone(), outcome.clone(), now);
        if let Err(e) = self.store.put(&entry).await {
            // The cache is an optimization; a failed write must not turn a
            // successful lookup into an error.
            warn!(account_id = %account_id, error = %e, "cache write failed");
        }

        Ok(outcome)
    }
}
