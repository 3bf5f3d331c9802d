//! Affiliate lookup port

use async_trait::async_trait;

use crate::entities::LookupOutcome;
use crate::error::DomainError;
use crate::value_objects::AccountId;

/// Lookup of affiliate detail for an account id.
///
/// Implemented by the signed request client and, transparently, by the
/// verification cache that wraps it. `Err(LookupFailed)` means "could not
/// determine"; `Ok(NotFound)` means "not a recognized affiliate".
#[async_trait]
pub trait AffiliateLookup: Send + Sync {
    async fn fetch_detail(&self, account_id: &AccountId) -> Result<LookupOutcome, DomainError>;
}
