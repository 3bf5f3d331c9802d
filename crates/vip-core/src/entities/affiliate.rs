//! Affiliate lookup results and the memoized cache entry

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::AccountId;

/// Normalized affiliate detail for one account
///
/// Numeric fields default to zero and the tier to an empty string when the
/// upstream response omits them, so partial API payloads stay usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AffiliateInfo {
    /// Current-month trading volume (rolling month-to-date figure)
    pub monthly_volume: f64,
    /// Lifetime commission generated by the account
    pub total_commission: f64,
    /// API-provided classification; only one value qualifies for admission
    pub tier: String,
}

/// Outcome of a successful affiliate lookup.
///
/// `NotFound` means "this account id is not a recognized affiliate" and is a
/// normal, cacheable answer. A transport or upstream failure is *not* an
/// outcome; it surfaces as [`crate::DomainError::LookupFailed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LookupOutcome {
    Found(AffiliateInfo),
    NotFound,
}

impl LookupOutcome {
    /// Affiliate info, if the account was recognized
    pub fn info(&self) -> Option<&AffiliateInfo> {
        match self {
            Self::Found(info) => Some(info),
            Self::NotFound => None,
        }
    }
}

/// Memoized lookup keyed by account id; lazily invalidated
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub account_id: AccountId,
    pub payload: LookupOutcome,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create an entry fetched at `now`
    pub fn new(account_id: AccountId, payload: LookupOutcome, now: DateTime<Utc>) -> Self {
        Self {
            account_id,
            payload,
            fetched_at: now,
        }
    }

    /// Stale entries are refreshed transparently on the next read
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.fetched_at > ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(age_secs: i64, now: DateTime<Utc>) -> CacheEntry {
        CacheEntry::new(
            AccountId::parse("555").unwrap(),
            LookupOutcome::NotFound,
            now - Duration::seconds(age_secs),
        )
    }

    #[test]
    fn test_entry_fresh_within_ttl() {
        let now = Utc::now();
        let ttl = Duration::seconds(600);
        assert!(!entry(0, now).is_stale(now, ttl));
        assert!(!entry(600, now).is_stale(now, ttl));
    }

    #[test]
    fn test_entry_stale_past_ttl() {
        let now = Utc::now();
        let ttl = Duration::seconds(600);
        assert!(entry(601, now).is_stale(now, ttl));
    }

    #[test]
    fn test_outcome_serde_roundtrip() {
        let outcome = LookupOutcome::Found(AffiliateInfo {
            monthly_volume: 30000.0,
            total_commission: 12.5,
            tier: "2".to_string(),
        });
        let json = serde_json::to_string(&outcome).unwrap();
        let back: LookupOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outcome);

        let json = serde_json::to_string(&LookupOutcome::NotFound).unwrap();
        let back: LookupOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, LookupOutcome::NotFound);
    }

    #[test]
    fn test_info_accessor() {
        assert!(LookupOutcome::NotFound.info().is_none());
        let info = AffiliateInfo::default();
        assert_eq!(LookupOutcome::Found(info.clone()).info(), Some(&info));
    }
}
