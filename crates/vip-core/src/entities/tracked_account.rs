//! Tracked account - an account id included in aggregate reporting
//! without implying active group membership

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::AccountId;

/// Where a tracked account came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackedSource {
    /// Registered automatically at member admission
    Member,
    /// Added by an admin command
    Manual,
}

impl TrackedSource {
    /// Stable string tag used in storage
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Manual => "manual",
        }
    }

    /// Parse the storage tag; unknown tags map to `Manual`
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "member" => Self::Member,
            _ => Self::Manual,
        }
    }
}

/// Externally-sourced account id for fleet-wide aggregation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedAccount {
    pub account_id: AccountId,
    pub source: TrackedSource,
    pub added_at: DateTime<Utc>,
}

impl TrackedAccount {
    /// Create a new tracked account
    pub fn new(account_id: AccountId, source: TrackedSource, now: DateTime<Utc>) -> Self {
        Self {
            account_id,
            source,
            added_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_tag_roundtrip() {
        assert_eq!(TrackedSource::from_tag("member"), TrackedSource::Member);
        assert_eq!(TrackedSource::from_tag("manual"), TrackedSource::Manual);
        assert_eq!(TrackedSource::Member.as_str(), "member");
        assert_eq!(TrackedSource::Manual.as_str(), "manual");
    }

    #[test]
    fn test_unknown_tag_defaults_to_manual() {
        assert_eq!(TrackedSource::from_tag("import"), TrackedSource::Manual);
    }
}
