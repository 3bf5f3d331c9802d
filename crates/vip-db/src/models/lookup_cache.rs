//! Lookup cache database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the lookup_cache table
#[derive(Debug, Clone, FromRow)]
pub struct CacheEntryModel {
    pub account_id: String,
    /// Serialized `LookupOutcome`
    pub payload: serde_json::Value,
    pub fetched_at: DateTime<Utc>,
}
