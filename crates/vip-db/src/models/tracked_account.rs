//! Tracked account database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the tracked_accounts table
#[derive(Debug, Clone, FromRow)]
pub struct TrackedAccountModel {
    pub account_id: String,
    pub source: String,
    pub added_at: DateTime<Utc>,
}
