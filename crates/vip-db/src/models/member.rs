//! Member database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the members table
#[derive(Debug, Clone, FromRow)]
pub struct MemberModel {
    pub participant_id: i64,
    pub external_account_id: Option<String>,
    pub requested_at: Option<DateTime<Utc>>,
    pub joined_at: Option<DateTime<Utc>>,
    pub membership_active: bool,
    pub updated_at: DateTime<Utc>,
}
