//! Domain errors - error taxonomy for the verification engine
//!
//! The taxonomy matters operationally:
//! - `LookupFailed` is transient: never cached, never fatal, retried
//!   naturally at the next checkpoint or user action.
//! - `InvalidAccountId` is local and user-facing: no state mutation.
//! - `DeliveryFailed` is logged-and-skipped per recipient in batch contexts,
//!   but aborts an interactive admission before approval has been granted.
//!
//! "Account id is not a recognized affiliate" is deliberately *not* an error;
//! it is [`crate::entities::LookupOutcome::NotFound`] and is cached.

use thiserror::Error;

use crate::value_objects::ParticipantId;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    /// Upstream affiliate API unreachable, rate-limited, or malformed.
    /// Transient: "could not determine", not "not an affiliate".
    #[error("Affiliate lookup failed: {0}")]
    LookupFailed(String),

    /// Submitted text is neither a numeric account id nor the bypass code
    #[error("Invalid account id: {0}")]
    InvalidAccountId(String),

    /// Messaging gateway call failed
    #[error("Message delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Member not found: {0}")]
    MemberNotFound(ParticipantId),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::LookupFailed(_) => "LOOKUP_FAILED",
            Self::InvalidAccountId(_) => "INVALID_ACCOUNT_ID",
            Self::DeliveryFailed(_) => "DELIVERY_FAILED",
            Self::MemberNotFound(_) => "UNKNOWN_MEMBER",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Transient errors are safe to retry and must never be memoized
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::LookupFailed(_) | Self::DeliveryFailed(_))
    }
}
