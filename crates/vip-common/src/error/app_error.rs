//! Application error type for the process boundary
//!
//! Everything below the binary speaks [`vip_core::DomainError`]; this type
//! adds the startup-only failure modes (configuration, storage connection)
//! that must stop the process rather than let it run with undefined state.

use vip_core::DomainError;

use crate::config::ConfigError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage unavailable: {0}")]
    Storage(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    /// Fatal errors stop startup instead of degrading
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Storage(_))
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_errors_are_fatal() {
        assert!(AppError::Config(ConfigError::MissingVar("BOT_TOKEN")).is_fatal());
        assert!(AppError::Storage("connection refused".into()).is_fatal());
    }

    #[test]
    fn test_domain_errors_are_not_fatal() {
        let err = AppError::Domain(DomainError::LookupFailed("timeout".into()));
        assert!(!err.is_fatal());
    }
}
