//! # vip-common
//!
//! Shared utilities: environment-based configuration, application error type,
//! and tracing setup.

pub mod config;
pub mod error;
pub mod telemetry;

pub use config::{AppConfig, ConfigError, Environment};
pub use error::{AppError, AppResult};
pub use telemetry::{try_init_tracing, TracingConfig};
