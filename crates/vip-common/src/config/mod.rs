//! Configuration loading

mod app_config;

pub use app_config::{
    AdmissionConfig, AffiliateConfig, AppConfig, AppSettings, ConfigError, DatabaseConfig,
    Environment, GatewayConfig, ReportConfig,
};
