//! Application configuration structs
//!
//! Loads configuration from environment variables (with `.env` support).

use chrono::Weekday;
use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub gateway: GatewayConfig,
    pub affiliate: AffiliateConfig,
    pub admission: AdmissionConfig,
    pub reports: ReportConfig,
    pub database: DatabaseConfig,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Messaging gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Bot credential for the platform adapter
    pub bot_token: String,
    /// The gated group managed by the engine
    pub group_id: i64,
    /// Participants allowed to issue admin commands; also the recipients of
    /// the monthly fleet report
    pub admin_ids: Vec<i64>,
}

/// Affiliate API configuration
#[derive(Debug, Clone)]
pub struct AffiliateConfig {
    pub base_url: String,
    pub api_key: String,
    pub api_secret: String,
    pub passphrase: String,
    /// The single tier value that qualifies for admission
    pub qualifying_tier: String,
    /// Verification cache TTL in seconds
    pub cache_ttl_seconds: u64,
}

/// Admission configuration
#[derive(Debug, Clone)]
pub struct AdmissionConfig {
    /// Secret code admitting a participant without affiliate verification
    pub bypass_code: String,
}

/// Recurring report configuration
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Day of week for the per-member progress nudge
    pub weekly_weekday: Weekday,
    /// Hour (UTC) for the weekly nudge
    pub weekly_hour: u32,
    /// Day of month on which the fleet report executes
    pub monthly_day: u32,
    /// Bound on concurrent affiliate lookups in batch jobs
    pub lookup_concurrency: usize,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

// Default value functions
fn default_app_name() -> String {
    "vip-gate".to_string()
}

fn default_base_url() -> String {
    "https://www.okx.com".to_string()
}

fn default_qualifying_tier() -> String {
    "2".to_string()
}

fn default_cache_ttl() -> u64 {
    600
}

fn default_weekly_hour() -> u32 {
    21
}

fn default_monthly_day() -> u32 {
    1
}

fn default_lookup_concurrency() -> usize {
    8
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or
    /// hold values that do not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
            },
            gateway: GatewayConfig {
                bot_token: env::var("BOT_TOKEN").map_err(|_| ConfigError::MissingVar("BOT_TOKEN"))?,
                group_id: env::var("VIP_GROUP_ID")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .ok_or(ConfigError::MissingVar("VIP_GROUP_ID"))?,
                admin_ids: parse_id_list("ADMIN_IDS")?,
            },
            affiliate: AffiliateConfig {
                base_url: env::var("AFFILIATE_BASE_URL").unwrap_or_else(|_| default_base_url()),
                api_key: env::var("AFFILIATE_API_KEY")
                    .map_err(|_| ConfigError::MissingVar("AFFILIATE_API_KEY"))?,
                api_secret: env::var("AFFILIATE_API_SECRET")
                    .map_err(|_| ConfigError::MissingVar("AFFILIATE_API_SECRET"))?,
                passphrase: env::var("AFFILIATE_API_PASSPHRASE")
                    .map_err(|_| ConfigError::MissingVar("AFFILIATE_API_PASSPHRASE"))?,
                qualifying_tier: env::var("QUALIFYING_TIER")
                    .unwrap_or_else(|_| default_qualifying_tier()),
                cache_ttl_seconds: env::var("CACHE_TTL_SECONDS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_cache_ttl),
            },
            admission: AdmissionConfig {
                bypass_code: env::var("BYPASS_CODE")
                    .map_err(|_| ConfigError::MissingVar("BYPASS_CODE"))?,
            },
            reports: ReportConfig {
                weekly_weekday: match env::var("WEEKLY_REPORT_WEEKDAY") {
                    Ok(s) => s
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("WEEKLY_REPORT_WEEKDAY", s))?,
                    Err(_) => Weekday::Sun,
                },
                weekly_hour: env::var("WEEKLY_REPORT_HOUR")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_weekly_hour),
                monthly_day: env::var("MONTHLY_REPORT_DAY")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_monthly_day),
                lookup_concurrency: env::var("LOOKUP_CONCURRENCY")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_lookup_concurrency),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_max_connections),
                min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_min_connections),
            },
        })
    }
}

/// Parse a comma-separated list of i64 ids from an optional variable
fn parse_id_list(var: &'static str) -> Result<Vec<i64>, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse()
                    .map_err(|_| ConfigError::InvalidValue(var, s.to_string()))
            })
            .collect(),
        Err(_) => Ok(Vec::new()),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
