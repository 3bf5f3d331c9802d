//! Signed request client for the affiliate API

mod protocol;

pub use protocol::{format_server_timestamp, normalize_detail, sign_request, ApiResponse, InviteeDetail};

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

use vip_core::entities::LookupOutcome;
use vip_core::error::DomainError;
use vip_core::traits::AffiliateLookup;
use vip_core::value_objects::AccountId;

use protocol::TimePayload;

/// Public time endpoint (trusted timestamp source for signatures)
const TIME_PATH: &str = "/api/v5/public/time";

/// Affiliate detail endpoint; query string is part of the signed path
const DETAIL_PATH: &str = "/api/v5/affiliate/invitee/detail";

/// Credentials and endpoint for the affiliate API
#[derive(Debug, Clone)]
pub struct AffiliateClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub api_secret: String,
    pub passphrase: String,
}

/// HTTP client issuing timestamped, HMAC-signed requests to the affiliate API.
///
/// The signing timestamp always comes from the service's own time endpoint,
/// never the local clock, so client clock skew cannot invalidate signatures.
pub struct AffiliateClient {
    http: reqwest::Client,
    config: AffiliateClientConfig,
}

impl AffiliateClient {
    /// Create a new client with sane request timeouts
    pub fn new(config: AffiliateClientConfig) -> Result<Self, DomainError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| DomainError::InternalError(format!("http client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Fetch the server time as an ISO-8601 millisecond timestamp (`Z` suffix)
    async fn server_time(&self) -> Result<String, DomainError> {
        let url = format!("{}{}", self.config.base_url, TIME_PATH);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| DomainError::LookupFailed(format!("time endpoint: {e}")))?;

        if !response.status().is_success() {
            return Err(DomainError::LookupFailed(format!(
                "time endpoint returned {}",
                response.status()
            )));
        }

        let body: ApiResponse<TimePayload> = response
            .json()
            .await
            .map_err(|e| DomainError::LookupFailed(format!("time endpoint body: {e}")))?;

        let ts_ms: i64 = body
            .data
            .first()
            .and_then(|t| t.ts.parse().ok())
            .ok_or_else(|| DomainError::LookupFailed("time endpoint: missing ts".to_string()))?;

        format_server_timestamp(ts_ms)
            .ok_or_else(|| DomainError::LookupFailed(format!("time endpoint: bad ts {ts_ms}")))
    }
}

#[async_trait]
impl AffiliateLookup for AffiliateClient {
    #[instrument(skip(self), fields(account_id = %account_id))]
    async fn fetch_detail(&self, account_id: &AccountId) -> Result<LookupOutcome, DomainError> {
        let timestamp = self.server_time().await?;
        let request_path = format!("{DETAIL_PATH}?uid={account_id}");
        let signature = sign_request(&self.config.api_secret, &timestamp, "GET", &request_path, "")?;

        let url = format!("{}{}", self.config.base_url, request_path);
        let response = self
            .http
            .get(&url)
            .header("OK-ACCESS-KEY", &self.config.api_key)
            .header("OK-ACCESS-SIGN", signature)
            .header("OK-ACCESS-TIMESTAMP", timestamp)
            .header("OK-ACCESS-PASSPHRASE", &self.config.passphrase)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| DomainError::LookupFailed(format!("affiliate detail: {e}")))?;

        if !response.status().is_success() {
            return Err(DomainError::LookupFailed(format!(
                "affiliate detail returned {}",
                response.status()
            )));
        }

        let body: ApiResponse<InviteeDetail> = response
            .json()
            .await
            .map_err(|e| DomainError::LookupFailed(format!("affiliate detail body: {e}")))?;

        let outcome = normalize_detail(&body);
        debug!(code = %body.code, found = outcome.info().is_some(), "affiliate detail fetched");
        Ok(outcome)
    }
}
