//! Wire protocol: signature construction and response normalization
//!
//! The signature input is the exact concatenation
//! `timestamp + method + path(+query) + body`, HMAC-SHA256 over the shared
//! secret, base64-encoded. Response envelopes carry a string status `code`
//! ("0" is success) and a `data` array; numeric fields arrive as strings.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{TimeZone, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use vip_core::entities::{AffiliateInfo, LookupOutcome};
use vip_core::error::DomainError;

type HmacSha256 = Hmac<Sha256>;

/// Success sentinel of the upstream status `code` field
const SUCCESS_CODE: &str = "0";

/// Generic response envelope
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub code: String,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Payload of the public time endpoint (`ts` is epoch milliseconds)
#[derive(Debug, Deserialize)]
pub(crate) struct TimePayload {
    #[serde(default)]
    pub ts: String,
}

/// One record of the affiliate detail endpoint
#[derive(Debug, Deserialize)]
pub struct InviteeDetail {
    #[serde(rename = "volMonth", default)]
    pub vol_month: Option<String>,
    #[serde(rename = "totalCommission", default)]
    pub total_commission: Option<String>,
    #[serde(rename = "inviteeLevel", default)]
    pub invitee_level: Option<String>,
    #[serde(rename = "affiliateCode", default)]
    pub affiliate_code: Option<String>,
}

/// Compute the request signature: base64(HMAC-SHA256(secret, ts+method+path+body))
pub fn sign_request(
    secret: &str,
    timestamp: &str,
    method: &str,
    request_path: &str,
    body: &str,
) -> Result<String, DomainError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| DomainError::InternalError(format!("hmac key: {e}")))?;
    mac.update(timestamp.as_bytes());
    mac.update(method.as_bytes());
    mac.update(request_path.as_bytes());
    mac.update(body.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

/// Format epoch milliseconds as ISO-8601 with millisecond precision and `Z`
pub fn format_server_timestamp(ts_ms: i64) -> Option<String> {
    Utc.timestamp_millis_opt(ts_ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
}

/// Normalize an affiliate detail response into a lookup outcome.
///
/// `code != "0"` or an empty data array means "not a recognized affiliate";
/// missing numeric fields parse to zero and a missing tier to "".
pub fn normalize_detail(response: &ApiResponse<InviteeDetail>) -> LookupOutcome {
    if response.code != SUCCESS_CODE {
        return LookupOutcome::NotFound;
    }
    let Some(detail) = response.data.first() else {
        return LookupOutcome::NotFound;
    };

    LookupOutcome::Found(AffiliateInfo {
        monthly_volume: parse_decimal(detail.vol_month.as_deref()),
        total_commission: parse_decimal(detail.total_commission.as_deref()),
        tier: detail.invitee_level.clone().unwrap_or_default(),
    })
}

/// Tolerant decimal parse; missing or malformed values count as zero
fn parse_decimal(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(0.0)
}
