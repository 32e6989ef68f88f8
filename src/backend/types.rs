//! Wire types exchanged with the KYC backend.

use serde::{Deserialize, Serialize};

use crate::application::{KycApplication, KycStatus};

/// Standard `{success, message, data}` envelope used by the AI endpoints.
///
/// `success` stays `None` when the field is missing so callers can decide
/// how strict to be.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

fn default_true() -> bool {
    true
}

/// `GET /user/kyc/{id}` answers `{message, data: {data, kyc_status}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchResponse {
    #[serde(default)]
    pub message: String,
    pub data: Option<FetchPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchPayload {
    pub data: Option<KycApplication>,
    pub kyc_status: Option<KycStatus>,
}

impl FetchResponse {
    /// The record with its status filled in from the outer `kyc_status`.
    pub fn into_application(self) -> Option<KycApplication> {
        let payload = self.data?;
        let mut app = payload.data?;
        if let Some(status) = payload.kyc_status {
            app.status = status;
        }
        Some(app)
    }
}

/// Locality returned for a resolved pin code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinLocality {
    #[serde(default)]
    pub pincode: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TamperCheckRequest<'a> {
    pub image_base64: &'a str,
    pub kyc_id: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TamperCheckResult {
    pub is_tampered: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LivenessCheckRequest<'a> {
    pub image_base64: &'a str,
}

/// Outcome of a liveness check that the backend answered successfully.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LivenessResult {
    /// Absent on older deployments, which only answer for live captures.
    #[serde(default = "default_true")]
    pub is_live: bool,
    #[serde(rename = "livenessScore", default)]
    pub score: f64,
    #[serde(rename = "livenessStatus", default)]
    pub status: String,
}
