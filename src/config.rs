//! Configuration types.

use secrecy::SecretString;

use crate::error::ConfigError;

const MIB: u64 = 1024 * 1024;

/// Wizard configuration.
#[derive(Debug, Clone)]
pub struct WizardConfig {
    /// Base URL of the KYC backend, including the `/api` prefix.
    pub api_base_url: String,
    /// Bearer token sent with every backend request, if set.
    pub api_token: Option<SecretString>,
    /// Upload ceiling for address-proof documents.
    pub max_upload_bytes: u64,
    /// Upload ceiling for the applicant photo.
    pub max_photo_bytes: u64,
    /// Country filled in on a successful pin code lookup.
    pub default_country: String,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            api_token: None,
            max_upload_bytes: 100 * MIB,
            max_photo_bytes: 5 * MIB,
            default_country: "India".to_string(),
        }
    }
}

impl WizardConfig {
    /// Build configuration from `KYRA_*` environment variables, falling back
    /// to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_base_url = std::env::var("KYRA_API_BASE_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);

        let api_token = std::env::var("KYRA_API_TOKEN")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(SecretString::from);

        let max_upload_bytes = parse_bytes("KYRA_MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?;
        let max_photo_bytes = parse_bytes("KYRA_MAX_PHOTO_BYTES", defaults.max_photo_bytes)?;

        let default_country = std::env::var("KYRA_DEFAULT_COUNTRY")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.default_country);

        Ok(Self {
            api_base_url,
            api_token,
            max_upload_bytes,
            max_photo_bytes,
            default_country,
        })
    }
}

fn parse_bytes(key: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(0) => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: "must be greater than zero".to_string(),
            }),
            Ok(v) => Ok(v),
            Err(e) => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }),
        },
        Err(_) => Ok(default),
    }
}
