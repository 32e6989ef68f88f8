//! HTTP implementation of [`KycBackend`] over `reqwest`.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::application::{AddressSlice, DocumentsSlice, KycApplication, LivenessSlice, PersonalSlice};
use crate::config::WizardConfig;
use crate::error::TransportError;

use super::traits::KycBackend;
use super::types::{
    Envelope, FetchResponse, LivenessCheckRequest, LivenessResult, PinLocality,
    TamperCheckRequest, TamperCheckResult,
};

/// Talks to the KYC REST API rooted at `base_url` (which includes `/api`).
pub struct HttpBackend {
    base_url: String,
    token: Option<SecretString>,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, token: Option<SecretString>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &WizardConfig) -> Self {
        Self::new(config.api_base_url.clone(), config.api_token.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token.expose_secret()),
            None => req,
        }
    }

    async fn send(
        &self,
        endpoint: &str,
        req: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, TransportError> {
        let resp = self
            .authorize(req)
            .send()
            .await
            .map_err(|e| TransportError::Request {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(TransportError::NotFound {
                endpoint: endpoint.to_string(),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(endpoint, status = status.as_u16(), body = %truncate(&body, 200), "Backend call failed");
            return Err(TransportError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp)
    }

    async fn decode<T: DeserializeOwned>(
        endpoint: &str,
        resp: reqwest::Response,
    ) -> Result<T, TransportError> {
        resp.json::<T>().await.map_err(|e| TransportError::Decode {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }

    async fn post_slice<B: Serialize + Sync>(
        &self,
        id: &str,
        step: &str,
        body: &B,
    ) -> Result<(), TransportError> {
        let endpoint = format!("kyc/{step}");
        let req = self
            .client
            .post(self.url(&format!("/user/kyc/{id}/{step}")))
            .json(body);
        self.send(&endpoint, req).await?;
        debug!(application_id = id, step, "Slice saved");
        Ok(())
    }

    /// Unwrap a `{success, message, data}` envelope. Anything other than an
    /// explicit `success: true` is a rejection carrying the backend's message.
    async fn envelope<T: DeserializeOwned>(
        endpoint: &str,
        resp: reqwest::Response,
    ) -> Result<Envelope<T>, TransportError> {
        let env: Envelope<T> = Self::decode(endpoint, resp).await?;
        if env.success != Some(true) {
            return Err(TransportError::Rejected {
                endpoint: endpoint.to_string(),
                message: env.message,
            });
        }
        Ok(env)
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[async_trait]
impl KycBackend for HttpBackend {
    async fn fetch_application(&self, id: &str) -> Result<Option<KycApplication>, TransportError> {
        let endpoint = "kyc/fetch";
        let req = self.client.get(self.url(&format!("/user/kyc/{id}")));
        let resp = match self.send(endpoint, req).await {
            Ok(resp) => resp,
            Err(TransportError::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        let body: FetchResponse = Self::decode(endpoint, resp).await?;
        Ok(body.into_application())
    }

    async fn save_personal(&self, id: &str, slice: &PersonalSlice) -> Result<(), TransportError> {
        self.post_slice(id, "personal", slice).await
    }

    async fn save_address(&self, id: &str, slice: &AddressSlice) -> Result<(), TransportError> {
        self.post_slice(id, "address", slice).await
    }

    async fn save_documents(
        &self,
        id: &str,
        slice: &DocumentsSlice,
    ) -> Result<(), TransportError> {
        self.post_slice(id, "documents", slice).await
    }

    async fn save_liveness(&self, id: &str, slice: &LivenessSlice) -> Result<(), TransportError> {
        self.post_slice(id, "liveness", slice).await
    }

    async fn submit(&self, id: &str) -> Result<(), TransportError> {
        let req = self.client.get(self.url(&format!("/user/kyc/{id}/submit")));
        self.send("kyc/submit", req).await?;
        Ok(())
    }

    async fn summary_document(&self, id: &str) -> Result<Vec<u8>, TransportError> {
        let endpoint = "kyc/pdf";
        let req = self.client.get(self.url(&format!("/user/kyc/{id}/pdf")));
        let resp = self.send(endpoint, req).await?;
        let bytes = resp.bytes().await.map_err(|e| TransportError::Decode {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        Ok(bytes.to_vec())
    }

    async fn lookup_pin_code(&self, zip: &str) -> Result<Option<PinLocality>, TransportError> {
        let endpoint = "ai/pin";
        let req = self
            .client
            .get(self.url("/ai/pin/data"))
            .query(&[("pin_code", zip)]);
        let resp = match self.send(endpoint, req).await {
            Ok(resp) => resp,
            Err(TransportError::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        // An unknown code comes back as `success: false`, not as an error.
        // Older deployments omit the flag on hits.
        let env: Envelope<PinLocality> = Self::decode(endpoint, resp).await?;
        if env.success == Some(false) {
            debug!(zip, message = %env.message, "Pin code not found");
            return Ok(None);
        }
        Ok(env.data)
    }

    async fn tamper_check(
        &self,
        id: &str,
        image: &str,
    ) -> Result<TamperCheckResult, TransportError> {
        let endpoint = "ai/tamper-check";
        let req = self
            .client
            .post(self.url("/ai/tamper-check"))
            .json(&TamperCheckRequest {
                image_base64: image,
                kyc_id: id,
            });
        let resp = self.send(endpoint, req).await?;
        let env: Envelope<TamperCheckResult> = Self::envelope(endpoint, resp).await?;
        env.data.ok_or_else(|| TransportError::Decode {
            endpoint: endpoint.to_string(),
            reason: "missing data".to_string(),
        })
    }

    async fn liveness_check(&self, image: &str) -> Result<LivenessResult, TransportError> {
        let endpoint = "ai/liveness-check";
        let req = self
            .client
            .post(self.url("/ai/liveness-check"))
            .json(&LivenessCheckRequest {
                image_base64: image,
            });
        let resp = self.send(endpoint, req).await?;
        let env: Envelope<LivenessResult> = Self::envelope(endpoint, resp).await?;
        env.data.ok_or_else(|| TransportError::Decode {
            endpoint: endpoint.to_string(),
            reason: "missing data".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let backend = HttpBackend::new("http://localhost:8000/api/", None);
        assert_eq!(
            backend.url("/user/kyc/abc"),
            "http://localhost:8000/api/user/kyc/abc"
        );
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
