//! `KycBackend` trait: every collaborator the wizard talks to, behind one
//! async interface.

use async_trait::async_trait;

use crate::application::{AddressSlice, DocumentsSlice, KycApplication, LivenessSlice, PersonalSlice};
use crate::error::TransportError;

use super::types::{LivenessResult, PinLocality, TamperCheckResult};

/// Backend collaborators consumed by the wizard.
///
/// Images always cross this boundary as encoded strings.
#[async_trait]
pub trait KycBackend: Send + Sync {
    // ── Application record ──────────────────────────────────────────

    /// Fetch the application snapshot. `Ok(None)` when no record exists.
    async fn fetch_application(&self, id: &str) -> Result<Option<KycApplication>, TransportError>;

    async fn save_personal(&self, id: &str, slice: &PersonalSlice) -> Result<(), TransportError>;

    async fn save_address(&self, id: &str, slice: &AddressSlice) -> Result<(), TransportError>;

    async fn save_documents(&self, id: &str, slice: &DocumentsSlice)
    -> Result<(), TransportError>;

    async fn save_liveness(&self, id: &str, slice: &LivenessSlice) -> Result<(), TransportError>;

    /// Finalise the application, moving it out of `pending`.
    async fn submit(&self, id: &str) -> Result<(), TransportError>;

    /// Generated summary document (PDF bytes).
    async fn summary_document(&self, id: &str) -> Result<Vec<u8>, TransportError>;

    // ── Verification services ───────────────────────────────────────

    /// Resolve a 6-digit pin code. `Ok(None)` when the code is unknown.
    async fn lookup_pin_code(&self, zip: &str) -> Result<Option<PinLocality>, TransportError>;

    /// Check a document image for manipulation. A refusal by the service is
    /// reported as `TransportError::Rejected`.
    async fn tamper_check(&self, id: &str, image: &str)
    -> Result<TamperCheckResult, TransportError>;

    /// Check a bare base64 selfie for liveness. A refusal by the service is
    /// reported as `TransportError::Rejected`.
    async fn liveness_check(&self, image: &str) -> Result<LivenessResult, TransportError>;
}
