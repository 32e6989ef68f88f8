//! DocumentVerificationClient: tamper screening of uploaded documents and
//! the liveness capture session.
//!
//! The camera is held through a [`CameraLease`] stored on the client. Every
//! path that must give the camera back (capture, successful verification,
//! retake, leaving the step, dropping the client) goes through
//! [`DocumentVerificationClient::release_camera`] or the lease's `Drop`.

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose};
use tracing::{info, warn};

use crate::application::{AddressSlot, DocumentRecord, KycApplication};
use crate::backend::KycBackend;
use crate::error::{ResourceError, TransportError, WizardError};
use crate::ingestion::strip_data_url;

use super::camera::{CameraDevice, CameraLease};

pub const TAMPER_CHECK_FAILED: &str = "Tamper check failed. Please reupload the document.";
pub const TAMPERED_DOCUMENT: &str =
    "The uploaded document appears to be tampered. Please upload a valid document.";
pub const TAMPER_CHECK_UNREACHABLE: &str = "Unable to verify document. Please try again";

pub const LIVENESS_REJECTED: &str = "Liveness check failed. Please retake the selfie.";
pub const LIVENESS_NOT_LIVE: &str =
    "Liveness check failed. Please ensure you're a real person and retake the selfie.";
pub const LIVENESS_UNREACHABLE: &str =
    "Something went wrong while verifying liveness. Please try again.";

/// Outcome of screening a document image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TamperVerdict {
    /// Safe to commit.
    Clean,
    /// The service flagged manipulation; the image must be discarded.
    Tampered,
    /// The check could not be completed; carries the notice to show.
    Failed(String),
}

/// Outcome of a liveness verification attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum LivenessVerdict {
    /// Score and status stored; the capture is verified.
    Live { score: f64, status: String },
    /// The capture was judged not live. It is kept, unverified.
    NotLive(String),
    /// The check could not be completed. The capture is kept, unverified.
    Failed(String),
}

/// Orchestrates tamper and liveness checks for one application.
pub struct DocumentVerificationClient {
    backend: Arc<dyn KycBackend>,
    camera: Arc<dyn CameraDevice>,
    application_id: String,
    lease: Option<CameraLease>,
}

impl DocumentVerificationClient {
    pub fn new(
        backend: Arc<dyn KycBackend>,
        camera: Arc<dyn CameraDevice>,
        application_id: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            camera,
            application_id: application_id.into(),
            lease: None,
        }
    }

    // ── Documents ───────────────────────────────────────────────────

    /// Run the tamper check on a freshly ingested image.
    pub async fn screen_document(&self, image: &str) -> TamperVerdict {
        match self.backend.tamper_check(&self.application_id, image).await {
            Ok(result) if result.is_tampered => {
                warn!(application_id = %self.application_id, "Document flagged as tampered");
                TamperVerdict::Tampered
            }
            Ok(_) => TamperVerdict::Clean,
            Err(e) => {
                warn!(application_id = %self.application_id, error = %e, "Tamper check failed");
                let notice = match e.backend_message() {
                    Some(message) => message.to_string(),
                    None if matches!(e, TransportError::Rejected { .. }) => {
                        TAMPER_CHECK_FAILED.to_string()
                    }
                    None => TAMPER_CHECK_UNREACHABLE.to_string(),
                };
                TamperVerdict::Failed(notice)
            }
        }
    }

    /// Put a screened image into `slot`. With synced addresses a permanent
    /// upload becomes the proof for both slots.
    pub fn commit_document(app: &mut KycApplication, slot: AddressSlot, image: String) {
        app.document_mut(slot).ovd_image = image;
        Self::mirror_document(app, slot);
    }

    /// Drop a rejected image from `slot`.
    pub fn discard_document(app: &mut KycApplication, slot: AddressSlot) {
        app.document_mut(slot).ovd_image.clear();
        Self::mirror_document(app, slot);
    }

    pub(crate) fn mirror_document(app: &mut KycApplication, slot: AddressSlot) {
        if slot == AddressSlot::Permanent && app.is_same_address {
            let shared: DocumentRecord = app.permanent_document.clone();
            app.corporate_document = shared;
        }
    }

    // ── Liveness ────────────────────────────────────────────────────

    /// Acquire the camera on entering the liveness step, unless a verified
    /// capture is already on the record. Returns whether a stream is open.
    pub async fn enter_liveness(&mut self, app: &KycApplication) -> Result<bool, ResourceError> {
        if app.liveness.is_verified() {
            return Ok(self.is_streaming());
        }
        self.acquire().await?;
        Ok(true)
    }

    /// Grab a frame, store it as the selfie and stop the camera. Any earlier
    /// score and status are forgotten.
    pub async fn capture_selfie(&mut self, app: &mut KycApplication) -> Result<(), WizardError> {
        let Some(lease) = self.lease.as_mut() else {
            return Err(ResourceError::NotReady.into());
        };
        let frame = lease.capture().await?;
        if frame.is_empty() {
            return Err(ResourceError::CaptureFailed("empty frame".to_string()).into());
        }
        let encoded = general_purpose::STANDARD.encode(&frame);

        app.liveness.image = format!("data:image/jpeg;base64,{encoded}");
        app.liveness.reset_result();
        self.release_camera();
        info!(application_id = %self.application_id, "Selfie captured");
        Ok(())
    }

    /// Ask the backend whether the current capture is live.
    pub async fn verify_liveness(
        &mut self,
        app: &mut KycApplication,
    ) -> Result<LivenessVerdict, WizardError> {
        if !app.liveness.is_captured() {
            return Err(WizardError::NoCapture);
        }
        let image = strip_data_url(&app.liveness.image).to_string();

        let verdict = match self.backend.liveness_check(&image).await {
            Ok(result) if result.is_live => {
                app.liveness.score = result.score;
                app.liveness.status = result.status.clone();
                self.release_camera();
                info!(
                    application_id = %self.application_id,
                    score = result.score,
                    status = %result.status,
                    "Liveness verified"
                );
                LivenessVerdict::Live {
                    score: result.score,
                    status: result.status,
                }
            }
            Ok(result) => {
                app.liveness.reset_result();
                info!(application_id = %self.application_id, status = %result.status, "Capture judged not live");
                LivenessVerdict::NotLive(LIVENESS_NOT_LIVE.to_string())
            }
            Err(e) => {
                app.liveness.reset_result();
                warn!(application_id = %self.application_id, error = %e, "Liveness check failed");
                let notice = match e.backend_message() {
                    Some(message) => message.to_string(),
                    None if matches!(e, TransportError::Rejected { .. }) => {
                        LIVENESS_REJECTED.to_string()
                    }
                    None => LIVENESS_UNREACHABLE.to_string(),
                };
                LivenessVerdict::Failed(notice)
            }
        };
        Ok(verdict)
    }

    /// Throw away the capture and its result, then reopen the camera.
    pub async fn retake_selfie(&mut self, app: &mut KycApplication) -> Result<(), ResourceError> {
        app.liveness.clear();
        self.release_camera();
        self.acquire().await
    }

    /// Stop the camera if it is running.
    pub fn release_camera(&mut self) {
        if let Some(lease) = self.lease.take() {
            lease.release();
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.lease.is_some()
    }

    async fn acquire(&mut self) -> Result<(), ResourceError> {
        if self.lease.is_some() {
            return Ok(());
        }
        match CameraLease::acquire(self.camera.as_ref()).await {
            Ok(lease) => {
                self.lease = Some(lease);
                Ok(())
            }
            Err(e) => {
                warn!(application_id = %self.application_id, error = %e, "Camera unavailable");
                Err(e)
            }
        }
    }
}
