//! WizardController: owns the application record and the step state,
//! validates and persists each step, and drives submission.
//!
//! Every collaborator failure is caught here, turned into a notice and
//! logged; callers get a typed `Result` describing what happened.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::address::{
    AddressField, AddressSyncEngine, LookupOutcome, LookupResolution, LookupStart, LookupTicket,
    is_valid_zip,
};
use crate::application::{AddressSlot, KycApplication, KycStatus, OvdType};
use crate::backend::KycBackend;
use crate::config::WizardConfig;
use crate::error::{IntegrityError, ResourceError, TransportError, WizardError};
use crate::ingestion::{SelectedFile, UploadPolicy, ingest};
use crate::notice::{Notice, NoticeBus};
use crate::validation::{ValidationContext, ValidationState, keys, rules, validate};
use crate::verification::client::TAMPERED_DOCUMENT;
use crate::verification::{CameraDevice, DocumentVerificationClient, LivenessVerdict, TamperVerdict};

use super::state::{WizardState, WizardStep};
use super::view::{CameraStatus, ReviewSummary, StepProgress, StepView, progress, render};

const SUBMITTED: &str = "KYC Application Submitted Successfully";
const SUBMIT_FAILED: &str = "Failed to submit KYC application.";
const CONSENT_REQUIRED: &str = "Please consent to share your documents before submitting.";
const CAMERA_UNAVAILABLE: &str =
    "Unable to access camera. Please allow camera permissions and ensure your camera is working.";

/// Identity fields edited on the basic-info step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonalField {
    Name,
    FatherName,
    Email,
    Mobile,
    Dob,
    Gender,
}

/// Drives one applicant through the wizard.
pub struct WizardController {
    application_id: String,
    app: KycApplication,
    state: WizardState,
    validation: ValidationState,
    load_error: Option<IntegrityError>,
    camera_error: Option<ResourceError>,
    addresses: AddressSyncEngine,
    verifier: DocumentVerificationClient,
    backend: Arc<dyn KycBackend>,
    notices: NoticeBus,
    ctx: ValidationContext,
    document_policy: UploadPolicy,
}

impl WizardController {
    /// Fetch the application once and pick the starting step: `Invalid` when
    /// it cannot be loaded, `Completion` when it is no longer pending,
    /// `Welcome` otherwise.
    pub async fn load(
        application_id: impl Into<String>,
        backend: Arc<dyn KycBackend>,
        camera: Arc<dyn CameraDevice>,
        config: &WizardConfig,
    ) -> Self {
        let application_id = application_id.into();
        let mut controller = Self {
            verifier: DocumentVerificationClient::new(
                backend.clone(),
                camera,
                application_id.clone(),
            ),
            application_id,
            app: KycApplication::default(),
            state: WizardState::default(),
            validation: ValidationState::new(),
            load_error: None,
            camera_error: None,
            addresses: AddressSyncEngine::new(config.default_country.clone()),
            backend,
            notices: NoticeBus::new(),
            ctx: ValidationContext::from_config(config),
            document_policy: UploadPolicy::documents(config.max_upload_bytes),
        };
        controller.initialize().await;
        controller
    }

    async fn initialize(&mut self) {
        let id = self.application_id.clone();
        match self.backend.fetch_application(&id).await {
            Ok(Some(mut app)) => {
                if app.addresses_match() {
                    app.is_same_address = true;
                }
                let status = app.status;
                self.app = app;
                if status.is_editable() {
                    self.state.step = WizardStep::Welcome;
                    self.notices
                        .success(format!("KYC ID : {id} validated successfully."));
                } else {
                    self.state.step = WizardStep::Completion;
                    self.notices.success(SUBMITTED);
                }
                info!(application_id = %id, %status, step = %self.state.step, "Application loaded");
            }
            Ok(None) => {
                warn!(application_id = %id, "Application not found");
                self.load_error = Some(IntegrityError::NotFound { id: id.clone() });
                self.notices.error(format!("KYC ID : {id} is not validated."));
            }
            Err(e) => {
                warn!(application_id = %id, error = %e, "Application fetch failed");
                self.load_error = Some(IntegrityError::LoadFailed {
                    id: id.clone(),
                    reason: e.to_string(),
                });
                self.notices.error(format!(
                    "Unable to validate KYC ID : {id} Please try again later."
                ));
            }
        }
    }

    /// Pin the reference date used by age checks.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.ctx.today = today;
        self
    }

    // ── Queries ─────────────────────────────────────────────────────

    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    pub fn step(&self) -> WizardStep {
        self.state.step
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn application(&self) -> &KycApplication {
        &self.app
    }

    pub fn validation(&self) -> &ValidationState {
        &self.validation
    }

    /// Why the application could not be loaded, when at `Invalid`.
    pub fn load_error(&self) -> Option<&IntegrityError> {
        self.load_error.as_ref()
    }

    pub fn camera_error(&self) -> Option<&ResourceError> {
        self.camera_error.as_ref()
    }

    /// Error shown under a field. Pin code lookup errors take precedence
    /// over validation for the zip fields.
    pub fn field_error(&self, key: &str) -> Option<&str> {
        for slot in [AddressSlot::Permanent, AddressSlot::Corporate] {
            if key == keys::address(slot, AddressField::ZipCode)
                && let Some(err) = self.addresses.lookup_error(slot)
            {
                return Some(err);
            }
        }
        self.validation.get(key)
    }

    pub fn is_streaming(&self) -> bool {
        self.verifier.is_streaming()
    }

    pub fn view(&self) -> StepView {
        let camera = CameraStatus {
            streaming: self.verifier.is_streaming(),
            error: self.camera_error.as_ref().map(ToString::to_string),
        };
        render(&self.state, &self.app, camera)
    }

    pub fn progress(&self) -> StepProgress {
        progress(self.state.step)
    }

    pub fn review_summary(&self) -> ReviewSummary {
        ReviewSummary::of(&self.app)
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    pub fn notices(&self) -> &NoticeBus {
        &self.notices
    }

    /// Backend handle for resolving lookup tickets outside the controller.
    pub fn backend(&self) -> Arc<dyn KycBackend> {
        self.backend.clone()
    }

    // ── Navigation ──────────────────────────────────────────────────

    /// Welcome → BasicInfo.
    pub fn start(&mut self) -> Result<WizardStep, WizardError> {
        self.require_step(WizardStep::Welcome, WizardStep::BasicInfo)?;
        self.enter(WizardStep::BasicInfo);
        Ok(self.state.step)
    }

    /// Validate the current step and, for steps 1–4, persist its slice and
    /// move forward. On the review step a clean validation opens the
    /// submission confirmation instead.
    pub async fn advance(&mut self) -> Result<WizardStep, WizardError> {
        let step = self.state.step;
        let next = match step.next() {
            Some(next) if step != WizardStep::Welcome => next,
            _ => return Err(self.invalid_transition(step)),
        };

        self.validation = validate(step, &self.app, &self.ctx);
        if !self.validation.is_empty() {
            self.state.show_errors = true;
            debug!(%step, errors = self.validation.len(), "Advance blocked by validation");
            return Err(WizardError::ValidationBlocked {
                step: step.to_string(),
                count: self.validation.len(),
            });
        }
        self.state.show_errors = false;

        if step == WizardStep::Review {
            self.open_confirmation()?;
            return Ok(step);
        }

        if step.persists_slice() {
            let (saved, failed) = save_messages(step);
            if let Err(e) = self.persist(step).await {
                warn!(application_id = %self.application_id, %step, error = %e, "Step save failed");
                self.notices.error(failed);
                return Err(e.into());
            }
            info!(application_id = %self.application_id, %step, "Step saved");
            self.notices.success(saved);
        }

        self.enter(next);
        if next == WizardStep::Liveness {
            self.acquire_camera().await;
        }
        Ok(next)
    }

    /// Go back one numbered step. No validation, no persistence.
    pub async fn previous(&mut self) -> Result<WizardStep, WizardError> {
        let step = self.state.step;
        let Some(prev) = step.previous() else {
            return Err(self.invalid_transition(step));
        };
        self.enter(prev);
        if prev == WizardStep::Liveness {
            self.acquire_camera().await;
        }
        Ok(prev)
    }

    /// Open the submission confirmation. Consent always starts unchecked.
    pub fn open_confirmation(&mut self) -> Result<(), WizardError> {
        if self.state.step != WizardStep::Review {
            return Err(self.invalid_transition(WizardStep::Completion));
        }
        self.state.consent_given = false;
        self.state.confirmation_open = true;
        Ok(())
    }

    pub fn close_confirmation(&mut self) {
        self.state.confirmation_open = false;
    }

    pub fn set_consent(&mut self, consent: bool) {
        self.state.consent_given = consent;
    }

    /// Review → Completion. Requires consent; moves only once the backend
    /// accepted the submission.
    pub async fn submit(&mut self) -> Result<WizardStep, WizardError> {
        if self.state.step != WizardStep::Review {
            return Err(self.invalid_transition(WizardStep::Completion));
        }
        if !self.state.consent_given {
            self.notices.error(CONSENT_REQUIRED);
            return Err(WizardError::ConsentRequired);
        }

        if let Err(e) = self.backend.submit(&self.application_id).await {
            warn!(application_id = %self.application_id, error = %e, "Submission failed");
            self.notices.error(SUBMIT_FAILED);
            return Err(e.into());
        }

        info!(application_id = %self.application_id, "Application submitted");
        self.app.status = KycStatus::UnderReview;
        self.state.confirmation_open = false;
        self.state.consent_given = false;
        self.enter(WizardStep::Completion);
        self.notices.success(SUBMITTED);
        Ok(WizardStep::Completion)
    }

    /// Fetch the generated summary document.
    pub async fn download_summary(&mut self) -> Result<Vec<u8>, WizardError> {
        match self.backend.summary_document(&self.application_id).await {
            Ok(bytes) => {
                info!(application_id = %self.application_id, size = bytes.len(), "Summary downloaded");
                self.notices.success("PDF downloaded successfully!");
                Ok(bytes)
            }
            Err(e) => {
                warn!(application_id = %self.application_id, error = %e, "Summary download failed");
                self.notices.error("Failed to download PDF.");
                Err(e.into())
            }
        }
    }

    /// Leave the wizard: stop the camera if it is running.
    pub fn close(&mut self) {
        self.verifier.release_camera();
    }

    // ── Basic info ──────────────────────────────────────────────────

    pub fn set_field(&mut self, field: PersonalField, value: &str) {
        let slot = match field {
            PersonalField::Name => &mut self.app.name,
            PersonalField::FatherName => &mut self.app.father_name,
            PersonalField::Email => &mut self.app.email_id,
            PersonalField::Mobile => &mut self.app.mobile_no,
            PersonalField::Dob => &mut self.app.dob,
            PersonalField::Gender => &mut self.app.gender,
        };
        *slot = value.to_string();

        if field == PersonalField::Mobile
            && let Some(digits) = rules::normalize_mobile(value)
        {
            self.app.mobile_no = digits;
        }
        self.revalidate();
    }

    /// Ingest and store the applicant photo. A refused file leaves the
    /// current photo in place.
    pub async fn set_photo(&mut self, file: SelectedFile) -> Result<(), WizardError> {
        match ingest(file, &self.ctx.photo_policy).await {
            Ok(encoded) => {
                self.app.photo_image = encoded;
                self.revalidate();
                Ok(())
            }
            Err(e) => {
                self.notices.error(e.to_string());
                Err(e.into())
            }
        }
    }

    // ── Addresses ───────────────────────────────────────────────────

    /// Apply an address edit. Completing a 6-digit zip code triggers its
    /// lookup, whose result is returned.
    pub async fn edit_address(
        &mut self,
        slot: AddressSlot,
        field: AddressField,
        value: &str,
    ) -> Result<Option<LookupResolution>, WizardError> {
        self.addresses.edit(&mut self.app, slot, field, value)?;

        let mut resolution = None;
        if field == AddressField::ZipCode && is_valid_zip(&self.app.address(slot).zip_code) {
            resolution = self
                .addresses
                .lookup(&mut self.app, slot, self.backend.as_ref())
                .await;
        }
        self.revalidate();
        Ok(resolution)
    }

    /// Start a lookup without awaiting it, so lookups for both slots can be
    /// in flight together. Resolve the ticket with
    /// [`LookupTicket::resolve`] and hand the outcome to
    /// [`complete_zip_lookup`](Self::complete_zip_lookup).
    pub fn begin_zip_lookup(&mut self, slot: AddressSlot) -> LookupStart {
        self.addresses.begin_lookup(&self.app, slot)
    }

    pub fn complete_zip_lookup(
        &mut self,
        ticket: &LookupTicket,
        outcome: LookupOutcome,
    ) -> LookupResolution {
        let resolution = self.addresses.apply_lookup(&mut self.app, ticket, outcome);
        self.revalidate();
        resolution
    }

    pub fn set_same_address(&mut self, same: bool) {
        self.addresses.set_same_address(&mut self.app, same);
        if same {
            DocumentVerificationClient::mirror_document(&mut self.app, AddressSlot::Permanent);
        } else if self.app.corporate_document.ovd_type.is_some()
            && self.app.corporate_document.ovd_type == self.app.permanent_document.ovd_type
        {
            // The mirrored proof no longer applies to a separate address.
            self.app.corporate_document = Default::default();
        }
        self.revalidate();
    }

    // ── Documents ───────────────────────────────────────────────────

    pub fn select_document_type(
        &mut self,
        slot: AddressSlot,
        ovd_type: OvdType,
    ) -> Result<(), WizardError> {
        match slot {
            AddressSlot::Corporate if self.app.is_same_address => {
                return Err(WizardError::FieldNotEditable {
                    field: keys::doc_type(slot).to_string(),
                });
            }
            AddressSlot::Corporate if self.app.permanent_document.ovd_type == Some(ovd_type) => {
                return Err(WizardError::DuplicateDocumentType);
            }
            _ => {}
        }

        self.app.document_mut(slot).ovd_type = Some(ovd_type);
        if slot == AddressSlot::Permanent {
            if self.app.is_same_address {
                DocumentVerificationClient::mirror_document(&mut self.app, slot);
            } else if self.app.corporate_document.ovd_type == Some(ovd_type) {
                self.app.corporate_document.ovd_type = None;
            }
        }
        self.revalidate();
        Ok(())
    }

    /// Ingest a document, screen it, and commit it only when the tamper
    /// check comes back clean. A tampered document also clears whatever the
    /// slot held before.
    pub async fn upload_document(
        &mut self,
        slot: AddressSlot,
        file: SelectedFile,
    ) -> Result<TamperVerdict, WizardError> {
        if slot == AddressSlot::Corporate && self.app.is_same_address {
            return Err(WizardError::FieldNotEditable {
                field: keys::doc_image(slot).to_string(),
            });
        }

        let encoded = match ingest(file, &self.document_policy).await {
            Ok(encoded) => encoded,
            Err(e) => {
                self.notices.error(e.to_string());
                return Err(e.into());
            }
        };

        let verdict = self.verifier.screen_document(&encoded).await;
        match &verdict {
            TamperVerdict::Clean => {
                DocumentVerificationClient::commit_document(&mut self.app, slot, encoded);
                info!(application_id = %self.application_id, %slot, "Document committed");
            }
            TamperVerdict::Tampered => {
                DocumentVerificationClient::discard_document(&mut self.app, slot);
                self.notices.error(TAMPERED_DOCUMENT);
            }
            TamperVerdict::Failed(message) => {
                self.notices.error(message.clone());
            }
        }
        self.revalidate();
        Ok(verdict)
    }

    // ── Liveness ────────────────────────────────────────────────────

    pub async fn capture_selfie(&mut self) -> Result<(), WizardError> {
        self.require_liveness()?;
        match self.verifier.capture_selfie(&mut self.app).await {
            Ok(()) => {
                self.notices
                    .success("Selfie captured! Click 'Verify Liveness' to continue.");
                self.revalidate();
                Ok(())
            }
            Err(e) => {
                self.notices.error(e.to_string());
                Err(e)
            }
        }
    }

    pub async fn verify_liveness(&mut self) -> Result<LivenessVerdict, WizardError> {
        self.require_liveness()?;
        let verdict = match self.verifier.verify_liveness(&mut self.app).await {
            Ok(verdict) => verdict,
            Err(e) => {
                self.notices.error(e.to_string());
                return Err(e);
            }
        };
        match &verdict {
            LivenessVerdict::Live { .. } => self.notices.success("Liveness verified successfully!"),
            LivenessVerdict::NotLive(message) | LivenessVerdict::Failed(message) => {
                self.notices.error(message.clone())
            }
        }
        self.revalidate();
        Ok(verdict)
    }

    /// Discard the capture and reopen the camera.
    pub async fn retake_selfie(&mut self) -> Result<(), WizardError> {
        self.require_liveness()?;
        let result = self.verifier.retake_selfie(&mut self.app).await;
        self.note_camera(result.clone());
        self.revalidate();
        result.map_err(Into::into)
    }

    /// Try the camera again after it was unavailable.
    pub async fn retry_camera(&mut self) -> Result<(), WizardError> {
        self.require_liveness()?;
        self.acquire_camera().await;
        match &self.camera_error {
            Some(e) => Err(e.clone().into()),
            None => Ok(()),
        }
    }

    // ── Internals ───────────────────────────────────────────────────

    async fn persist(&self, step: WizardStep) -> Result<(), TransportError> {
        let id = &self.application_id;
        match step {
            WizardStep::BasicInfo => self.backend.save_personal(id, &self.app.personal_slice()).await,
            WizardStep::Address => self.backend.save_address(id, &self.app.address_slice()).await,
            WizardStep::Documents => {
                self.backend
                    .save_documents(id, &self.app.documents_slice())
                    .await
            }
            WizardStep::Liveness => {
                self.backend
                    .save_liveness(id, &self.app.liveness_slice())
                    .await
            }
            _ => Ok(()),
        }
    }

    /// Switch steps. Leaving the liveness step always stops the camera.
    fn enter(&mut self, step: WizardStep) {
        let from = self.state.step;
        if from == WizardStep::Liveness && step != WizardStep::Liveness {
            self.verifier.release_camera();
            self.camera_error = None;
            self.notices.clear_persistent();
        }
        self.state.step = step;
        self.state.show_errors = false;
        self.state.confirmation_open = false;
        self.validation = ValidationState::new();
        info!(application_id = %self.application_id, %from, to = %step, "Step changed");
    }

    async fn acquire_camera(&mut self) {
        let result = self.verifier.enter_liveness(&self.app).await.map(|_| ());
        self.note_camera(result);
    }

    fn note_camera(&mut self, result: Result<(), ResourceError>) {
        match result {
            Ok(()) => {
                if self.camera_error.take().is_some() {
                    self.notices.clear_persistent();
                }
            }
            Err(e) => {
                let message = match e {
                    ResourceError::PermissionDenied | ResourceError::Unavailable(_) => {
                        CAMERA_UNAVAILABLE.to_string()
                    }
                    _ => e.to_string(),
                };
                self.notices.persistent_error(message);
                self.camera_error = Some(e);
            }
        }
    }

    fn revalidate(&mut self) {
        if self.state.show_errors {
            self.validation = validate(self.state.step, &self.app, &self.ctx);
        }
    }

    fn require_step(&self, expected: WizardStep, target: WizardStep) -> Result<(), WizardError> {
        if self.state.step != expected || !expected.can_transition_to(target) {
            return Err(self.invalid_transition(target));
        }
        Ok(())
    }

    fn require_liveness(&self) -> Result<(), WizardError> {
        if self.state.step != WizardStep::Liveness {
            return Err(WizardError::InvalidTransition {
                from: self.state.step.to_string(),
                to: WizardStep::Liveness.to_string(),
            });
        }
        Ok(())
    }

    fn invalid_transition(&self, to: WizardStep) -> WizardError {
        debug!(from = %self.state.step, %to, "Transition refused");
        WizardError::InvalidTransition {
            from: self.state.step.to_string(),
            to: to.to_string(),
        }
    }
}

fn save_messages(step: WizardStep) -> (&'static str, &'static str) {
    match step {
        WizardStep::BasicInfo => (
            "Basic info saved successfully!",
            "Failed to save Basic Info. Try again.",
        ),
        WizardStep::Address => ("Address saved successfully!", "Failed to save address."),
        WizardStep::Documents => ("Documents saved successfully!", "Failed to save documents."),
        _ => ("Liveness saved successfully!", "Failed to save liveness."),
    }
}

impl Drop for WizardController {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_persisted_step_has_its_own_messages() {
        let steps = [
            WizardStep::BasicInfo,
            WizardStep::Address,
            WizardStep::Documents,
            WizardStep::Liveness,
        ];
        let mut seen = std::collections::HashSet::new();
        for step in steps {
            assert!(step.persists_slice());
            let (saved, failed) = save_messages(step);
            assert!(seen.insert(saved), "duplicate message for {step}");
            assert!(seen.insert(failed), "duplicate message for {step}");
        }
        assert!(!WizardStep::Review.persists_slice());
    }
}
