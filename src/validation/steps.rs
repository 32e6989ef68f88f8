//! Per-step validators. Pure functions of the application: every run
//! recomputes the whole map from current field values.

use chrono::NaiveDate;
use tracing::debug;

use crate::address::AddressField;
use crate::application::{AddressSlot, KycApplication};
use crate::config::WizardConfig;
use crate::ingestion::UploadPolicy;
use crate::wizard::WizardStep;

use super::rules;
use super::state::{ValidationState, keys};

pub const DOC_TYPE_REQUIRED: &str = "Document type is required";
pub const DOC_IMAGE_REQUIRED: &str = "Document image is required";
pub const DOC_TYPE_DUPLICATE: &str =
    "Current address document must differ from the permanent address document";
pub const SELFIE_REQUIRED: &str = "Please capture a selfie for liveness check.";
pub const LIVENESS_NOT_VERIFIED: &str = "Please verify liveness before continuing.";

/// Inputs the rules need besides the application itself.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    /// Reference date for age checks.
    pub today: NaiveDate,
    pub photo_policy: UploadPolicy,
}

impl ValidationContext {
    pub fn new(today: NaiveDate, max_photo_bytes: u64) -> Self {
        Self {
            today,
            photo_policy: UploadPolicy::photo(max_photo_bytes),
        }
    }

    pub fn from_config(config: &WizardConfig) -> Self {
        Self::new(chrono::Local::now().date_naive(), config.max_photo_bytes)
    }
}

/// Validate the fields owned by `step`. The review step covers every
/// data-entry step; steps without fields always pass.
pub fn validate(step: WizardStep, app: &KycApplication, ctx: &ValidationContext) -> ValidationState {
    let state = match step {
        WizardStep::BasicInfo => basic_info(app, ctx),
        WizardStep::Address => address(app),
        WizardStep::Documents => documents(app),
        WizardStep::Liveness => liveness(app),
        WizardStep::Review => {
            let mut all = basic_info(app, ctx);
            all.extend(address(app));
            all.extend(documents(app));
            all.extend(liveness(app));
            all
        }
        WizardStep::Invalid | WizardStep::Welcome | WizardStep::Completion => {
            ValidationState::new()
        }
    };
    debug!(%step, errors = state.len(), "Step validated");
    state
}

pub fn basic_info(app: &KycApplication, ctx: &ValidationContext) -> ValidationState {
    let mut state = ValidationState::new();
    state.check(keys::NAME, rules::person_name(&app.name));
    state.check(keys::FATHER_NAME, rules::person_name(&app.father_name));
    state.check(keys::EMAIL, rules::email(&app.email_id));
    state.check(keys::MOBILE, rules::mobile(&app.mobile_no));
    state.check(keys::GENDER, rules::gender(&app.gender));
    state.check(keys::DOB, rules::date_of_birth(&app.dob, ctx.today));
    state.check(keys::PHOTO, rules::photo(&app.photo_image, &ctx.photo_policy));
    state
}

/// The corporate slot is skipped while it mirrors the permanent one.
pub fn address(app: &KycApplication) -> ValidationState {
    let mut state = ValidationState::new();
    for &slot in active_slots(app) {
        let address = app.address(slot);
        for field in AddressField::ALL {
            let value = field.get(address);
            let outcome = match field {
                AddressField::StreetAddress => missing(value, "Street address is required"),
                AddressField::City => missing(value, "City is required"),
                AddressField::State => missing(value, "State is required"),
                AddressField::ZipCode => rules::zip_code(value),
                AddressField::Country => missing(value, "Country is required"),
            };
            state.check(keys::address(slot, field), outcome);
        }
    }
    state
}

pub fn documents(app: &KycApplication) -> ValidationState {
    let mut state = ValidationState::new();
    for &slot in active_slots(app) {
        let doc = app.document(slot);
        let type_error = match doc.ovd_type {
            None => Some(DOC_TYPE_REQUIRED.to_string()),
            Some(t)
                if slot == AddressSlot::Corporate
                    && app.permanent_document.ovd_type == Some(t) =>
            {
                Some(DOC_TYPE_DUPLICATE.to_string())
            }
            Some(_) => None,
        };
        state.check(keys::doc_type(slot), type_error);
        state.check(keys::doc_image(slot), missing(&doc.ovd_image, DOC_IMAGE_REQUIRED));
    }
    state
}

pub fn liveness(app: &KycApplication) -> ValidationState {
    let mut state = ValidationState::new();
    let record = &app.liveness;
    state.check(keys::LIVENESS_IMAGE, missing(&record.image, SELFIE_REQUIRED));
    if record.is_captured() {
        state.check(
            keys::LIVENESS_SCORE,
            (record.score <= 0.0).then(|| LIVENESS_NOT_VERIFIED.to_string()),
        );
        state.check(
            keys::LIVENESS_STATUS,
            missing(&record.status, LIVENESS_NOT_VERIFIED),
        );
    }
    state
}

fn active_slots(app: &KycApplication) -> &'static [AddressSlot] {
    if app.is_same_address {
        &[AddressSlot::Permanent]
    } else {
        &[AddressSlot::Permanent, AddressSlot::Corporate]
    }
}

fn missing(value: &str, message: &str) -> Option<String> {
    value.trim().is_empty().then(|| message.to_string())
}
