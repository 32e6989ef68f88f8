//! Step views: one variant per step, produced by a single mapping from
//! wizard state to what the current step shows.

use serde::Serialize;

use crate::application::{Address, AddressSlot, KycApplication, OvdType, PersonalSlice};
use crate::confidence::ConfidenceSummary;
use crate::ingestion::{is_image, preview_data_url};

use super::state::{WizardState, WizardStep};

/// Progress indicator data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepProgress {
    pub titles: [&'static str; 5],
    /// 1-based position among the numbered steps, if on one.
    pub current: Option<u8>,
}

/// Camera state as the liveness view needs it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CameraStatus {
    pub streaming: bool,
    pub error: Option<String>,
}

/// One address-proof slot as shown on the documents and review steps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentView {
    pub slot: AddressSlot,
    pub ovd_type: Option<OvdType>,
    /// `data:` URL of the uploaded document, empty when none.
    pub preview: String,
    pub is_image: bool,
}

impl DocumentView {
    fn of(app: &KycApplication, slot: AddressSlot) -> Self {
        let doc = app.document(slot);
        Self {
            slot,
            ovd_type: doc.ovd_type,
            preview: preview_data_url(&doc.ovd_image),
            is_image: !doc.ovd_image.is_empty() && is_image(&doc.ovd_image),
        }
    }
}

/// Review entry for one document, with its extracted-signal summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentReview {
    pub document: DocumentView,
    pub confidence: Option<ConfidenceSummary>,
}

/// Everything the review step shows before submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewSummary {
    pub personal: PersonalSlice,
    pub photo_preview: String,
    pub permanent_address: Address,
    pub corporate_address: Address,
    pub same_address: bool,
    pub documents: Vec<DocumentReview>,
    pub liveness_preview: String,
    pub liveness_score: f64,
    pub liveness_status: String,
}

impl ReviewSummary {
    pub fn of(app: &KycApplication) -> Self {
        let slots: &[AddressSlot] = if app.is_same_address {
            &[AddressSlot::Permanent]
        } else {
            &[AddressSlot::Permanent, AddressSlot::Corporate]
        };
        let documents = slots
            .iter()
            .map(|&slot| DocumentReview {
                document: DocumentView::of(app, slot),
                confidence: app
                    .document_match(slot)
                    .map(|m| m.summary())
                    .filter(|s| !s.is_empty()),
            })
            .collect();

        Self {
            personal: app.personal_slice(),
            photo_preview: preview_data_url(&app.photo_image),
            permanent_address: app.permanent_address.clone(),
            corporate_address: app.corporate_address.clone(),
            same_address: app.is_same_address,
            documents,
            liveness_preview: preview_data_url(&app.liveness.image),
            liveness_score: app.liveness.score,
            liveness_status: app.liveness.status.clone(),
        }
    }
}

/// What the current step renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepView {
    Invalid,
    Welcome,
    BasicInfo {
        personal: PersonalSlice,
        photo_preview: String,
    },
    Address {
        permanent: Address,
        corporate: Address,
        same_address: bool,
        /// False while the corporate address mirrors the permanent one.
        corporate_editable: bool,
    },
    Documents {
        same_address: bool,
        permanent: DocumentView,
        /// Absent while one proof covers both addresses.
        corporate: Option<DocumentView>,
        corporate_options: Vec<OvdType>,
    },
    Liveness {
        preview: String,
        verified: bool,
        camera: CameraStatus,
    },
    Review {
        summary: Box<ReviewSummary>,
        confirmation_open: bool,
        consent_given: bool,
    },
    Completion,
}

/// Map the wizard state to the current step's view.
pub fn render(state: &WizardState, app: &KycApplication, camera: CameraStatus) -> StepView {
    match state.step {
        WizardStep::Invalid => StepView::Invalid,
        WizardStep::Welcome => StepView::Welcome,
        WizardStep::BasicInfo => StepView::BasicInfo {
            personal: PersonalSlice {
                name: app.name.clone(),
                gender: app.gender.clone(),
                dob: app.dob.clone(),
                email_id: app.email_id.clone(),
                mobile_no: app.mobile_no.clone(),
                father_name: app.father_name.clone(),
                photo_image: app.photo_image.clone(),
            },
            photo_preview: preview_data_url(&app.photo_image),
        },
        WizardStep::Address => StepView::Address {
            permanent: app.permanent_address.clone(),
            corporate: app.corporate_address.clone(),
            same_address: app.is_same_address,
            corporate_editable: !app.is_same_address,
        },
        WizardStep::Documents => StepView::Documents {
            same_address: app.is_same_address,
            permanent: DocumentView::of(app, AddressSlot::Permanent),
            corporate: (!app.is_same_address)
                .then(|| DocumentView::of(app, AddressSlot::Corporate)),
            corporate_options: corporate_document_options(app),
        },
        WizardStep::Liveness => StepView::Liveness {
            preview: app.liveness.image.clone(),
            verified: app.liveness.is_verified(),
            camera,
        },
        WizardStep::Review => StepView::Review {
            summary: Box::new(ReviewSummary::of(app)),
            confirmation_open: state.confirmation_open,
            consent_given: state.consent_given,
        },
        WizardStep::Completion => StepView::Completion,
    }
}

/// Document types offered for the current address: every type except the
/// one already used for the permanent address.
pub fn corporate_document_options(app: &KycApplication) -> Vec<OvdType> {
    OvdType::ALL
        .into_iter()
        .filter(|t| app.permanent_document.ovd_type != Some(*t))
        .collect()
}

pub fn progress(step: WizardStep) -> StepProgress {
    StepProgress {
        titles: WizardStep::NUMBERED_TITLES,
        current: step.index().filter(|i| (1..=5).contains(i)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confidence::DocumentMatch;

    fn state_at(step: WizardStep) -> WizardState {
        WizardState {
            step,
            ..Default::default()
        }
    }

    #[test]
    fn every_step_maps_to_its_view() {
        let app = KycApplication::default();
        let cases = [
            (WizardStep::Invalid, "invalid"),
            (WizardStep::Welcome, "welcome"),
            (WizardStep::BasicInfo, "basic_info"),
            (WizardStep::Address, "address"),
            (WizardStep::Documents, "documents"),
            (WizardStep::Liveness, "liveness"),
            (WizardStep::Review, "review"),
            (WizardStep::Completion, "completion"),
        ];
        for (step, tag) in cases {
            let view = render(&state_at(step), &app, CameraStatus::default());
            let json = serde_json::to_value(&view).unwrap();
            assert_eq!(json["step"], tag);
        }
    }

    #[test]
    fn synced_documents_hide_corporate_slot() {
        let mut app = KycApplication {
            is_same_address: true,
            ..Default::default()
        };
        app.permanent_document.ovd_type = Some(OvdType::Passport);
        app.permanent_document.ovd_image = "JVBERi0x".into();

        let StepView::Documents {
            corporate,
            permanent,
            corporate_options,
            ..
        } = render(&state_at(WizardStep::Documents), &app, CameraStatus::default())
        else {
            panic!("expected documents view");
        };
        assert!(corporate.is_none());
        assert!(!permanent.is_image);
        assert_eq!(permanent.preview, "data:application/pdf;base64,JVBERi0x");
        assert!(!corporate_options.contains(&OvdType::Passport));
        assert_eq!(corporate_options.len(), 4);
    }

    #[test]
    fn review_includes_confidence_when_present() {
        let mut app = KycApplication::default();
        app.permanent_match = Some(DocumentMatch {
            name_confidence: Some("High".into()),
            dob_confidence: Some("Low".into()),
            ..Default::default()
        });
        let summary = ReviewSummary::of(&app);
        assert_eq!(summary.documents.len(), 2);
        let confidence = summary.documents[0].confidence.as_ref().unwrap();
        assert_eq!(confidence.overall, 68);
        assert!(summary.documents[1].confidence.is_none());
    }

    #[test]
    fn progress_only_on_numbered_steps() {
        assert_eq!(progress(WizardStep::Welcome).current, None);
        assert_eq!(progress(WizardStep::Documents).current, Some(3));
        assert_eq!(progress(WizardStep::Completion).current, None);
    }
}
