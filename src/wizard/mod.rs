//! Wizard: the step state machine, the controller driving it, and the
//! per-step views.
//!
//! The controller is the only writer of the application record. Views are
//! derived from it on demand and never hold state of their own.

pub mod controller;
pub mod state;
pub mod view;

pub use controller::{PersonalField, WizardController};
pub use state::{WizardState, WizardStep};
pub use view::{CameraStatus, DocumentReview, DocumentView, ReviewSummary, StepProgress, StepView};
