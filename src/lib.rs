//! KYC onboarding wizard engine.

pub mod address;
pub mod application;
pub mod backend;
pub mod confidence;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod notice;
pub mod validation;
pub mod verification;
pub mod wizard;

pub use config::WizardConfig;
pub use error::{Error, Result};
pub use wizard::{WizardController, WizardStep};
