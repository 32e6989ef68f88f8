//! Step validators: field rules grouped per wizard step.

pub mod rules;
pub mod state;
pub mod steps;

pub use state::{ValidationState, keys};
pub use steps::{ValidationContext, validate};
