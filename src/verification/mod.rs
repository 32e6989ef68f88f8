//! Document and liveness verification.

pub mod camera;
pub mod client;

pub use camera::{CameraDevice, CameraLease, CameraStream, UnavailableCamera};
pub use client::{DocumentVerificationClient, LivenessVerdict, TamperVerdict};
