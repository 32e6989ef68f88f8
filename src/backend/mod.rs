//! Backend collaborators: the async contract and its HTTP implementation.

pub mod http;
pub mod traits;
pub mod types;

pub use http::HttpBackend;
pub use traits::KycBackend;
pub use types::{LivenessResult, PinLocality, TamperCheckResult};
