//! Error types for the KYC wizard.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    #[error("Integrity error: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("Ingestion error: {0}")]
    Ingestion(#[from] IngestionError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// A collaborator call failed or reported failure.
///
/// Surfaced to the applicant as a transient notice. Never retried
/// automatically.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("Request to {endpoint} failed: {reason}")]
    Request { endpoint: String, reason: String },

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("{endpoint} rejected the request: {message}")]
    Rejected { endpoint: String, message: String },

    #[error("Invalid response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    #[error("{endpoint} not found")]
    NotFound { endpoint: String },
}

impl TransportError {
    /// Message from the backend when it answered but refused, if any.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}

/// Camera device errors. Block the liveness step until resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("Camera unavailable: {0}")]
    Unavailable(String),

    #[error("Camera not ready")]
    NotReady,

    #[error("Frame capture failed: {0}")]
    CaptureFailed(String),
}

/// The application cannot be edited in this session.
#[derive(Debug, Clone, thiserror::Error)]
pub enum IntegrityError {
    #[error("KYC application {id} not found")]
    NotFound { id: String },

    #[error("Unable to load KYC application {id}: {reason}")]
    LoadFailed { id: String, reason: String },
}

/// A selected file was refused or could not be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestionError {
    #[error("Only {allowed} are allowed")]
    UnsupportedType { mime: String, allowed: String },

    #[error("{subject} must be under {max_mb}MB")]
    TooLarge {
        subject: String,
        size: u64,
        max_mb: u64,
    },

    #[error("Invalid file type")]
    DisallowedExtension { name: String },

    #[error("Failed to load file: {0}")]
    Read(String),
}

/// Wizard-level refusals: illegal navigation and blocked edits.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Cannot move from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Step {step} has {count} invalid field(s)")]
    ValidationBlocked { step: String, count: usize },

    #[error("Please consent to share your documents before submitting")]
    ConsentRequired,

    #[error("Field {field} is not editable")]
    FieldNotEditable { field: String },

    #[error("Current address document must differ from the permanent address document")]
    DuplicateDocumentType,

    #[error("Please capture a selfie first")]
    NoCapture,

    #[error("{0}")]
    Transport(#[from] TransportError),

    #[error("{0}")]
    Resource(#[from] ResourceError),

    #[error("{0}")]
    Ingestion(#[from] IngestionError),
}

/// Result type alias for the wizard.
pub type Result<T> = std::result::Result<T, Error>;
