//! Confidence scoring for extracted-document signals shown at review.

pub mod aggregator;
pub mod document_match;

pub use aggregator::{
    Classification, ConfidenceCategory, ConfidenceItem, ConfidenceSummary, ScoredField, aggregate,
};
pub use document_match::DocumentMatch;
