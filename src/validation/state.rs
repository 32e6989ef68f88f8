//! Field → error map produced by a validation run.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::address::AddressField;
use crate::application::AddressSlot;

/// Error keys, shared by validators and views.
pub mod keys {
    use super::{AddressField, AddressSlot};

    pub const NAME: &str = "name";
    pub const FATHER_NAME: &str = "fatherName";
    pub const EMAIL: &str = "emailId";
    pub const MOBILE: &str = "mobileNo";
    pub const DOB: &str = "dob";
    pub const GENDER: &str = "gender";
    pub const PHOTO: &str = "photoImage";

    pub const LIVENESS_IMAGE: &str = "livenessImage";
    pub const LIVENESS_SCORE: &str = "livenessScore";
    pub const LIVENESS_STATUS: &str = "livenessStatus";

    /// e.g. `permanent_zipCode`.
    pub fn address(slot: AddressSlot, field: AddressField) -> String {
        format!("{slot}_{}", field.key())
    }

    pub fn doc_type(slot: AddressSlot) -> &'static str {
        match slot {
            AddressSlot::Permanent => "permanentDocType",
            AddressSlot::Corporate => "corporateDocType",
        }
    }

    pub fn doc_image(slot: AddressSlot) -> &'static str {
        match slot {
            AddressSlot::Permanent => "permanentDocImage",
            AddressSlot::Corporate => "corporateDocImage",
        }
    }
}

/// Errors by field key. Only invalid fields have an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationState {
    errors: BTreeMap<String, String>,
}

impl ValidationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one rule.
    pub fn check(&mut self, key: impl Into<String>, outcome: Option<String>) {
        if let Some(message) = outcome {
            self.errors.insert(key.into(), message);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn extend(&mut self, other: ValidationState) {
        self.errors.extend(other.errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_failures_are_kept() {
        let mut state = ValidationState::new();
        state.check(keys::NAME, None);
        state.check(keys::EMAIL, Some("Email is required".into()));
        assert_eq!(state.len(), 1);
        assert_eq!(state.get(keys::EMAIL), Some("Email is required"));
        assert_eq!(state.get(keys::NAME), None);
    }

    #[test]
    fn address_keys() {
        assert_eq!(
            keys::address(AddressSlot::Corporate, AddressField::ZipCode),
            "corporate_zipCode"
        );
        assert_eq!(keys::doc_image(AddressSlot::Permanent), "permanentDocImage");
    }
}
