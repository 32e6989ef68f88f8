//! Step slices: the part of the application each step persists.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::model::{Address, DocumentRecord, KycApplication};

/// Payload of the personal-info save call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalSlice {
    pub name: String,
    pub gender: String,
    /// Always `YYYY-MM-DD`.
    pub dob: String,
    pub email_id: String,
    pub mobile_no: String,
    pub father_name: String,
    pub photo_image: String,
}

/// Payload of the address save call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSlice {
    pub permanent_address: Address,
    pub corporate_address: Address,
}

/// Payload of the documents save call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentsSlice {
    pub permanent_address_documents: DocumentRecord,
    pub corporate_address_documents: DocumentRecord,
}

/// Payload of the liveness save call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LivenessSlice {
    pub liveness_status: String,
    pub liveness_score: f64,
    pub liveness_image: String,
}

/// Parse a date of birth in either `YYYY-MM-DD` or `DD/MM/YYYY` form.
pub fn parse_dob(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok()
}

/// Canonical `YYYY-MM-DD` form of a date of birth, or empty when unparseable.
pub fn normalize_dob(raw: &str) -> String {
    parse_dob(raw)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

impl KycApplication {
    pub fn personal_slice(&self) -> PersonalSlice {
        PersonalSlice {
            name: self.name.trim().to_string(),
            gender: self.gender.clone(),
            dob: normalize_dob(&self.dob),
            email_id: self.email_id.trim().to_string(),
            mobile_no: self.mobile_no.clone(),
            father_name: self.father_name.trim().to_string(),
            photo_image: self.photo_image.clone(),
        }
    }

    pub fn address_slice(&self) -> AddressSlice {
        AddressSlice {
            permanent_address: self.permanent_address.clone(),
            corporate_address: self.corporate_address.clone(),
        }
    }

    /// With synced addresses a single proof covers both slots.
    pub fn documents_slice(&self) -> DocumentsSlice {
        let corporate = if self.is_same_address {
            self.permanent_document.clone()
        } else {
            self.corporate_document.clone()
        };
        DocumentsSlice {
            permanent_address_documents: self.permanent_document.clone(),
            corporate_address_documents: corporate,
        }
    }

    pub fn liveness_slice(&self) -> LivenessSlice {
        LivenessSlice {
            liveness_status: self.liveness.status.clone(),
            liveness_score: self.liveness.score,
            liveness_image: self.liveness.image.clone(),
        }
    }
}
