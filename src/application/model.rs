//! KYC application record and its parts.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::confidence::DocumentMatch;

/// Lifecycle status of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KycStatus {
    #[default]
    Pending,
    UnderReview,
    Approved,
    Rejected,
}

impl KycStatus {
    /// Only pending applications can be walked through the wizard.
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for KycStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::UnderReview => "under_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for KycStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "under_review" => Ok(Self::UnderReview),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("Unknown KYC status: {}", s)),
        }
    }
}

/// Officially valid document types accepted as address proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OvdType {
    NationalId,
    DrivingLicense,
    TaxIdCard,
    Passport,
    VoterCard,
}

impl OvdType {
    pub const ALL: [OvdType; 5] = [
        Self::NationalId,
        Self::DrivingLicense,
        Self::TaxIdCard,
        Self::Passport,
        Self::VoterCard,
    ];

    /// Wire token used by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NationalId => "AadhaarCard",
            Self::DrivingLicense => "DrivingLicense",
            Self::TaxIdCard => "PanCard",
            Self::Passport => "Passport",
            Self::VoterCard => "VoterCard",
        }
    }
}

impl std::fmt::Display for OvdType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OvdType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown document type: {}", s))
    }
}

/// Gender vocabulary offered by the basic-info step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl std::str::FromStr for Gender {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown gender: {}", s)),
        }
    }
}

/// Which of the two address records an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressSlot {
    Permanent,
    /// The current (correspondence) address. Named "corporate" on the wire.
    Corporate,
}

impl std::fmt::Display for AddressSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Permanent => write!(f, "permanent"),
            Self::Corporate => write!(f, "corporate"),
        }
    }
}

/// A postal address. `city`, `state` and `country` are derived from the zip
/// code and never edited directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, deserialize_with = "nullable")]
    pub street_address: String,
    #[serde(default, deserialize_with = "nullable")]
    pub city: String,
    #[serde(default, deserialize_with = "nullable")]
    pub state: String,
    #[serde(default, deserialize_with = "nullable")]
    pub zip_code: String,
    #[serde(default, deserialize_with = "nullable")]
    pub country: String,
}

impl Address {
    pub fn is_empty(&self) -> bool {
        self.street_address.is_empty()
            && self.city.is_empty()
            && self.state.is_empty()
            && self.zip_code.is_empty()
            && self.country.is_empty()
    }

    /// Drop everything a zip code resolution would have filled in.
    pub fn clear_locality(&mut self) {
        self.city.clear();
        self.state.clear();
        self.country.clear();
    }
}

/// An address-proof document slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    #[serde(default, with = "ovd_type_or_empty")]
    pub ovd_type: Option<OvdType>,
    /// Encoded image (data URL or bare base64), empty when absent.
    #[serde(default, deserialize_with = "nullable")]
    pub ovd_image: String,
}

impl DocumentRecord {
    pub fn is_empty(&self) -> bool {
        self.ovd_type.is_none() && self.ovd_image.is_empty()
    }
}

/// Selfie capture and its liveness result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LivenessRecord {
    #[serde(rename = "livenessImage", default, deserialize_with = "nullable")]
    pub image: String,
    #[serde(rename = "livenessScore", default, deserialize_with = "nullable")]
    pub score: f64,
    #[serde(rename = "livenessStatus", default, deserialize_with = "nullable")]
    pub status: String,
}

impl LivenessRecord {
    /// A capture counts as verified once a check stored its score and status.
    /// Capturing or retaking clears both, so this never outlives the image it
    /// was computed for.
    pub fn is_verified(&self) -> bool {
        !self.image.is_empty() && self.score > 0.0 && !self.status.is_empty()
    }

    pub fn is_captured(&self) -> bool {
        !self.image.is_empty()
    }

    /// Forget any verification result, keeping the capture.
    pub fn reset_result(&mut self) {
        self.score = 0.0;
        self.status.clear();
    }

    pub fn clear(&mut self) {
        self.image.clear();
        self.reset_result();
    }
}

/// The in-memory application walked through by the wizard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycApplication {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub father_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub email_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub mobile_no: String,
    #[serde(default, deserialize_with = "nullable")]
    pub dob: String,
    #[serde(default, deserialize_with = "nullable")]
    pub gender: String,
    #[serde(default, deserialize_with = "nullable")]
    pub photo_image: String,

    #[serde(default, deserialize_with = "nullable")]
    pub permanent_address: Address,
    #[serde(default, deserialize_with = "nullable")]
    pub corporate_address: Address,
    #[serde(default)]
    pub is_same_address: bool,

    #[serde(
        rename = "permanentAddressDocuments",
        default,
        deserialize_with = "nullable"
    )]
    pub permanent_document: DocumentRecord,
    #[serde(
        rename = "corporateAddressDocuments",
        default,
        deserialize_with = "nullable"
    )]
    pub corporate_document: DocumentRecord,

    #[serde(flatten)]
    pub liveness: LivenessRecord,

    #[serde(default)]
    pub status: KycStatus,

    /// Extracted-signal results for the permanent address proof.
    #[serde(rename = "perPOA", default, skip_serializing_if = "Option::is_none")]
    pub permanent_match: Option<DocumentMatch>,
    /// Extracted-signal results for the current address proof.
    #[serde(rename = "corPOA", default, skip_serializing_if = "Option::is_none")]
    pub corporate_match: Option<DocumentMatch>,
}

impl KycApplication {
    pub fn address(&self, slot: AddressSlot) -> &Address {
        match slot {
            AddressSlot::Permanent => &self.permanent_address,
            AddressSlot::Corporate => &self.corporate_address,
        }
    }

    pub fn address_mut(&mut self, slot: AddressSlot) -> &mut Address {
        match slot {
            AddressSlot::Permanent => &mut self.permanent_address,
            AddressSlot::Corporate => &mut self.corporate_address,
        }
    }

    pub fn document(&self, slot: AddressSlot) -> &DocumentRecord {
        match slot {
            AddressSlot::Permanent => &self.permanent_document,
            AddressSlot::Corporate => &self.corporate_document,
        }
    }

    pub fn document_mut(&mut self, slot: AddressSlot) -> &mut DocumentRecord {
        match slot {
            AddressSlot::Permanent => &mut self.permanent_document,
            AddressSlot::Corporate => &mut self.corporate_document,
        }
    }

    pub fn document_match(&self, slot: AddressSlot) -> Option<&DocumentMatch> {
        match slot {
            AddressSlot::Permanent => self.permanent_match.as_ref(),
            AddressSlot::Corporate => self.corporate_match.as_ref(),
        }
    }

    /// Both addresses were filled in and are identical.
    pub fn addresses_match(&self) -> bool {
        !self.permanent_address.is_empty()
            && !self.corporate_address.is_empty()
            && self.permanent_address == self.corporate_address
    }
}

/// Treat `null` the same as a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `ovdType` travels as a string where `""` means "not chosen yet".
mod ovd_type_or_empty {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::OvdType;

    pub fn serialize<S: Serializer>(value: &Option<OvdType>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.map(|t| t.as_str()).unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<OvdType>, D::Error> {
        let raw = Option::<String>::deserialize(d)?.unwrap_or_default();
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse().map(Some).map_err(serde::de::Error::custom)
    }
}

impl Serialize for OvdType {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OvdType {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
