//! Document-match result returned by the verification backend for one
//! address-proof slot.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use super::aggregator::{ConfidenceCategory, ConfidenceItem, ConfidenceSummary, aggregate};

/// Extracted values and per-field confidence for one document.
///
/// Only the signals the review summary uses are modelled; everything else
/// the backend sends is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentMatch {
    pub classified_ovd_type: Option<String>,

    pub photo_match_confidence: Option<String>,

    pub ovd_number_extracted: Option<String>,
    pub ovd_number_confidence: Option<String>,
    #[serde(deserialize_with = "lenient_score")]
    pub ovd_number_extraction_confidence_score: Option<f64>,

    pub name_extracted: Option<String>,
    pub name_confidence: Option<String>,
    #[serde(deserialize_with = "lenient_score")]
    pub name_extraction_confidence_score: Option<f64>,

    pub dob_extracted: Option<String>,
    pub dob_confidence: Option<String>,
    #[serde(deserialize_with = "lenient_score")]
    pub dob_extraction_confidence_score: Option<f64>,

    pub gender_extracted: Option<String>,
    pub gender_confidence: Option<String>,
    #[serde(deserialize_with = "lenient_score")]
    pub gender_extraction_confidence_score: Option<f64>,

    pub spouse_name_extracted: Option<String>,
    pub spouse_name_confidence: Option<String>,
    #[serde(deserialize_with = "lenient_score")]
    pub spouse_name_extraction_confidence_score: Option<f64>,

    pub father_name_extracted: Option<String>,
    pub father_name_confidence: Option<String>,
    #[serde(deserialize_with = "lenient_score")]
    pub father_name_extraction_confidence_score: Option<f64>,

    pub address_extracted: Option<String>,
    pub address_confidence: Option<String>,
    #[serde(deserialize_with = "lenient_score")]
    pub address_extraction_confidence_score: Option<f64>,

    pub pin_extracted: Option<String>,
    pub pin_confidence: Option<String>,
    #[serde(deserialize_with = "lenient_score")]
    pub pin_extraction_confidence_score: Option<f64>,

    pub expiry_date_extracted: Option<String>,
    pub is_expired: Option<bool>,
}

impl DocumentMatch {
    /// The fixed set of match signals, in display order.
    pub fn confidence_items(&self) -> Vec<ConfidenceItem> {
        let fields: [(&str, &Option<String>, Option<f64>); 9] = [
            ("Photo Match", &self.photo_match_confidence, None),
            (
                "OVD Number Match",
                &self.ovd_number_confidence,
                self.ovd_number_extraction_confidence_score,
            ),
            (
                "Name Match",
                &self.name_confidence,
                self.name_extraction_confidence_score,
            ),
            (
                "DOB Match",
                &self.dob_confidence,
                self.dob_extraction_confidence_score,
            ),
            (
                "Gender Match",
                &self.gender_confidence,
                self.gender_extraction_confidence_score,
            ),
            (
                "Spouse Name Match",
                &self.spouse_name_confidence,
                self.spouse_name_extraction_confidence_score,
            ),
            (
                "Father Name Match",
                &self.father_name_confidence,
                self.father_name_extraction_confidence_score,
            ),
            (
                "Address Match",
                &self.address_confidence,
                self.address_extraction_confidence_score,
            ),
            (
                "Pin Match",
                &self.pin_confidence,
                self.pin_extraction_confidence_score,
            ),
        ];

        fields
            .into_iter()
            .map(|(label, raw, score)| {
                let category = raw.as_deref().filter(|s| !s.is_empty()).and_then(|s| {
                    s.parse::<ConfidenceCategory>()
                        .inspect_err(|e| debug!(field = label, "{e}"))
                        .ok()
                });
                ConfidenceItem {
                    label: label.to_string(),
                    category,
                    score,
                }
            })
            .collect()
    }

    pub fn summary(&self) -> ConfidenceSummary {
        aggregate(&self.confidence_items())
    }
}

/// Scores arrive as numbers, numeric strings, or not at all.
fn lenient_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|s| s.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_items_from_backend_payload() {
        let json = serde_json::json!({
            "classifiedOvdType": "AadhaarRegular",
            "photoMatchConfidence": "Match",
            "nameConfidence": "High",
            "nameExtractionConfidenceScore": 92,
            "dobConfidence": "Medium",
            "dobExtractionConfidenceScore": "60",
            "spouseNameConfidence": "Not_Applicable",
            "pinConfidence": "NotRead",
            "addressConfidence": "Low",
            "addressExtractionConfidenceScore": "n/a",
            "someOtherField": "ignored"
        });
        let result: DocumentMatch = serde_json::from_value(json).unwrap();
        assert_eq!(result.name_extraction_confidence_score, Some(92.0));
        assert_eq!(result.dob_extraction_confidence_score, Some(60.0));
        assert_eq!(result.address_extraction_confidence_score, None);

        let summary = result.summary();
        // photo (100), name (92), dob (60), address (35)
        assert_eq!(summary.fields.len(), 4);
        assert_eq!(summary.overall, 72);
        assert_eq!((summary.pass, summary.review, summary.fail), (2, 1, 1));
    }

    #[test]
    fn unknown_category_is_skipped() {
        let result = DocumentMatch {
            name_confidence: Some("Somewhat".into()),
            gender_confidence: Some("High".into()),
            ..Default::default()
        };
        let summary = result.summary();
        assert_eq!(summary.fields.len(), 1);
        assert_eq!(summary.fields[0].label, "Gender Match");
    }

    #[test]
    fn empty_result_has_no_fields() {
        let summary = DocumentMatch::default().summary();
        assert!(summary.is_empty());
        assert_eq!(summary.overall, 0);
    }
}
