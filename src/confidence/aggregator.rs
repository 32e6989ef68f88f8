//! Confidence aggregation over extracted-document signals.
//!
//! Each field carries a coarse category and, optionally, an explicit score.
//! Reportable fields are scored (explicit score first, category table
//! otherwise), classified into pass/review/fail, and averaged into one
//! overall percentage.

use serde::{Deserialize, Serialize};

/// Match-quality label attached to an extracted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfidenceCategory {
    High,
    #[serde(rename = "Almost_High")]
    AlmostHigh,
    Medium,
    Low,
    #[serde(rename = "Full_Mismatch")]
    FullMismatch,
    #[serde(rename = "Face_Not_Visible")]
    FaceNotVisible,
    Match,
    #[serde(rename = "No_Match")]
    NoMatch,
    #[serde(rename = "Not_Applicable")]
    NotApplicable,
    NotRead,
}

/// Outcome bucket for a reportable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Pass,
    Review,
    Fail,
}

impl ConfidenceCategory {
    /// Fields labelled `Not_Applicable` or `NotRead` are left out of every
    /// count and of the mean.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, Self::NotApplicable | Self::NotRead)
    }

    /// Score used when the field carries no explicit one.
    pub fn default_score(&self) -> Option<f64> {
        let score = match self {
            Self::High | Self::Match => 100.0,
            Self::AlmostHigh => 85.0,
            Self::Medium => 65.0,
            Self::FaceNotVisible => 50.0,
            Self::Low => 35.0,
            Self::FullMismatch | Self::NoMatch => 0.0,
            Self::NotApplicable | Self::NotRead => return None,
        };
        Some(score)
    }

    pub fn classification(&self) -> Option<Classification> {
        match self {
            Self::High | Self::AlmostHigh | Self::Match => Some(Classification::Pass),
            Self::Medium | Self::FaceNotVisible => Some(Classification::Review),
            Self::Low | Self::FullMismatch | Self::NoMatch => Some(Classification::Fail),
            Self::NotApplicable | Self::NotRead => None,
        }
    }

    /// Human label, e.g. "Almost High".
    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::AlmostHigh => "Almost High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::FullMismatch => "Full Mismatch",
            Self::FaceNotVisible => "Face Not Visible",
            Self::Match => "Match",
            Self::NoMatch => "No Match",
            Self::NotApplicable => "Not Applicable",
            Self::NotRead => "Not Read",
        }
    }
}

impl std::str::FromStr for ConfidenceCategory {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "High" => Ok(Self::High),
            "Almost_High" => Ok(Self::AlmostHigh),
            "Medium" => Ok(Self::Medium),
            "Low" => Ok(Self::Low),
            "Full_Mismatch" => Ok(Self::FullMismatch),
            "Face_Not_Visible" => Ok(Self::FaceNotVisible),
            "Match" => Ok(Self::Match),
            "No_Match" => Ok(Self::NoMatch),
            "Not_Applicable" => Ok(Self::NotApplicable),
            "NotRead" => Ok(Self::NotRead),
            _ => Err(format!("Unknown confidence category: {}", s)),
        }
    }
}

/// One named signal going into the aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceItem {
    pub label: String,
    pub category: Option<ConfidenceCategory>,
    /// Explicit 0–100 score overriding the category table.
    pub score: Option<f64>,
}

impl ConfidenceItem {
    pub fn new(label: impl Into<String>, category: Option<ConfidenceCategory>) -> Self {
        Self {
            label: label.into(),
            category,
            score: None,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }
}

/// A reportable field after scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredField {
    pub label: String,
    pub category: ConfidenceCategory,
    pub score: f64,
    pub classification: Classification,
}

/// Aggregate view over a set of confidence items.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfidenceSummary {
    pub fields: Vec<ScoredField>,
    pub pass: usize,
    pub review: usize,
    pub fail: usize,
    /// Rounded mean of the field scores, 0 when nothing is reportable.
    pub overall: u32,
}

impl ConfidenceSummary {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Score, classify and average every reportable item.
pub fn aggregate(items: &[ConfidenceItem]) -> ConfidenceSummary {
    let mut summary = ConfidenceSummary::default();

    for item in items {
        let Some(category) = item.category.filter(|c| c.is_reportable()) else {
            continue;
        };
        let (Some(fallback), Some(classification)) =
            (category.default_score(), category.classification())
        else {
            continue;
        };

        let score = item.score.filter(|s| s.is_finite()).unwrap_or(fallback);

        match classification {
            Classification::Pass => summary.pass += 1,
            Classification::Review => summary.review += 1,
            Classification::Fail => summary.fail += 1,
        }

        summary.fields.push(ScoredField {
            label: item.label.clone(),
            category,
            score,
            classification,
        });
    }

    if !summary.fields.is_empty() {
        let total: f64 = summary.fields.iter().map(|f| f.score).sum();
        let mean = total / summary.fields.len() as f64;
        summary.overall = mean.round().max(0.0) as u32;
    }

    summary
}
