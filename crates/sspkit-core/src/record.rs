//! Row types for the control dataset and the evidence-mapping dataset.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One row of the primary SSP dataset, keyed by `CMMC_ID`.
///
/// Every field is optional at the row level: blank cells deserialize to
/// `None` and missing columns fall back to `None` as well. Only the presence
/// of the `CMMC_ID` header is enforced, by the loader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlRecord {
    #[serde(rename = "CMMC_ID")]
    pub id: Option<String>,
    #[serde(rename = "Control")]
    pub control: Option<String>,
    /// Raw score cell; see [`ControlRecord::score`] for the typed value.
    #[serde(rename = "Score")]
    pub score: Option<String>,
    /// Raw remediation status (`AR_CAP_POAM`).
    #[serde(rename = "AR_CAP_POAM")]
    pub status: Option<String>,
    #[serde(rename = "Policy_Statement")]
    pub policy_statement: Option<String>,
    #[serde(rename = "Azure_Mechanism")]
    pub azure_mechanism: Option<String>,
    #[serde(rename = "Azure_Configuration_Process")]
    pub azure_configuration_process: Option<String>,
    #[serde(rename = "Azure_Evidence")]
    pub azure_evidence: Option<String>,
    #[serde(rename = "AVD_Laptop")]
    pub avd_laptop: Option<String>,
    #[serde(rename = "AVD_Laptop_Evidence")]
    pub avd_laptop_evidence: Option<String>,
    /// Inline evidence text, itself `|`/`;` delimited.
    #[serde(rename = "Evidence_Strings")]
    pub evidence_strings: Option<String>,
}

impl ControlRecord {
    /// Trimmed control identifier, `None` when blank.
    pub fn control_id(&self) -> Option<&str> {
        non_blank(self.id.as_deref())
    }

    pub fn score(&self) -> Option<Score> {
        self.score.as_deref().and_then(Score::parse)
    }

    pub fn remediation_status(&self) -> RemediationStatus {
        RemediationStatus::parse(self.status.as_deref())
    }
}

/// One row of the evidence-mapping dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceRecord {
    #[serde(rename = "File_Name")]
    pub file_name: Option<String>,
    #[serde(rename = "Current_Sharepoint_Link")]
    pub link: Option<String>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    /// Primary mapping field.
    #[serde(rename = "Suggested_CMMC_Mappings")]
    pub suggested_mappings: Option<String>,
    /// Fallback mapping field, consulted only when the primary one is blank.
    #[serde(rename = "Provided_CMMC_Mappings")]
    pub provided_mappings: Option<String>,
}

impl EvidenceRecord {
    /// True when the description carries the `IGNORE` marker (any case).
    pub fn is_ignored(&self) -> bool {
        self.description
            .as_deref()
            .is_some_and(|d| d.to_uppercase().contains(IGNORE_MARKER))
    }
}

pub(crate) const IGNORE_MARKER: &str = "IGNORE";

/// Control score tier. Only tier one may carry a POA&M.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Score {
    One,
    Three,
    Five,
}

impl Score {
    /// Parse a raw score cell.
    ///
    /// Accepts integral spellings such as `"3"` and `"3.0"` (spreadsheet
    /// exports write floats whenever a column has gaps). Anything else,
    /// including other integers, is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let value: f64 = raw.parse().ok()?;
        if value.fract() != 0.0 {
            return None;
        }
        match value as i64 {
            1 => Some(Self::One),
            3 => Some(Self::Three),
            5 => Some(Self::Five),
            _ => None,
        }
    }

    pub fn value(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Three => 3,
            Self::Five => 5,
        }
    }

    /// Whether a control at this tier may be placed on a POA&M.
    pub fn allows_poam(self) -> bool {
        self == Self::One
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Remediation status resolved from the free-text `AR_CAP_POAM` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemediationStatus {
    Implemented,
    AuditReady,
    PoaM,
}

impl RemediationStatus {
    pub fn parse(raw: Option<&str>) -> Self {
        let upper = raw.map(|s| s.trim().to_uppercase()).unwrap_or_default();
        match upper.as_str() {
            "POA&M" | "POAM" => Self::PoaM,
            "AUDIT READY" => Self::AuditReady,
            _ => Self::Implemented,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Implemented => "Implemented",
            Self::AuditReady => "Audit Ready",
            Self::PoaM => "Plan of Action & Milestones (POA&M)",
        }
    }
}

impl fmt::Display for RemediationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Trim `value`, returning `None` when nothing is left.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
