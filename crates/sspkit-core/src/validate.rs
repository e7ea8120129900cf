//! Business-rule validation for control rows.
//!
//! Validation never stops early: every row is checked and every violation is
//! collected, so the operator sees the whole picture in one report.

use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::record::{ControlRecord, RemediationStatus, non_blank};

/// Which rule a finding came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    MissingId,
    MissingDescription,
    InvalidScore,
    NonPoamableOnPoam,
}

/// One rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Zero-based data row (header excluded).
    pub row: usize,
    pub control_id: Option<String>,
    pub kind: FindingKind,
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Collected errors and warnings, each in row order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Check every row against the score and POA&M rules.
pub fn validate_controls<'a, I>(rows: I) -> ValidationReport
where
    I: IntoIterator<Item = &'a ControlRecord>,
{
    info!("starting data validation");
    let mut report = ValidationReport::default();

    let mut checked = 0;
    for (row, record) in rows.into_iter().enumerate() {
        check_row(row, record, &mut report);
        checked += 1;
    }

    info!(
        rows = checked,
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "validation complete"
    );
    report
}

fn check_row(row: usize, record: &ControlRecord, report: &mut ValidationReport) {
    let Some(id) = record.control_id() else {
        report.errors.push(Finding {
            row,
            control_id: None,
            kind: FindingKind::MissingId,
            message: format!("Row {row}: Missing CMMC_ID"),
        });
        return;
    };

    let finding = |kind, message| Finding {
        row,
        control_id: Some(id.to_string()),
        kind,
        message,
    };

    if non_blank(record.control.as_deref()).is_none() {
        report.warnings.push(finding(
            FindingKind::MissingDescription,
            format!("Control {id}: Missing Control description"),
        ));
    }

    let raw_score = record.score.as_deref().unwrap_or("");
    match record.score() {
        None => report.errors.push(finding(
            FindingKind::InvalidScore,
            format!("Control {id}: Invalid Score value '{raw_score}' (must be 1, 3, or 5)"),
        )),
        Some(score)
            if !score.allows_poam()
                && record.remediation_status() == RemediationStatus::PoaM =>
        {
            let raw_status = record.status.as_deref().unwrap_or("");
            report.errors.push(finding(
                FindingKind::NonPoamableOnPoam,
                format!(
                    "Control {id}: CRITICAL - Score={score} (non-POAMable) but AR_CAP_POAM='{raw_status}'"
                ),
            ));
        }
        Some(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn control(id: &str, score: &str, status: &str) -> ControlRecord {
        ControlRecord {
            id: Some(id.into()),
            control: Some("Limit system access".into()),
            score: Some(score.into()),
            status: Some(status.into()),
            ..Default::default()
        }
    }

    #[test]
    fn score_three_on_poam_is_critical() {
        let report = validate_controls(&[control("3.1.5", "3", "POA&M")]);
        assert_eq!(report.errors.len(), 1);
        let err = &report.errors[0];
        assert_eq!(err.kind, FindingKind::NonPoamableOnPoam);
        assert!(err.message.contains("3.1.5"));
        assert!(err.message.contains("CRITICAL"));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn score_one_on_poam_is_fine() {
        let report = validate_controls(&[control("3.1.5", "1", "POA&M")]);
        assert!(!report.has_errors());
    }

    #[test]
    fn score_five_on_poam_alias() {
        let report = validate_controls(&[control("3.1.6", "5", "poam")]);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, FindingKind::NonPoamableOnPoam);
    }

    #[test]
    fn invalid_score() {
        let report = validate_controls(&[control("3.2.1", "2", "Implemented")]);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(
            report.errors[0].message,
            "Control 3.2.1: Invalid Score value '2' (must be 1, 3, or 5)"
        );
    }

    #[test]
    fn invalid_score_skips_poam_rule() {
        let report = validate_controls(&[control("3.2.1", "4", "POA&M")]);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, FindingKind::InvalidScore);
    }

    #[test]
    fn missing_id_short_circuits_row() {
        let rows = [
            ControlRecord {
                id: Some(" ".into()),
                score: Some("7".into()),
                ..Default::default()
            },
            control("3.3.1", "5", "Audit Ready"),
        ];
        let report = validate_controls(&rows);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].message, "Row 0: Missing CMMC_ID");
        assert_eq!(report.errors[0].control_id, None);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn missing_description_is_a_warning() {
        let mut row = control("3.4.1", "1", "");
        row.control = None;
        let report = validate_controls(&[row]);
        assert!(!report.has_errors());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].kind, FindingKind::MissingDescription);
    }

    #[test]
    fn all_rows_are_evaluated_in_order() {
        let rows = [
            control("3.1.1", "9", ""),
            control("3.1.2", "3", "POAM"),
            control("3.1.3", "1", "POAM"),
        ];
        let report = validate_controls(&rows);
        let rows_hit: Vec<usize> = report.errors.iter().map(|f| f.row).collect();
        assert_eq!(rows_hit, vec![0, 1]);
    }
}
