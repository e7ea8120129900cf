use serde::Serialize;

use crate::evidence::EvidenceIndex;
use crate::record::{ControlRecord, RemediationStatus};
use crate::validate::ValidationReport;

/// Aggregate counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total_controls: usize,
    pub implemented: usize,
    pub audit_ready: usize,
    pub poam: usize,
    pub controls_with_evidence: usize,
    pub evidence_entries: usize,
    pub errors: usize,
    pub warnings: usize,
}

/// Compute run totals from the processed rows, the index, and validation.
pub fn compute_summary<'a, I>(
    rows: I,
    index: &EvidenceIndex,
    validation: &ValidationReport,
) -> RunSummary
where
    I: IntoIterator<Item = &'a ControlRecord>,
{
    let mut summary = RunSummary {
        controls_with_evidence: index.len(),
        evidence_entries: index.total_entries(),
        errors: validation.errors.len(),
        warnings: validation.warnings.len(),
        ..Default::default()
    };

    for row in rows {
        summary.total_controls += 1;
        match row.remediation_status() {
            RemediationStatus::Implemented => summary.implemented += 1,
            RemediationStatus::AuditReady => summary.audit_ready += 1,
            RemediationStatus::PoaM => summary.poam += 1,
        }
    }

    summary
}
