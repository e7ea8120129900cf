//! Plain-text validation report.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use sspkit_core::{RunSummary, ValidationReport};
use tracing::info;

pub const REPORT_FILE: &str = "validation_report.txt";

pub fn render_report(generated: &str, summary: &RunSummary, validation: &ValidationReport) -> String {
    Report {
        generated,
        summary,
        validation,
    }
    .to_string()
}

struct Report<'a> {
    generated: &'a str,
    summary: &'a RunSummary,
    validation: &'a ValidationReport,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(80);
        let thin = "-".repeat(40);
        let summary = self.summary;

        writeln!(f, "{rule}")?;
        writeln!(f, "CMMC SSP Validation Report")?;
        writeln!(f, "Generated: {}", self.generated)?;
        writeln!(f, "{rule}")?;
        writeln!(f)?;

        writeln!(f, "SUMMARY STATISTICS")?;
        writeln!(f, "{thin}")?;
        writeln!(f, "Total Controls Processed: {}", summary.total_controls)?;

        if summary.controls_with_evidence > 0 {
            writeln!(f)?;
            writeln!(f, "Evidence Enrichment:")?;
            writeln!(
                f,
                "  Controls with enriched evidence: {}",
                summary.controls_with_evidence
            )?;
            writeln!(f, "  Total evidence entries: {}", summary.evidence_entries)?;
        }

        writeln!(f)?;
        writeln!(f, "POA&M Summary:")?;
        writeln!(f, "  Implemented: {}", summary.implemented)?;
        writeln!(f, "  Audit Ready: {}", summary.audit_ready)?;
        writeln!(f, "  POA&M: {}", summary.poam)?;

        if !self.validation.errors.is_empty() {
            writeln!(f)?;
            writeln!(f, "CRITICAL ERRORS (Must Fix)")?;
            writeln!(f, "{thin}")?;
            for error in &self.validation.errors {
                writeln!(f, "[ERROR] {error}")?;
            }
        }

        if !self.validation.warnings.is_empty() {
            writeln!(f)?;
            writeln!(f, "WARNINGS (Should Review)")?;
            writeln!(f, "{thin}")?;
            for warning in &self.validation.warnings {
                writeln!(f, "[WARN]  {warning}")?;
            }
        }

        Ok(())
    }
}

/// Write the report into `output_dir`, returning its path.
pub fn write_report(output_dir: &Path, report: &str) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;
    let path = output_dir.join(REPORT_FILE);
    std::fs::write(&path, report).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "validation report saved");
    Ok(path)
}
