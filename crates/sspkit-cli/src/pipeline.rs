//! End-to-end run: evidence index → control rows → validation → outputs.

use std::path::PathBuf;

use anyhow::Context;
use sspkit_core::{
    Config, ControlFilter, ControlRecord, EvidenceIndex, RunSummary, ValidationReport,
    compute_summary, validate_controls,
};
use tracing::{info, warn};

use crate::export::write_family_exports;
use crate::report::{render_report, write_report};
use crate::view::ControlView;

/// Options for a single `run` invocation that are not part of [`Config`].
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub filter: ControlFilter,
}

/// What a run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub summary: RunSummary,
    pub validation: ValidationReport,
    pub exports: Vec<PathBuf>,
    pub report: Option<PathBuf>,
    /// Set when an active filter matched no controls.
    pub nothing_selected: bool,
}

/// Build the evidence index. A missing evidence file yields an empty index.
pub fn load_index(config: &Config) -> anyhow::Result<EvidenceIndex> {
    let Some(path) = &config.evidence_csv else {
        info!("no evidence enrichment configured");
        return Ok(EvidenceIndex::default());
    };

    let table = sspkit_store::load_evidence(path)
        .with_context(|| format!("loading evidence enrichment {}", path.display()))?;
    let Some(table) = table else {
        warn!(path = %path.display(), "evidence enrichment file not found");
        return Ok(EvidenceIndex::default());
    };

    let (index, stats) = EvidenceIndex::build(&table.rows);
    info!(
        rows = stats.rows,
        appended = stats.appended,
        empty = stats.empty,
        "loaded evidence for {} controls",
        index.len()
    );
    Ok(index)
}

/// Load the control dataset. Any failure here is fatal to the run.
pub fn load_controls(config: &Config) -> anyhow::Result<Vec<ControlRecord>> {
    let table = sspkit_store::load_controls(&config.input_csv)
        .with_context(|| format!("loading control dataset {}", config.input_csv.display()))?;
    Ok(table.rows)
}

pub fn run(config: &Config, options: &RunOptions) -> anyhow::Result<RunOutcome> {
    let index = load_index(config)?;
    let rows = load_controls(config)?;

    let selected = options.filter.apply(&rows);
    if options.filter.is_active() && selected.is_empty() {
        warn!("no controls matched the filter criteria");
        return Ok(RunOutcome {
            summary: RunSummary::default(),
            validation: ValidationReport::default(),
            exports: Vec::new(),
            report: None,
            nothing_selected: true,
        });
    }

    let validation = if config.validate_poam_rules {
        validate_controls(selected.iter().copied())
    } else {
        info!("skipping validation");
        ValidationReport::default()
    };

    let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let exports = if config.export_json {
        info!("generating JSON exports");
        let views: Vec<ControlView> = selected
            .iter()
            .filter_map(|row| ControlView::build(row, &index))
            .collect();
        write_family_exports(
            &config.output_dir,
            views,
            &generated,
            &config.evidence_base_path,
        )?
    } else {
        Vec::new()
    };

    let summary = compute_summary(selected.iter().copied(), &index, &validation);
    let report = render_report(&generated, &summary, &validation);
    let report_path = write_report(&config.output_dir, &report)?;

    Ok(RunOutcome {
        summary,
        validation,
        exports,
        report: Some(report_path),
        nothing_selected: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const CONTROLS: &str = "\
CMMC_ID,Control,Score,AR_CAP_POAM,Evidence_Strings
3.4.1,Establish baselines,5,Audit Ready,Manual review.
3.4.2,Enforce settings,3,POA&M,
3.1.1,Limit access,1,POA&M,
";

    const EVIDENCE: &str = "\
File_Name|Current_Sharepoint_Link|Description|Suggested_CMMC_Mappings|Provided_CMMC_Mappings
backup.pdf|http://s|Backup logs|3.4.1;3.4.2|
";

    fn config(dir: &Path, evidence: bool) -> Config {
        std::fs::write(dir.join("ssp.csv"), CONTROLS).unwrap();
        let evidence_csv = dir.join("evidence.csv");
        if evidence {
            std::fs::write(&evidence_csv, EVIDENCE).unwrap();
        }
        Config {
            input_csv: dir.join("ssp.csv"),
            evidence_csv: Some(evidence_csv),
            output_dir: dir.join("out"),
            ..Default::default()
        }
    }

    #[test]
    fn full_run_writes_outputs() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = config(tmp.path(), true);
        let outcome = run(&config, &RunOptions::default()).unwrap();

        assert_eq!(outcome.summary.total_controls, 3);
        assert_eq!(outcome.summary.poam, 2);
        assert_eq!(outcome.summary.controls_with_evidence, 2);
        assert_eq!(outcome.validation.errors.len(), 1);
        assert!(outcome.validation.errors[0].message.contains("3.4.2"));

        let out = tmp.path().join("out");
        assert_eq!(outcome.exports, vec![out.join("CM_controls.json"), out.join("AC_controls.json")]);
        assert!(out.join("validation_report.txt").exists());

        let cm: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.join("CM_controls.json")).unwrap())
                .unwrap();
        assert_eq!(
            cm["controls"][0]["evidence"],
            serde_json::json!(["Manual review", "[http://s] - Backup logs"])
        );
        assert_eq!(
            cm["controls"][1]["evidence"],
            serde_json::json!(["[http://s] - Backup logs"])
        );
    }

    #[test]
    fn missing_evidence_file_is_not_fatal() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = config(tmp.path(), false);
        let outcome = run(&config, &RunOptions::default()).unwrap();
        assert_eq!(outcome.summary.controls_with_evidence, 0);
        assert_eq!(outcome.summary.total_controls, 3);
    }

    #[test]
    fn missing_control_file_is_fatal() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut config = config(tmp.path(), true);
        config.input_csv = tmp.path().join("absent.csv");
        assert!(run(&config, &RunOptions::default()).is_err());
    }

    #[test]
    fn filter_without_matches_stops_early() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = config(tmp.path(), true);
        let options = RunOptions {
            filter: ControlFilter {
                families: vec!["SI".into()],
                ..Default::default()
            },
        };
        let outcome = run(&config, &options).unwrap();
        assert!(outcome.nothing_selected);
        assert!(outcome.report.is_none());
        assert!(!tmp.path().join("out").join("validation_report.txt").exists());
    }

    #[test]
    fn skipped_validation_reports_no_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut config = config(tmp.path(), true);
        config.validate_poam_rules = false;
        config.export_json = false;
        let outcome = run(&config, &RunOptions::default()).unwrap();
        assert!(!outcome.validation.has_errors());
        assert!(outcome.exports.is_empty());
    }
}
