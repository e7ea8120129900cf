mod display;
mod export;
mod logging;
mod pipeline;
mod report;
mod view;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use sspkit_core::{Config, ControlFilter};

use crate::pipeline::RunOptions;
use crate::view::ControlView;

/// Reconcile CMMC SSP control data with an evidence-mapping dataset.
#[derive(Debug, Parser)]
#[command(name = "sspkit", version, about)]
struct Cli {
    /// Configuration file (JSON). Defaults apply when it does not exist.
    #[arg(short, long, global = true, default_value = "config.json")]
    config: PathBuf,

    /// Override the control dataset path.
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// Override the evidence dataset path.
    #[arg(short, long, global = true)]
    evidence: Option<PathBuf>,

    /// Override the output directory.
    #[arg(short, long, global = true, env = "SSPKIT_OUTPUT_DIR")]
    output: Option<PathBuf>,

    /// Debug-level logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate, reconcile evidence, and write exports plus the validation report.
    Run(RunArgs),
    /// Print one control with its reconciled evidence.
    Show {
        /// Control identifier, e.g. 3.1.1.
        id: String,
    },
    /// Print the evidence index.
    Evidence {
        /// List every entry for this control instead of the overview.
        #[arg(long)]
        control: Option<String>,
    },
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Skip score and POA&M validation.
    #[arg(long)]
    skip_validation: bool,

    /// Do not write per-family JSON exports.
    #[arg(long)]
    no_export: bool,

    /// Process only these controls.
    #[arg(long, num_args = 1..)]
    controls: Vec<String>,

    /// Process only these families (AC, AT, ...).
    #[arg(long, num_args = 1..)]
    families: Vec<String>,

    /// Process a control range, e.g. 3.1.1-3.1.10.
    #[arg(long)]
    range: Option<String>,
}

impl Cli {
    fn resolve_config(&self) -> anyhow::Result<Config> {
        let mut config = Config::load_or_default(&self.config)?;
        if let Some(input) = &self.input {
            config.input_csv = input.clone();
        }
        if let Some(evidence) = &self.evidence {
            config.evidence_csv = Some(evidence.clone());
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let mut config = cli.resolve_config()?;
    let log_path = logging::init(&config.output_dir, cli.verbose)?;
    tracing::info!(log = %log_path.display(), "sspkit v{}", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Command::Run(args) => {
            if args.skip_validation {
                config.validate_poam_rules = false;
            }
            if args.no_export {
                config.export_json = false;
            }
            let options = RunOptions {
                filter: ControlFilter {
                    controls: args.controls,
                    families: args.families,
                    range: args.range,
                },
            };
            cmd_run(&config, &options)
        }
        Command::Show { id } => cmd_show(&config, &id),
        Command::Evidence { control } => cmd_evidence(&config, control.as_deref()),
    };

    if let Err(e) = &result {
        tracing::error!("fatal error: {e:#}");
    }
    result
}

fn cmd_run(config: &Config, options: &RunOptions) -> anyhow::Result<ExitCode> {
    let outcome = pipeline::run(config, options)?;

    if outcome.nothing_selected {
        println!("No controls matched your filter criteria.");
        return Ok(ExitCode::SUCCESS);
    }

    let summary = &outcome.summary;
    println!("{}", "=".repeat(50));
    println!("CMMC SSP run completed");
    println!("{}", "=".repeat(50));
    println!("Output directory: {}", config.output_dir.display());
    println!("Controls:         {}", summary.total_controls);
    println!("Exports written:  {}", outcome.exports.len());
    println!("Errors:           {}", summary.errors);
    println!("Warnings:         {}", summary.warnings);
    if summary.controls_with_evidence > 0 {
        println!(
            "Evidence enriched for {} controls",
            summary.controls_with_evidence
        );
    }

    if outcome.validation.has_errors() {
        println!("\nCritical errors found - review the validation report.");
        Ok(ExitCode::FAILURE)
    } else {
        println!("\nNo critical errors - ready for review.");
        Ok(ExitCode::SUCCESS)
    }
}

fn cmd_show(config: &Config, id: &str) -> anyhow::Result<ExitCode> {
    let index = pipeline::load_index(config)?;
    let rows = pipeline::load_controls(config)?;

    let row = rows
        .iter()
        .find(|r| r.control_id() == Some(id.trim()))
        .with_context(|| format!("control {id} not found in {}", config.input_csv.display()))?;
    let view = ControlView::build(row, &index)
        .with_context(|| format!("control {id} has no identifier"))?;

    print!("{}", display::render_control_card(&view));
    Ok(ExitCode::SUCCESS)
}

fn cmd_evidence(config: &Config, control: Option<&str>) -> anyhow::Result<ExitCode> {
    let index = pipeline::load_index(config)?;
    match control {
        Some(id) => print!("{}", display::render_index_entries(&index, id.trim())),
        None => print!("{}", display::render_index_overview(&index)),
    }
    Ok(ExitCode::SUCCESS)
}
