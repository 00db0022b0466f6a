//! Command-line shell around the metrics pipeline
//!
//! The interactive selection surface of the report generator: pick an
//! experiment and subject from an uploaded CSV, resolve the model's
//! per-token prices, and write the four-panel report image. Fatal
//! conditions become a single user-facing error line; an empty
//! experiment filter is a warning, not a failure.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::config::pricing::PricingTable;
use crate::core::dataset::Dataset;
use crate::core::metrics::compute_metrics;
use crate::render::chart::{ReportContext, render_report};
use crate::storage::artifacts::{DEFAULT_REPORTS_DIR, ReportStore, Subject};
use crate::utils::error::ReportError;

/// AI grading report generator
#[derive(Debug, Parser)]
#[command(name = "grading-report", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a report image for one experiment
    Generate {
        /// Path to the graded-data CSV
        #[arg(long)]
        input: PathBuf,
        /// Experiment identifier to report on
        #[arg(long)]
        experiment: String,
        /// Subject folder the report is filed under
        #[arg(long, value_enum)]
        subject: Subject,
        /// Model identifier; auto-detected from the data's `model`
        /// column when omitted
        #[arg(long)]
        model: Option<String>,
        /// Base directory for report artifacts
        #[arg(long, default_value = DEFAULT_REPORTS_DIR)]
        reports_dir: PathBuf,
        /// JSON file overriding the builtin pricing table
        #[arg(long)]
        pricing: Option<PathBuf>,
    },
    /// List the distinct experiment identifiers in a CSV
    Experiments {
        /// Path to the graded-data CSV
        #[arg(long)]
        input: PathBuf,
    },
    /// Browse previously generated reports
    List {
        /// Restrict the listing to one subject
        #[arg(long, value_enum)]
        subject: Option<Subject>,
        /// Base directory for report artifacts
        #[arg(long, default_value = DEFAULT_REPORTS_DIR)]
        reports_dir: PathBuf,
    },
    /// Print the model identifiers known to the pricing table
    Models,
}

/// Execute a parsed command
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Generate {
            input,
            experiment,
            subject,
            model,
            reports_dir,
            pricing,
        } => generate(input, experiment, subject, model, reports_dir, pricing),
        Command::Experiments { input } => experiments(input),
        Command::List {
            subject,
            reports_dir,
        } => list(subject, reports_dir),
        Command::Models => models(),
    }
}

fn generate(
    input: PathBuf,
    experiment: String,
    subject: Subject,
    model: Option<String>,
    reports_dir: PathBuf,
    pricing_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let dataset = Dataset::from_csv_path(&input)
        .with_context(|| format!("failed to load {}", input.display()))?;

    let pricing = match &pricing_path {
        Some(path) => PricingTable::from_json_file(path)
            .with_context(|| format!("failed to load pricing table {}", path.display()))?,
        None => PricingTable::builtin(),
    };

    let model = match model {
        Some(model) => model,
        None => {
            let detected = dataset
                .detect_model(&experiment)
                .ok_or(ReportError::MissingModel)?;
            info!(model = %detected, "auto-detected model");
            detected
        }
    };

    // pricing resolves before any computation; no cost math for unknown models
    let cost = pricing.lookup(&model)?;

    let figures = match compute_metrics(&dataset, &experiment, &cost) {
        Ok(figures) => figures,
        Err(err @ ReportError::NoDataForExperiment { .. }) => {
            warn!("{err}; nothing to report");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    let store = ReportStore::new(reports_dir);
    let path = store.prepare(subject, &experiment)?;
    let ctx = ReportContext {
        experiment,
        model,
        subject,
    };
    render_report(&ctx, &figures, &path)?;

    println!("{}", serde_json::to_string_pretty(&figures.metrics)?);
    println!("Report saved at: {}", path.display());
    Ok(())
}

fn experiments(input: PathBuf) -> anyhow::Result<()> {
    let dataset = Dataset::from_csv_path(&input)
        .with_context(|| format!("failed to load {}", input.display()))?;
    for name in dataset.experiment_names() {
        println!("{name}");
    }
    Ok(())
}

fn list(subject: Option<Subject>, reports_dir: PathBuf) -> anyhow::Result<()> {
    let store = ReportStore::new(reports_dir);
    let subjects: Vec<Subject> = match subject {
        Some(subject) => vec![subject],
        None => Subject::ALL.to_vec(),
    };

    for subject in subjects {
        println!("{}:", subject.tag().to_uppercase());
        let reports = store.list(subject)?;
        if reports.is_empty() {
            println!("  (no reports yet)");
            continue;
        }
        for path in reports {
            println!("  {}", path.display());
        }
    }
    Ok(())
}

fn models() -> anyhow::Result<()> {
    for name in PricingTable::builtin().model_names() {
        println!("{name}");
    }
    Ok(())
}
