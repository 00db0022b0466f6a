//! grading-report - AI grading report generator
//!
//! Computes cost, latency, consistency, and agreement analytics from a
//! CSV of graded experiments and saves a four-panel report image.

use std::process::ExitCode;

use clap::Parser;

use grading_report::cli::{self, Cli};

fn main() -> ExitCode {
    // Initialize logging system
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let parsed = Cli::parse();
    match cli::run(parsed) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Print error using Display (not Debug) to keep the chain readable
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
