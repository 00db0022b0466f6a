//! # grading-report
//!
//! Summary analytics for tabular logs of AI-graded student assessments:
//! token cost, latency, grading consistency, and human-AI agreement,
//! rendered as a four-panel PNG report and filed in a per-subject
//! gallery on disk.
//!
//! The crate is deliberately synchronous and single-threaded: every
//! report is a direct computation over an in-memory table, and the only
//! I/O is reading the uploaded CSV and writing one image per request.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use grading_report::{
//!     Dataset, PricingTable, ReportContext, ReportStore, Subject,
//!     compute_metrics, render_report,
//! };
//!
//! fn main() -> grading_report::Result<()> {
//!     let dataset = Dataset::from_csv_path("graded_data.csv".as_ref())?;
//!     let pricing = PricingTable::builtin();
//!     let cost = pricing.lookup("gpt-4o")?;
//!
//!     let figures = compute_metrics(&dataset, "experiment_1", &cost)?;
//!
//!     let store = ReportStore::new("reports");
//!     let path = store.prepare(Subject::Math, "experiment_1")?;
//!     let ctx = ReportContext {
//!         experiment: "experiment_1".to_string(),
//!         model: "gpt-4o".to_string(),
//!         subject: Subject::Math,
//!     };
//!     render_report(&ctx, &figures, &path)?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod cli;
pub mod config;
pub mod core;
pub mod render;
pub mod storage;
pub mod utils;

// Re-export main types
pub use config::pricing::{ModelPrice, PerTokenCost, PriceEntry, PricingTable};
pub use core::dataset::{Dataset, GradedRecord, coerce_numeric};
pub use core::metrics::{
    LatencyHistogram, LatencyStats, ReportFigures, ReportMetrics, compute_metrics,
};
pub use render::chart::{ReportContext, render_report};
pub use storage::artifacts::{ReportStore, Subject};
pub use utils::error::{ReportError, Result};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
