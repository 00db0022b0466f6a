//! Chart rendering for the four-panel report image.

pub mod chart;

pub use chart::{ReportContext, render_report};
