//! Core domain logic: dataset ingestion and the metrics pipeline.

pub mod dataset;
pub mod metrics;

pub use dataset::{Dataset, GradedRecord, coerce_numeric};
pub use metrics::{
    LatencyHistogram, LatencyStats, ReportFigures, ReportMetrics, compute_metrics,
};
