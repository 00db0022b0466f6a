//! Persistence of rendered report artifacts.

pub mod artifacts;

pub use artifacts::{ReportStore, Subject};
