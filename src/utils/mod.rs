//! Shared utilities.

pub mod error;

pub use error::{ReportError, Result};
