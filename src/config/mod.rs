//! Configuration for the report generator
//!
//! The pricing table is the only process-wide configuration: read-only
//! after startup and passed explicitly into the pipeline.

pub mod pricing;

pub use pricing::{ModelPrice, PerTokenCost, PriceEntry, PricingTable};
