//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - configuration enums (`ModelKind`, `SelectionCriterion`, `InputKind`, `Aggregate`)
//! - timing observations (`Measurement`)
//! - fit outputs (`ModelFit`, `EstimationResult`, etc.)

pub mod types;

pub use types::*;
