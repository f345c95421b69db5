//! `complexity-estimator` library crate.
//!
//! The binary (`bigo`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the estimation engine can be called directly with recorded timings
//!
//! Typical programmatic use:
//!
//! ```
//! use complexity_estimator::domain::FitConfig;
//! use complexity_estimator::fit::estimate;
//!
//! let sizes = [100, 1000, 10_000, 100_000];
//! let times: Vec<f64> = sizes.iter().map(|&n| 2e-9 * n as f64 + 1e-6).collect();
//! let result = estimate(&sizes, &times, &FitConfig::default()).unwrap();
//! assert_eq!(result.name(), "O(n)");
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod fit;
pub mod harness;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod targets;
pub mod tui;
