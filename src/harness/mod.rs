//! Measurement harness.
//!
//! Builds an input of each requested size, times the target on it and
//! collapses repeated timings into one [`Measurement`](crate::domain::Measurement)
//! per size.

pub mod input;
pub mod measure;

pub use input::*;
pub use measure::*;
