//! Input/output helpers.
//!
//! - CSV ingest of recorded measurements (`ingest`)
//! - per-size CSV export (`export`)
//! - results JSON read/write (`results`)

pub mod export;
pub mod ingest;
pub mod results;

pub use export::*;
pub use ingest::*;
pub use results::*;
