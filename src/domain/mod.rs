//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - ad performance rows and their derived metrics (`AdPerformanceRecord`)
//! - the validated, provenance-tagged `Dataset`
//! - warehouse addressing (`TableRef`, `ColumnMap`) and run configuration

pub mod types;

pub use types::*;
