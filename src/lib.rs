//! `ads-viz` library crate.
//!
//! The binary (`ads-viz`) is a thin wrapper around this library so that:
//!
//! - the workflow is testable without spawning processes or reaching BigQuery
//! - data sources are swappable behind `data::AdsDataSource`
//! - chart rendering can be driven directly from a `domain::Dataset`

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
