//! Input/output helpers.
//!
//! - output directory setup + atomic writes (`files`)
//! - dataset CSV export (`export`)
//! - run report JSON (`report_json`)

pub mod export;
pub mod files;
pub mod report_json;

pub use export::*;
pub use report_json::*;
