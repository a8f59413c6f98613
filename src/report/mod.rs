//! Reporting utilities: chart aggregations and formatted terminal output.

pub mod aggregate;
pub mod format;

pub use aggregate::*;
pub use format::{format_preview, format_workflow_report};
