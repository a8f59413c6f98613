//! Remote-or-sample dataset resolution.
//!
//! Exactly one remote attempt, then a deterministic fallback. The decision is
//! returned as a value (`Resolution`) so callers and tests can inspect it.

use tracing::{info, warn};

use crate::data::sample::sample_dataset;
use crate::data::source::AdsDataSource;
use crate::domain::{Dataset, Provenance, TableRef};
use crate::error::FetchError;

/// Why the sample dataset was used.
#[derive(Debug)]
pub enum FallbackReason {
    FetchFailed(FetchError),
    /// The query succeeded but returned no rows.
    EmptyResult,
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::FetchFailed(err) => write!(f, "remote fetch failed ({err})"),
            FallbackReason::EmptyResult => f.write_str("remote table returned no rows"),
        }
    }
}

/// Outcome of [`DatasetResolver::resolve`].
#[derive(Debug)]
pub enum Resolution {
    Remote(Dataset),
    Fallback { dataset: Dataset, reason: FallbackReason },
}

impl Resolution {
    pub fn dataset(&self) -> &Dataset {
        match self {
            Resolution::Remote(dataset) | Resolution::Fallback { dataset, .. } => dataset,
        }
    }

    pub fn into_dataset(self) -> Dataset {
        match self {
            Resolution::Remote(dataset) | Resolution::Fallback { dataset, .. } => dataset,
        }
    }

    pub fn provenance(&self) -> Provenance {
        self.dataset().provenance()
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            Resolution::Remote(_) => None,
            Resolution::Fallback { reason, .. } => Some(reason),
        }
    }

    /// One-line, human-readable account of which data is being used.
    pub fn status_message(&self) -> String {
        match self {
            Resolution::Remote(dataset) => {
                format!("Using remote data ({} rows).", dataset.len())
            }
            Resolution::Fallback { dataset, reason } => format!(
                "Using sample data ({} rows): {reason}.",
                dataset.len()
            ),
        }
    }
}

pub struct DatasetResolver<S> {
    source: S,
}

impl<S: AdsDataSource> DatasetResolver<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn resolve(&self, table: &TableRef) -> Resolution {
        info!(table = %table, "Fetching ad performance data");
        match self.source.fetch(table) {
            Ok(dataset) if dataset.is_empty() => {
                warn!(table = %table, "Remote table is empty; using sample data");
                fallback(FallbackReason::EmptyResult)
            }
            Ok(dataset) => {
                info!(rows = dataset.len(), "Using remote data");
                Resolution::Remote(retag_remote(dataset))
            }
            Err(err) => {
                warn!(table = %table, error = %err, "Remote fetch failed; using sample data");
                fallback(FallbackReason::FetchFailed(err))
            }
        }
    }
}

fn fallback(reason: FallbackReason) -> Resolution {
    Resolution::Fallback {
        dataset: sample_dataset(),
        reason,
    }
}

// Sources own their rows but not the provenance decision.
fn retag_remote(dataset: Dataset) -> Dataset {
    if dataset.provenance() == Provenance::Remote {
        dataset
    } else {
        Dataset::from_trusted(dataset.records().to_vec(), Provenance::Remote)
    }
}
