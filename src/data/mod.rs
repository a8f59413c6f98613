//! Data acquisition: warehouse fetch, bundled sample, and the fallback decision.

pub mod bigquery;
pub mod resolver;
pub mod sample;
pub mod source;

pub use bigquery::{BigQueryClient, BigQueryConfig};
pub use resolver::{DatasetResolver, FallbackReason, Resolution};
pub use sample::sample_dataset;
pub use source::AdsDataSource;
