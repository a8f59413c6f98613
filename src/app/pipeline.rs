//! Shared workflow logic: resolve a dataset, then render every chart.
//!
//! Keeping this in one place lets the CLI focus on presentation while tests
//! drive the same path with fake data sources:
//! remote fetch -> fallback decision -> aggregation -> PNG charts

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::data::{AdsDataSource, DatasetResolver};
use crate::domain::{Dataset, Provenance, TableRef};
use crate::error::AppError;
use crate::io::files::prepare_output_dir;
use crate::plot::{ChartArtifact, ChartFailure, ChartRenderer};

/// What a run did: which data it used and which charts it produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowReport {
    pub provenance: Provenance,
    /// Present when the sample dataset replaced remote data.
    pub fallback_reason: Option<String>,
    pub status: String,
    pub rows: usize,
    pub output_dir: PathBuf,
    pub artifacts: Vec<ChartArtifact>,
    pub failures: Vec<ChartFailure>,
}

impl WorkflowReport {
    pub fn artifact_paths(&self) -> Vec<&Path> {
        self.artifacts.iter().map(|a| a.path.as_path()).collect()
    }
}

/// All outputs of a single run.
#[derive(Debug, Clone)]
pub struct WorkflowOutput {
    pub dataset: Dataset,
    pub report: WorkflowReport,
}

/// Execute the full workflow against `source`.
///
/// Remote failures and individual chart failures are reported, not raised.
/// Only an unusable output directory or an empty dataset is fatal.
pub fn run_workflow<S: AdsDataSource>(
    source: S,
    table: &TableRef,
    output_dir: &Path,
    renderer: &ChartRenderer,
) -> Result<WorkflowOutput, AppError> {
    run_workflow_with(source, table, output_dir, renderer, |_, _| {})
}

/// Like [`run_workflow`], calling `on_resolved(dataset, status)` once the data
/// source is decided and before any chart is drawn.
pub fn run_workflow_with<S, F>(
    source: S,
    table: &TableRef,
    output_dir: &Path,
    renderer: &ChartRenderer,
    on_resolved: F,
) -> Result<WorkflowOutput, AppError>
where
    S: AdsDataSource,
    F: FnOnce(&Dataset, &str),
{
    // Fail before touching the network when nothing could be written anyway.
    prepare_output_dir(output_dir)?;

    let resolution = DatasetResolver::new(source).resolve(table);
    let status = resolution.status_message();
    let fallback_reason = resolution.fallback_reason().map(ToString::to_string);
    let dataset = resolution.into_dataset();

    if dataset.is_empty() {
        return Err(AppError::new(4, "Resolved dataset is empty; nothing to chart."));
    }
    on_resolved(&dataset, &status);

    info!(rows = dataset.len(), source = %dataset.provenance(), "Rendering charts");
    let outcome = renderer.render(&dataset, output_dir)?;
    info!(
        written = outcome.artifacts.len(),
        failed = outcome.failures.len(),
        "Rendering finished"
    );

    let report = WorkflowReport {
        provenance: dataset.provenance(),
        fallback_reason,
        status,
        rows: dataset.len(),
        output_dir: output_dir.to_path_buf(),
        artifacts: outcome.artifacts,
        failures: outcome.failures,
    };

    Ok(WorkflowOutput { dataset, report })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::fs;

    use chrono::NaiveDate;

    use super::*;
    use crate::domain::AdPerformanceRecord;
    use crate::error::FetchError;

    struct Unreachable;

    impl AdsDataSource for Unreachable {
        fn fetch(&self, _table: &TableRef) -> Result<Dataset, FetchError> {
            Err(FetchError::Connection("network is unreachable".to_string()))
        }
    }

    struct Rows {
        records: Vec<AdPerformanceRecord>,
        calls: Cell<usize>,
    }

    impl AdsDataSource for Rows {
        fn fetch(&self, _table: &TableRef) -> Result<Dataset, FetchError> {
            self.calls.set(self.calls.get() + 1);
            Dataset::new(self.records.clone(), Provenance::Remote)
                .map_err(|(i, e)| FetchError::Schema(format!("row {i}: {e}")))
        }
    }

    fn table() -> TableRef {
        TableRef::new("demo-project", "marketing", "ad_performance")
    }

    fn remote_rows() -> Vec<AdPerformanceRecord> {
        let day = |d| NaiveDate::from_ymd_opt(2024, 6, d).unwrap();
        vec![
            AdPerformanceRecord {
                date: day(1),
                campaign: "Summer".to_string(),
                ad_group: "Beach".to_string(),
                clicks: 40,
                impressions: 400,
                cost: 20.0,
                conversions: 4,
            },
            AdPerformanceRecord {
                date: day(2),
                campaign: "Search".to_string(),
                ad_group: "Brand".to_string(),
                clicks: 10,
                impressions: 500,
                cost: 5.5,
                conversions: 1,
            },
        ]
    }

    #[test]
    fn unreachable_warehouse_falls_back_and_still_charts() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("viz");
        let run = run_workflow(Unreachable, &table(), &out, &ChartRenderer::without_text()).unwrap();

        assert_eq!(run.report.provenance, Provenance::Sample);
        assert_eq!(run.report.rows, 10);
        assert!(run.report.fallback_reason.as_deref().unwrap().contains("unreachable"));
        assert_eq!(run.report.artifacts.len(), 5);
        assert!(run.report.failures.is_empty());
        for path in run.report.artifact_paths() {
            assert!(path.exists());
        }
    }

    #[test]
    fn remote_rows_are_used_when_available() {
        let tmp = tempfile::tempdir().unwrap();
        let source = Rows {
            records: remote_rows(),
            calls: Cell::new(0),
        };
        let run = run_workflow(&source, &table(), tmp.path(), &ChartRenderer::without_text()).unwrap();

        assert_eq!(source.calls.get(), 1);
        assert_eq!(run.report.provenance, Provenance::Remote);
        assert_eq!(run.report.fallback_reason, None);
        assert_eq!(run.report.status, "Using remote data (2 rows).");
        assert_eq!(run.dataset.records(), remote_rows().as_slice());
    }

    #[test]
    fn empty_remote_result_uses_sample() {
        let tmp = tempfile::tempdir().unwrap();
        let source = Rows {
            records: Vec::new(),
            calls: Cell::new(0),
        };
        let run = run_workflow(&source, &table(), tmp.path(), &ChartRenderer::without_text()).unwrap();
        assert_eq!(run.report.provenance, Provenance::Sample);
        assert_eq!(
            run.report.fallback_reason.as_deref(),
            Some("remote table returned no rows")
        );
    }

    #[test]
    fn resolved_hook_sees_data_before_charts_exist() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().to_path_buf();
        let mut seen = None;
        run_workflow_with(Unreachable, &table(), &out, &ChartRenderer::without_text(), |ds, status| {
            let charts = fs::read_dir(&out).unwrap().count();
            seen = Some((ds.len(), status.to_string(), charts));
        })
        .unwrap();

        let (rows, status, charts) = seen.unwrap();
        assert_eq!(rows, 10);
        assert!(status.starts_with("Using sample data (10 rows)"));
        assert_eq!(charts, 0);
    }

    #[test]
    fn unwritable_output_dir_is_fatal_and_skips_fetch() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        fs::write(&blocker, b"x").unwrap();
        let source = Rows {
            records: remote_rows(),
            calls: Cell::new(0),
        };
        let err = run_workflow(&source, &table(), &blocker, &ChartRenderer::without_text()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(source.calls.get(), 0);
    }
}
