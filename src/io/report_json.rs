//! Write the run report as JSON.
//!
//! The JSON mirrors `WorkflowReport`: provenance, fallback reason, every chart
//! written (with the aggregated values it shows) and every chart that failed.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::app::pipeline::WorkflowReport;
use crate::error::AppError;
use crate::io::files::write_atomically;

/// Write `report` as pretty-printed JSON.
pub fn write_report_json(path: &Path, report: &WorkflowReport) -> Result<(), AppError> {
    write_atomically(path, |tmp: &Path| -> io::Result<()> {
        let mut out = BufWriter::new(File::create(tmp)?);
        serde_json::to_writer_pretty(&mut out, report)?;
        writeln!(out)?;
        out.flush()
    })
    .map_err(|e| AppError::new(2, format!("Failed to write report JSON '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::*;
    use crate::domain::Provenance;
    use crate::plot::{ChartFailure, ChartKind};

    #[test]
    fn report_round_trips_as_json_value() {
        let report = WorkflowReport {
            provenance: Provenance::Sample,
            fallback_reason: Some("remote fetch failed (connection error: offline)".to_string()),
            status: "Using sample data (10 rows).".to_string(),
            rows: 10,
            output_dir: PathBuf::from("charts"),
            artifacts: Vec::new(),
            failures: vec![ChartFailure {
                kind: ChartKind::AdGroupCtr,
                path: PathBuf::from("charts/ad_group_ctr_comparison.png"),
                cause: "drawing failed".to_string(),
            }],
        };
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("report.json");
        write_report_json(&path, &report).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["provenance"], "sample");
        assert_eq!(value["rows"], 10);
        assert_eq!(value["failures"][0]["kind"], "ad_group_ctr");
        assert_eq!(value["artifacts"].as_array().unwrap().len(), 0);
    }
}
