//! Export the resolved dataset to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts,
//! so derived CTR and conversion rate are written next to the raw counts.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::domain::Dataset;
use crate::error::AppError;
use crate::io::files::write_atomically;

const HEADER: &str = "date,campaign,ad_group,clicks,impressions,cost,conversions,ctr,conversion_rate,source";

/// Write every record of `dataset` to a CSV file.
pub fn write_dataset_csv(path: &Path, dataset: &Dataset) -> Result<(), AppError> {
    write_atomically(path, |tmp: &Path| -> io::Result<()> {
        let mut out = BufWriter::new(File::create(tmp)?);
        writeln!(out, "{HEADER}")?;
        for r in dataset.records() {
            writeln!(
                out,
                "{},{},{},{},{},{:.2},{},{:.6},{:.6},{}",
                r.date.format("%Y-%m-%d"),
                csv_field(&r.campaign),
                csv_field(&r.ad_group),
                r.clicks,
                r.impressions,
                r.cost,
                r.conversions,
                r.ctr(),
                r.conversion_rate(),
                dataset.provenance(),
            )?;
        }
        out.flush()
    })
    .map_err(|e| AppError::new(2, format!("Failed to write data CSV '{}': {e}", path.display())))
}

/// Quote a field when it contains a delimiter, quote or newline.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
