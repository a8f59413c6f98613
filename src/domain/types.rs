//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory while aggregating and charting
//! - exported to CSV/JSON
//! - compared in tests without touching the network or the filesystem

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// Where a dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Live rows from the warehouse.
    Remote,
    /// The bundled fallback dataset.
    Sample,
}

impl Provenance {
    pub fn as_str(self) -> &'static str {
        match self {
            Provenance::Remote => "remote",
            Provenance::Sample => "sample",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of ad performance data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdPerformanceRecord {
    pub date: NaiveDate,
    pub campaign: String,
    pub ad_group: String,
    pub clicks: u64,
    pub impressions: u64,
    pub cost: f64,
    pub conversions: u64,
}

impl AdPerformanceRecord {
    /// Check the record invariants, reporting the first violation.
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.campaign.trim().is_empty() {
            return Err(RecordError::EmptyCampaign);
        }
        if self.ad_group.trim().is_empty() {
            return Err(RecordError::EmptyAdGroup);
        }
        if self.clicks > self.impressions {
            return Err(RecordError::ClicksExceedImpressions {
                clicks: self.clicks,
                impressions: self.impressions,
            });
        }
        if !(self.cost.is_finite() && self.cost >= 0.0) {
            return Err(RecordError::InvalidCost(self.cost.to_string()));
        }
        Ok(())
    }

    /// Click-through rate as a ratio in `[0, 1]`; 0 when there were no impressions.
    pub fn ctr(&self) -> f64 {
        ratio(self.clicks, self.impressions)
    }

    /// Conversions per click; 0 when there were no clicks.
    pub fn conversion_rate(&self) -> f64 {
        ratio(self.conversions, self.clicks)
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// An ordered, validated set of records tagged with its provenance.
///
/// Immutable once built: fields are private and only exposed read-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    records: Vec<AdPerformanceRecord>,
    provenance: Provenance,
}

impl Dataset {
    /// Build a dataset, validating every record.
    ///
    /// On failure returns the zero-based row index and the violated invariant.
    pub fn new(
        records: Vec<AdPerformanceRecord>,
        provenance: Provenance,
    ) -> Result<Self, (usize, RecordError)> {
        for (idx, record) in records.iter().enumerate() {
            record.validate().map_err(|e| (idx, e))?;
        }
        Ok(Self { records, provenance })
    }

    /// Build from rows known to be valid (the bundled sample).
    pub(crate) fn from_trusted(records: Vec<AdPerformanceRecord>, provenance: Provenance) -> Self {
        Self { records, provenance }
    }

    pub fn records(&self) -> &[AdPerformanceRecord] {
        &self.records
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Fully qualified `project.dataset.table` reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
}

impl TableRef {
    pub fn new(
        project_id: impl Into<String>,
        dataset_id: impl Into<String>,
        table_id: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            dataset_id: dataset_id.into(),
            table_id: table_id.into(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project_id, self.dataset_id, self.table_id)
    }
}

/// Warehouse column names for each record field.
///
/// Defaults match the placeholder schema of the demo table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    pub date: String,
    pub campaign: String,
    pub ad_group: String,
    pub clicks: String,
    pub impressions: String,
    pub cost: String,
    pub conversions: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            date: "date_column".to_string(),
            campaign: "campaign_name_column".to_string(),
            ad_group: "ad_group_name_column".to_string(),
            clicks: "clicks_column".to_string(),
            impressions: "impressions_column".to_string(),
            cost: "cost_column".to_string(),
            conversions: "conversions_column".to_string(),
        }
    }
}

/// Run configuration, built from CLI args by the binary.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub table: TableRef,
    pub output_dir: PathBuf,
    /// Font file for chart text; searched for when absent.
    pub font: Option<PathBuf>,
    pub timeout: Duration,
    /// BigQuery processing location (e.g. `US`, `EU`).
    pub location: Option<String>,
    pub columns: ColumnMap,
    /// Rows printed before charting; 0 disables the preview.
    pub preview_rows: usize,
    pub export_data: Option<PathBuf>,
    pub report_json: Option<PathBuf>,
}
