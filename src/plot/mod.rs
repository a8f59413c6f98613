//! Chart rendering.
//!
//! - the five fixed chart definitions (`ChartKind`)
//! - font registration for chart text (`fonts`)
//! - Plotters drawing routines (`draw`)
//! - `ChartRenderer`, which aggregates, draws and writes each chart atomically

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::{AdPerformanceRecord, Dataset};
use crate::error::{AppError, ChartError};
use crate::io::files::{prepare_output_dir, write_atomically};
use crate::report::{Aggregation, daily_totals, mean_by_ad_group, sum_by_campaign};

pub mod draw;
pub mod fonts;

use draw::Canvas;

/// The shape a chart is drawn as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartShape {
    Line,
    Pie,
    Bar,
}

/// The fixed set of charts produced by every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Clicks and impressions summed per date.
    PerformanceTrend,
    /// Cost summed per campaign.
    CampaignCost,
    /// Clicks summed per campaign.
    CampaignClicks,
    /// Mean CTR per ad group.
    AdGroupCtr,
    /// Mean conversion rate per ad group.
    AdGroupConversions,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::PerformanceTrend,
        ChartKind::CampaignCost,
        ChartKind::CampaignClicks,
        ChartKind::AdGroupCtr,
        ChartKind::AdGroupConversions,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            ChartKind::PerformanceTrend => "performance_trend.png",
            ChartKind::CampaignCost => "campaign_cost_distribution.png",
            ChartKind::CampaignClicks => "campaign_clicks_distribution.png",
            ChartKind::AdGroupCtr => "ad_group_ctr_comparison.png",
            ChartKind::AdGroupConversions => "ad_group_conversions_comparison.png",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::PerformanceTrend => "Performance Trends Over Time",
            ChartKind::CampaignCost => "Campaign Distribution by Cost",
            ChartKind::CampaignClicks => "Campaign Distribution by Clicks",
            ChartKind::AdGroupCtr => "Ad Group Comparison by CTR",
            ChartKind::AdGroupConversions => "Ad Group Comparison by Conversion Rate",
        }
    }

    pub fn shape(self) -> ChartShape {
        match self {
            ChartKind::PerformanceTrend => ChartShape::Line,
            ChartKind::CampaignCost | ChartKind::CampaignClicks => ChartShape::Pie,
            ChartKind::AdGroupCtr | ChartKind::AdGroupConversions => ChartShape::Bar,
        }
    }

    /// Group the records and reduce the measure this chart shows.
    pub fn aggregate(self, records: &[AdPerformanceRecord]) -> Aggregation {
        match self {
            ChartKind::PerformanceTrend => Aggregation::Daily(daily_totals(records)),
            ChartKind::CampaignCost => Aggregation::ByCategory(sum_by_campaign(records, |r| r.cost)),
            ChartKind::CampaignClicks => {
                Aggregation::ByCategory(sum_by_campaign(records, |r| r.clicks as f64))
            }
            ChartKind::AdGroupCtr => {
                Aggregation::ByCategory(mean_by_ad_group(records, AdPerformanceRecord::ctr))
            }
            ChartKind::AdGroupConversions => Aggregation::ByCategory(mean_by_ad_group(
                records,
                AdPerformanceRecord::conversion_rate,
            )),
        }
    }

    fn axis_label(self) -> &'static str {
        match self {
            ChartKind::AdGroupCtr => "CTR",
            ChartKind::AdGroupConversions => "Conversion rate",
            _ => "Value",
        }
    }

    fn value_format(self) -> fn(f64) -> String {
        match self {
            ChartKind::CampaignCost => fmt_amount,
            ChartKind::PerformanceTrend | ChartKind::CampaignClicks => fmt_count,
            ChartKind::AdGroupCtr | ChartKind::AdGroupConversions => fmt_percent,
        }
    }

    fn canvas(self, text: bool) -> Canvas {
        let (width, height) = match self.shape() {
            ChartShape::Line => (1200, 600),
            ChartShape::Pie => (1000, 800),
            ChartShape::Bar => (1200, 700),
        };
        Canvas { width, height, text }
    }
}

fn fmt_amount(v: f64) -> String {
    format!("{v:.2}")
}

fn fmt_count(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

/// A chart written to disk, with the numbers it was drawn from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartArtifact {
    pub kind: ChartKind,
    pub path: PathBuf,
    pub aggregation: Aggregation,
}

/// A chart that could not be produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartFailure {
    pub kind: ChartKind,
    pub path: PathBuf,
    pub cause: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderOutcome {
    pub artifacts: Vec<ChartArtifact>,
    pub failures: Vec<ChartFailure>,
}

pub struct ChartRenderer {
    font: Option<PathBuf>,
}

impl ChartRenderer {
    /// Renderer with text, using `font` or a discovered system font.
    pub fn new(font: Option<&Path>) -> Self {
        Self {
            font: fonts::register(font),
        }
    }

    /// Renderer that draws data marks only.
    pub fn without_text() -> Self {
        Self { font: None }
    }

    /// Whether captions, labels and legends will be drawn.
    pub fn has_text(&self) -> bool {
        self.font.is_some()
    }

    /// Render all five charts into `output_dir`.
    ///
    /// Per-chart failures are collected; only an empty dataset or an unusable
    /// output directory is fatal.
    pub fn render(&self, dataset: &Dataset, output_dir: &Path) -> Result<RenderOutcome, AppError> {
        if dataset.is_empty() {
            return Err(AppError::new(4, "Cannot render charts from an empty dataset."));
        }
        prepare_output_dir(output_dir)?;

        let mut outcome = RenderOutcome::default();
        for kind in ChartKind::ALL {
            let path = output_dir.join(kind.file_name());
            let aggregation = kind.aggregate(dataset.records());
            match self.render_one(kind, &aggregation, &path) {
                Ok(()) => {
                    info!(chart = ?kind, path = %path.display(), "Chart written");
                    outcome.artifacts.push(ChartArtifact {
                        kind,
                        path,
                        aggregation,
                    });
                }
                Err(err) => {
                    warn!(chart = ?kind, path = %path.display(), error = %err, "Chart failed");
                    outcome.failures.push(ChartFailure {
                        kind,
                        path,
                        cause: err.to_string(),
                    });
                }
            }
        }
        Ok(outcome)
    }

    fn render_one(&self, kind: ChartKind, aggregation: &Aggregation, path: &Path) -> Result<(), ChartError> {
        let canvas = kind.canvas(self.font.is_some());
        write_atomically(path, |tmp: &Path| match (kind.shape(), aggregation) {
            (ChartShape::Line, Aggregation::Daily(daily)) => draw::line_chart(tmp, kind.title(), daily, canvas),
            (ChartShape::Pie, Aggregation::ByCategory(values)) => {
                draw::pie_chart(tmp, kind.title(), values, kind.value_format(), canvas)
            }
            (ChartShape::Bar, Aggregation::ByCategory(values)) => draw::bar_chart(
                tmp,
                kind.title(),
                kind.axis_label(),
                values,
                kind.value_format(),
                canvas,
            ),
            _ => Err(ChartError::Draw(format!(
                "{kind:?} cannot be drawn from this aggregation"
            ))),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::NaiveDate;

    use super::*;
    use crate::data::sample_dataset;
    use crate::domain::Provenance;
    use crate::report::CategoryValue;

    fn record(campaign: &str, ad_group: &str, clicks: u64, impressions: u64, cost: f64) -> AdPerformanceRecord {
        AdPerformanceRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            campaign: campaign.to_string(),
            ad_group: ad_group.to_string(),
            clicks,
            impressions,
            cost,
            conversions: 0,
        }
    }

    #[test]
    fn file_names_are_fixed_and_distinct() {
        let names: Vec<&str> = ChartKind::ALL.iter().map(|k| k.file_name()).collect();
        assert_eq!(
            names,
            vec![
                "performance_trend.png",
                "campaign_cost_distribution.png",
                "campaign_clicks_distribution.png",
                "ad_group_ctr_comparison.png",
                "ad_group_conversions_comparison.png",
            ]
        );
    }

    #[test]
    fn campaign_cost_aggregation_sums_cost() {
        let rows = vec![
            record("A", "G1", 1, 10, 10.0),
            record("A", "G2", 1, 10, 5.0),
            record("B", "G3", 1, 10, 3.0),
        ];
        let agg = ChartKind::CampaignCost.aggregate(&rows);
        assert_eq!(
            agg,
            Aggregation::ByCategory(vec![
                CategoryValue { label: "A".to_string(), value: 15.0 },
                CategoryValue { label: "B".to_string(), value: 3.0 },
            ])
        );
    }

    #[test]
    fn renders_five_charts_into_a_new_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("charts");
        let outcome = ChartRenderer::without_text().render(&sample_dataset(), &out).unwrap();

        assert!(outcome.failures.is_empty(), "{:?}", outcome.failures);
        assert_eq!(outcome.artifacts.len(), 5);
        for artifact in &outcome.artifacts {
            assert!(artifact.path.starts_with(&out));
            assert!(fs::metadata(&artifact.path).unwrap().len() > 0);
        }
        // Only the five charts, no leftover temp files.
        assert_eq!(fs::read_dir(&out).unwrap().count(), 5);
    }

    #[test]
    fn repeated_renders_use_identical_aggregations() {
        let tmp = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::without_text();
        let ds = sample_dataset();
        let first = renderer.render(&ds, tmp.path()).unwrap();
        let second = renderer.render(&ds, tmp.path()).unwrap();
        let aggs = |o: &RenderOutcome| o.artifacts.iter().map(|a| a.aggregation.clone()).collect::<Vec<_>>();
        assert_eq!(aggs(&first), aggs(&second));
    }

    #[test]
    fn one_failing_chart_does_not_stop_the_rest() {
        let tmp = tempfile::tempdir().unwrap();
        // A directory squatting on the target name makes the final rename fail.
        let squatter = tmp.path().join(ChartKind::CampaignCost.file_name());
        fs::create_dir(&squatter).unwrap();
        fs::write(squatter.join("keep"), b"x").unwrap();

        let outcome = ChartRenderer::without_text().render(&sample_dataset(), tmp.path()).unwrap();

        assert_eq!(outcome.artifacts.len(), 4);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].kind, ChartKind::CampaignCost);
        assert!(squatter.is_dir());
        for artifact in &outcome.artifacts {
            assert!(artifact.path.is_file());
        }
        // Four charts plus the squatting directory; no temp files left behind.
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 5);
    }

    #[test]
    fn zero_clicks_and_zero_cost_still_yield_five_charts() {
        let rows = vec![record("A", "G1", 0, 100, 0.0), record("B", "G2", 0, 50, 0.0)];
        let ds = Dataset::new(rows, Provenance::Remote).unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let outcome = ChartRenderer::without_text().render(&ds, tmp.path()).unwrap();

        assert!(outcome.failures.is_empty(), "{:?}", outcome.failures);
        assert_eq!(outcome.artifacts.len(), 5);
        assert!(tmp.path().join("campaign_clicks_distribution.png").is_file());
        assert!(tmp.path().join("campaign_cost_distribution.png").is_file());
    }

    #[test]
    fn empty_dataset_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let ds = Dataset::new(Vec::new(), Provenance::Remote).unwrap();
        let err = ChartRenderer::without_text().render(&ds, tmp.path()).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
