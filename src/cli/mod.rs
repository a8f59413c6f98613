//! Command-line parsing for the ad performance chart generator.
//!
//! The goal of this module is to keep **argument parsing** separate from data
//! access and rendering; `app` turns `Cli` into a `WorkflowConfig`.

use std::path::PathBuf;

use clap::Parser;

/// Top-level CLI.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "ads-viz",
    version,
    about = "Fetch ad performance data from BigQuery (or bundled sample data) and render PNG charts"
)]
pub struct Cli {
    /// Google Cloud project that owns the table.
    pub project_id: String,

    /// BigQuery dataset id.
    pub dataset_id: String,

    /// BigQuery table id.
    pub table_id: String,

    /// Directory the charts are written to (created if missing).
    #[arg(short = 'o', long, default_value = "ads_demo_visualizations")]
    pub output_dir: PathBuf,

    /// TTF/OTF font used for chart text (a system font is searched for otherwise).
    #[arg(long, value_name = "FILE")]
    pub font: Option<PathBuf>,

    /// HTTP timeout for the BigQuery request, in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// BigQuery processing location (e.g. US, EU).
    #[arg(long)]
    pub location: Option<String>,

    /// Rows printed as a data preview before charting (0 disables).
    #[arg(long, default_value_t = 5)]
    pub preview_rows: usize,

    /// Export the resolved dataset to CSV.
    #[arg(long = "export-data", value_name = "CSV")]
    pub export_data: Option<PathBuf>,

    /// Write the run report as JSON.
    #[arg(long = "report-json", value_name = "PATH")]
    pub report_json: Option<PathBuf>,

    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(short, long)]
    pub verbose: bool,

    /// Column holding the date of each row.
    #[arg(long, default_value = "date_column")]
    pub date_column: String,

    /// Column holding the campaign name.
    #[arg(long, default_value = "campaign_name_column")]
    pub campaign_column: String,

    /// Column holding the ad group name.
    #[arg(long, default_value = "ad_group_name_column")]
    pub ad_group_column: String,

    /// Column holding click counts.
    #[arg(long, default_value = "clicks_column")]
    pub clicks_column: String,

    /// Column holding impression counts.
    #[arg(long, default_value = "impressions_column")]
    pub impressions_column: String,

    /// Column holding cost.
    #[arg(long, default_value = "cost_column")]
    pub cost_column: String,

    /// Column holding conversion counts.
    #[arg(long, default_value = "conversions_column")]
    pub conversions_column: String,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_apply_when_only_ids_are_given() {
        let cli = Cli::try_parse_from(["ads-viz", "proj", "ds", "tbl"]).unwrap();
        assert_eq!(cli.project_id, "proj");
        assert_eq!(cli.output_dir, PathBuf::from("ads_demo_visualizations"));
        assert_eq!(cli.timeout_secs, 30);
        assert_eq!(cli.preview_rows, 5);
        assert_eq!(cli.clicks_column, "clicks_column");
        assert!(cli.font.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn table_ids_are_required() {
        assert!(Cli::try_parse_from(["ads-viz", "proj", "ds"]).is_err());
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "ads-viz",
            "proj",
            "ds",
            "tbl",
            "--output-dir",
            "charts",
            "--cost-column",
            "spend",
            "--export-data",
            "data.csv",
            "--preview-rows",
            "0",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.output_dir, PathBuf::from("charts"));
        assert_eq!(cli.cost_column, "spend");
        assert_eq!(cli.export_data, Some(PathBuf::from("data.csv")));
        assert_eq!(cli.preview_rows, 0);
        assert!(cli.verbose);
    }
}
