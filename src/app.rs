//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - builds the BigQuery client from the environment
//! - runs the fetch/fallback/render workflow
//! - prints the data preview and run summary
//! - writes optional exports

use std::path::Path;
use std::time::Duration;

use clap::Parser;

use crate::cli::Cli;
use crate::data::{BigQueryClient, BigQueryConfig};
use crate::domain::{ColumnMap, TableRef, WorkflowConfig};
use crate::error::AppError;
use crate::plot::ChartRenderer;

pub mod pipeline;

/// Entry point for the `ads-viz` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    crate::logging::init_tracing(cli.verbose);

    let config = workflow_config_from_args(&cli);
    let client = BigQueryClient::new(BigQueryConfig::from_env(
        config.timeout,
        config.location.clone(),
        config.columns.clone(),
    ));
    let renderer = ChartRenderer::new(config.font.as_deref());

    let run = pipeline::run_workflow_with(
        &client,
        &config.table,
        &config.output_dir,
        &renderer,
        |dataset, status| {
            println!("{status}");
            if config.preview_rows > 0 {
                println!("{}", crate::report::format_preview(dataset, config.preview_rows));
            }
        },
    )?;

    println!("{}", crate::report::format_workflow_report(&run.report));

    // Optional exports.
    if let Some(path) = &config.export_data {
        crate::io::write_dataset_csv(path, &run.dataset)?;
        log_export("Dataset CSV", path);
    }
    if let Some(path) = &config.report_json {
        crate::io::write_report_json(path, &run.report)?;
        log_export("Report JSON", path);
    }

    Ok(())
}

fn log_export(what: &str, path: &Path) {
    tracing::info!(path = %path.display(), "{what} written");
}

pub fn workflow_config_from_args(cli: &Cli) -> WorkflowConfig {
    WorkflowConfig {
        table: TableRef::new(&cli.project_id, &cli.dataset_id, &cli.table_id),
        output_dir: cli.output_dir.clone(),
        font: cli.font.clone(),
        timeout: Duration::from_secs(cli.timeout_secs),
        location: cli.location.clone(),
        columns: ColumnMap {
            date: cli.date_column.clone(),
            campaign: cli.campaign_column.clone(),
            ad_group: cli.ad_group_column.clone(),
            clicks: cli.clicks_column.clone(),
            impressions: cli.impressions_column.clone(),
            cost: cli.cost_column.clone(),
            conversions: cli.conversions_column.clone(),
        },
        preview_rows: cli.preview_rows,
        export_data: cli.export_data.clone(),
        report_json: cli.report_json.clone(),
    }
}
