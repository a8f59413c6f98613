//! Formatted terminal output: data preview and run summary.
//!
//! We keep formatting code in one place so:
//! - the pipeline code stays free of presentation concerns
//! - output changes are localized (and easy to assert on in tests)

use crate::app::pipeline::WorkflowReport;
use crate::domain::Dataset;

/// Format the first `n` rows of the dataset as a fixed-width table.
pub fn format_preview(dataset: &Dataset, n: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Data preview ({} of {} rows, source: {}):\n",
        n.min(dataset.len()),
        dataset.len(),
        dataset.provenance()
    ));

    out.push_str(
        format!(
            "{:<10} {:<24} {:<20} {:>8} {:>11} {:>10} {:>11} {:>7}\n",
            "date", "campaign", "ad_group", "clicks", "impressions", "cost", "conversions", "ctr"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<10} {:-<24} {:-<20} {:-<8} {:-<11} {:-<10} {:-<11} {:-<7}\n",
            "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for r in dataset.records().iter().take(n) {
        out.push_str(
            format!(
                "{:<10} {:<24} {:<20} {:>8} {:>11} {:>10.2} {:>11} {:>6.2}%\n",
                r.date.format("%Y-%m-%d"),
                truncate(&r.campaign, 24),
                truncate(&r.ad_group, 20),
                r.clicks,
                r.impressions,
                r.cost,
                r.conversions,
                r.ctr() * 100.0,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    if dataset.len() > n {
        out.push_str(&format!("... ({} more rows)\n", dataset.len() - n));
    }
    out
}

/// Format the end-of-run summary.
pub fn format_workflow_report(report: &WorkflowReport) -> String {
    let mut out = String::new();

    out.push_str("=== ads-viz - Ad Performance Charts ===\n");
    out.push_str(&format!("Data source: {} ({} rows)\n", report.provenance, report.rows));
    if let Some(reason) = &report.fallback_reason {
        out.push_str(&format!("Fallback reason: {reason}\n"));
    }
    out.push_str(&format!("Output directory: {}\n", report.output_dir.display()));

    out.push_str(&format!("\nCharts written ({}):\n", report.artifacts.len()));
    for artifact in &report.artifacts {
        out.push_str(&format!("- {}\n", artifact.path.display()));
    }

    if !report.failures.is_empty() {
        out.push_str(&format!("\nCharts failed ({}):\n", report.failures.len()));
        for failure in &report.failures {
            out.push_str(&format!("- {}: {}\n", failure.path.display(), failure.cause));
        }
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
