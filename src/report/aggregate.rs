//! Group-by aggregations feeding the charts.
//!
//! Results are plain vectors in a deterministic order so repeated runs over the
//! same dataset yield identical chart inputs.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::AdPerformanceRecord;

/// Clicks and impressions summed over one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub clicks: u64,
    pub impressions: u64,
}

/// One labelled value of a categorical aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryValue {
    pub label: String,
    pub value: f64,
}

/// The numbers a chart was drawn from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum Aggregation {
    Daily(Vec<DailyTotals>),
    ByCategory(Vec<CategoryValue>),
}

/// Per-date totals, ascending by date.
pub fn daily_totals(records: &[AdPerformanceRecord]) -> Vec<DailyTotals> {
    let mut by_date: BTreeMap<NaiveDate, (u64, u64)> = BTreeMap::new();
    for r in records {
        let entry = by_date.entry(r.date).or_default();
        entry.0 = entry.0.saturating_add(r.clicks);
        entry.1 = entry.1.saturating_add(r.impressions);
    }
    by_date
        .into_iter()
        .map(|(date, (clicks, impressions))| DailyTotals {
            date,
            clicks,
            impressions,
        })
        .collect()
}

/// Sum of `measure` per campaign, ascending by campaign name.
pub fn sum_by_campaign(
    records: &[AdPerformanceRecord],
    measure: impl Fn(&AdPerformanceRecord) -> f64,
) -> Vec<CategoryValue> {
    let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
    for r in records {
        *sums.entry(r.campaign.as_str()).or_default() += measure(r);
    }
    sums.into_iter()
        .map(|(label, value)| CategoryValue {
            label: label.to_string(),
            value,
        })
        .collect()
}

/// Mean of `measure` per ad group, descending by value (ties by name).
pub fn mean_by_ad_group(
    records: &[AdPerformanceRecord],
    measure: impl Fn(&AdPerformanceRecord) -> f64,
) -> Vec<CategoryValue> {
    let mut acc: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for r in records {
        let entry = acc.entry(r.ad_group.as_str()).or_default();
        entry.0 += measure(r);
        entry.1 += 1;
    }
    let mut out: Vec<CategoryValue> = acc
        .into_iter()
        .map(|(label, (sum, n))| CategoryValue {
            label: label.to_string(),
            value: sum / n as f64,
        })
        .collect();
    sort_descending(&mut out);
    out
}

/// Order by value descending, then label ascending.
pub fn sort_descending(values: &mut [CategoryValue]) {
    values.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.label.cmp(&b.label))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(day: u32, campaign: &str, ad_group: &str, clicks: u64, impressions: u64, cost: f64) -> AdPerformanceRecord {
        AdPerformanceRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            campaign: campaign.to_string(),
            ad_group: ad_group.to_string(),
            clicks,
            impressions,
            cost,
            conversions: clicks / 10,
        }
    }

    #[test]
    fn cost_by_campaign_sums_per_campaign() {
        let rows = vec![
            rec(1, "A", "G1", 1, 10, 10.0),
            rec(1, "A", "G2", 1, 10, 5.0),
            rec(2, "B", "G3", 1, 10, 3.0),
        ];
        let agg = sum_by_campaign(&rows, |r| r.cost);
        assert_eq!(
            agg,
            vec![
                CategoryValue { label: "A".to_string(), value: 15.0 },
                CategoryValue { label: "B".to_string(), value: 3.0 },
            ]
        );
    }

    #[test]
    fn daily_totals_are_date_ordered() {
        let rows = vec![
            rec(3, "A", "G1", 5, 50, 1.0),
            rec(1, "A", "G1", 10, 100, 1.0),
            rec(1, "B", "G2", 20, 200, 1.0),
        ];
        let daily = daily_totals(&rows);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!((daily[0].clicks, daily[0].impressions), (30, 300));
        assert_eq!((daily[1].clicks, daily[1].impressions), (5, 50));
    }

    #[test]
    fn mean_ctr_handles_zero_impressions() {
        let rows = vec![
            rec(1, "A", "G1", 0, 0, 0.0),
            rec(2, "A", "G1", 10, 100, 1.0),
            rec(1, "A", "G2", 30, 100, 1.0),
        ];
        let agg = mean_by_ad_group(&rows, AdPerformanceRecord::ctr);
        assert_eq!(agg[0].label, "G2");
        assert!((agg[0].value - 0.3).abs() < 1e-12);
        assert_eq!(agg[1].label, "G1");
        assert!((agg[1].value - 0.05).abs() < 1e-12);
    }

    #[test]
    fn ties_are_broken_by_label() {
        let mut values = vec![
            CategoryValue { label: "b".to_string(), value: 1.0 },
            CategoryValue { label: "a".to_string(), value: 1.0 },
            CategoryValue { label: "c".to_string(), value: 2.0 },
        ];
        sort_descending(&mut values);
        let labels: Vec<&str> = values.iter().map(|v| v.label.as_str()).collect();
        assert_eq!(labels, vec!["c", "a", "b"]);
    }
}
