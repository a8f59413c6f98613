//! Bundled ad performance sample used when the warehouse is unavailable.

use chrono::NaiveDate;

use crate::domain::{AdPerformanceRecord, Dataset, Provenance};

/// (day of January 2024, campaign, ad group, clicks, impressions, cost, conversions)
const SAMPLE_ROWS: [(u32, &str, &str, u64, u64, f64, u64); 10] = [
    (1, "Winter Sale Campaign", "Ad Group Ski", 100, 1000, 50.0, 10),
    (1, "Brand Awareness Q1", "Ad Group General", 150, 1200, 70.0, 12),
    (2, "Winter Sale Campaign", "Ad Group Snowboard", 120, 1100, 60.0, 11),
    (2, "Brand Awareness Q1", "Ad Group Video", 180, 1500, 80.0, 15),
    (3, "Winter Sale Campaign", "Ad Group Boots", 90, 950, 40.0, 8),
    (3, "Brand Awareness Q1", "Ad Group Social", 110, 1050, 50.0, 9),
    (4, "Spring Promo", "Ad Group Flowers", 200, 2000, 100.0, 20),
    (4, "New Product Launch", "Ad Group Gadget A", 220, 2500, 120.0, 22),
    (5, "Spring Promo", "Ad Group Garden", 130, 1150, 65.0, 12),
    (5, "New Product Launch", "Ad Group Gadget B", 160, 1400, 75.0, 14),
];

/// The deterministic fallback dataset.
///
/// Five days, four campaigns, two or more ad groups per campaign.
pub fn sample_dataset() -> Dataset {
    // All rows or none: a bad date empties the sample instead of thinning it.
    let records: Vec<AdPerformanceRecord> = SAMPLE_ROWS
        .iter()
        .map(|&(day, campaign, ad_group, clicks, impressions, cost, conversions)| {
            Some(AdPerformanceRecord {
                date: NaiveDate::from_ymd_opt(2024, 1, day)?,
                campaign: campaign.to_string(),
                ad_group: ad_group.to_string(),
                clicks,
                impressions,
                cost,
                conversions,
            })
        })
        .collect::<Option<Vec<_>>>()
        .unwrap_or_default();

    Dataset::from_trusted(records, Provenance::Sample)
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use chrono::Datelike;

    use super::*;

    #[test]
    fn sample_is_tagged_and_complete() {
        let ds = sample_dataset();
        assert_eq!(ds.provenance(), Provenance::Sample);
        assert_eq!(ds.len(), SAMPLE_ROWS.len());
    }

    #[test]
    fn every_sample_day_is_a_real_date() {
        for &(day, ..) in &SAMPLE_ROWS {
            assert!(NaiveDate::from_ymd_opt(2024, 1, day).is_some(), "2024-01-{day:02} is not a date");
        }
        let days: Vec<u32> = sample_dataset().records().iter().map(|r| r.date.day()).collect();
        assert_eq!(days, SAMPLE_ROWS.iter().map(|row| row.0).collect::<Vec<_>>());
    }

    #[test]
    fn sample_rows_satisfy_record_invariants() {
        let ds = sample_dataset();
        assert!(Dataset::new(ds.records().to_vec(), Provenance::Sample).is_ok());
    }

    #[test]
    fn sample_is_deterministic() {
        assert_eq!(sample_dataset(), sample_dataset());
    }

    #[test]
    fn sample_covers_dates_campaigns_and_ad_groups() {
        let ds = sample_dataset();
        let dates: BTreeSet<NaiveDate> = ds.records().iter().map(|r| r.date).collect();
        assert!(dates.len() > 1);

        let mut groups: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for r in ds.records() {
            groups.entry(r.campaign.as_str()).or_default().insert(r.ad_group.as_str());
        }
        assert!(groups.len() >= 2);
        for (campaign, ad_groups) in &groups {
            assert!(ad_groups.len() >= 2, "{campaign} has fewer than two ad groups");
        }
    }
}
