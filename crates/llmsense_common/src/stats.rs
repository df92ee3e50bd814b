//! Descriptive window summary (averages, extremes, load mix).
//!
//! Display only; stored records always carry the regression equation.

use crate::dataset::filter_window;
use crate::types::{NumericFeature, SensorRecord, TimeWindow, TARGET_COLUMN};

/// Summarize the numeric columns and load-type distribution of a window
pub fn describe_window(records: &[SensorRecord], window: &TimeWindow) -> String {
    let selected = filter_window(records, window);
    if selected.is_empty() {
        return format!("No data found for {}.", window);
    }

    let mut summary = format!("Summary for {}:\n", window);

    let mut columns: Vec<(&str, Vec<f64>)> =
        vec![(TARGET_COLUMN, selected.iter().map(|r| r.usage_kwh).collect())];
    for feature in NumericFeature::ALL {
        // NSM is a clock, not a measurement
        if feature == NumericFeature::Nsm {
            continue;
        }
        columns.push((
            feature.column(),
            selected.iter().map(|r| r.numeric(feature)).collect(),
        ));
    }

    for (name, values) in &columns {
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        summary.push_str(&format!(
            "- {}: Avg = {:.2}, Max = {:.2}, Min = {:.2}\n",
            name, mean, max, min
        ));
    }

    summary.push_str("\nLoad Type Distribution:\n");
    for (load_type, share) in load_type_distribution(&selected) {
        summary.push_str(&format!("- {}: {:.2}%\n", load_type, share));
    }

    summary
}

/// Percentage share per load type, most frequent first, ties in first-seen order
pub fn load_type_distribution(records: &[&SensorRecord]) -> Vec<(String, f64)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for record in records {
        match counts.iter_mut().find(|(name, _)| *name == record.load_type) {
            Some((_, count)) => *count += 1,
            None => counts.push((record.load_type.clone(), 1)),
        }
    }
    // Stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let total = records.len() as f64;
    counts
        .into_iter()
        .map(|(name, count)| (name, count as f64 * 100.0 / total))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(usage: f64, load: &str) -> SensorRecord {
        SensorRecord {
            timestamp: NaiveDate::from_ymd_opt(2018, 1, 1)
                .unwrap()
                .and_hms_opt(1, 0, 0)
                .unwrap(),
            usage_kwh: usage,
            lagging_reactive_power_kvarh: 1.0,
            leading_reactive_power_kvarh: 0.0,
            co2_tco2: 0.0,
            lagging_power_factor: 80.0,
            leading_power_factor: 100.0,
            nsm: 3600.0,
            week_status: "Weekday".to_string(),
            day_of_week: "Monday".to_string(),
            load_type: load.to_string(),
        }
    }

    #[test]
    fn test_describe_day() {
        let records = vec![
            record(2.0, "Light_Load"),
            record(4.0, "Maximum_Load"),
            record(6.0, "Maximum_Load"),
            record(8.0, "Maximum_Load"),
        ];
        let day = TimeWindow::day(NaiveDate::from_ymd_opt(2018, 1, 1).unwrap());
        let summary = describe_window(&records, &day);

        assert!(summary.starts_with("Summary for 2018-01-01:"));
        assert!(summary.contains("- Usage_kWh: Avg = 5.00, Max = 8.00, Min = 2.00"));
        assert!(!summary.contains("NSM"));
        let max_pos = summary.find("- Maximum_Load: 75.00%").unwrap();
        let light_pos = summary.find("- Light_Load: 25.00%").unwrap();
        assert!(max_pos < light_pos);
    }

    #[test]
    fn test_describe_empty_window() {
        let day = TimeWindow::day(NaiveDate::from_ymd_opt(2019, 5, 5).unwrap());
        assert_eq!(
            describe_window(&[record(1.0, "Light_Load")], &day),
            "No data found for 2019-05-05."
        );
    }

    #[test]
    fn test_distribution_ties_keep_first_seen() {
        let a = record(1.0, "Medium_Load");
        let b = record(1.0, "Light_Load");
        let dist = load_type_distribution(&[&a, &b]);
        assert_eq!(dist[0].0, "Medium_Load");
        assert_eq!(dist[1].0, "Light_Load");
    }
}
