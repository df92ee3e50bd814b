//! Design matrix construction with one-hot categorical expansion.

use crate::types::{CategoricalFeature, NumericFeature, SensorRecord};

/// Categories of one categorical column, in first-observed order
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup {
    pub feature: CategoricalFeature,
    pub categories: Vec<String>,
}

impl CategoryGroup {
    /// Equation name of a category's indicator, e.g. `Load_Type_Light_Load`
    pub fn indicator_name(&self, category: &str) -> String {
        format!("{}_{}", self.feature.column(), category)
    }
}

/// Maps records to rows of the design matrix.
///
/// Numeric features come first in source column order, followed by one
/// indicator per observed category, grouped by categorical column.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureEncoder {
    groups: Vec<CategoryGroup>,
}

impl FeatureEncoder {
    /// Learn the category vocabulary from the fitted window
    pub fn fit<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a SensorRecord>,
    {
        let mut groups: Vec<CategoryGroup> = CategoricalFeature::ALL
            .iter()
            .map(|&feature| CategoryGroup {
                feature,
                categories: Vec::new(),
            })
            .collect();

        for record in records {
            for group in groups.iter_mut() {
                let value = record.category(group.feature);
                if !group.categories.iter().any(|c| c == value) {
                    group.categories.push(value.to_string());
                }
            }
        }

        Self { groups }
    }

    pub fn groups(&self) -> &[CategoryGroup] {
        &self.groups
    }

    /// Number of design matrix columns (intercept excluded)
    pub fn width(&self) -> usize {
        NumericFeature::ALL.len() + self.indicator_count()
    }

    pub fn indicator_count(&self) -> usize {
        self.groups.iter().map(|g| g.categories.len()).sum()
    }

    /// Column names, in design matrix order
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = NumericFeature::ALL
            .iter()
            .map(|f| f.column().to_string())
            .collect();
        for group in &self.groups {
            names.extend(group.categories.iter().map(|c| group.indicator_name(c)));
        }
        names
    }

    /// Encode one record. Categories outside the vocabulary set no indicator.
    pub fn encode(&self, record: &SensorRecord) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.width());
        row.extend(NumericFeature::ALL.iter().map(|&f| record.numeric(f)));
        for group in &self.groups {
            let value = record.category(group.feature);
            row.extend(
                group
                    .categories
                    .iter()
                    .map(|c| if c == value { 1.0 } else { 0.0 }),
            );
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(day: &str, load: &str) -> SensorRecord {
        SensorRecord {
            timestamp: NaiveDate::from_ymd_opt(2018, 1, 1)
                .unwrap()
                .and_hms_opt(0, 15, 0)
                .unwrap(),
            usage_kwh: 1.0,
            lagging_reactive_power_kvarh: 2.0,
            leading_reactive_power_kvarh: 3.0,
            co2_tco2: 0.0,
            lagging_power_factor: 70.0,
            leading_power_factor: 100.0,
            nsm: 900.0,
            week_status: "Weekday".to_string(),
            day_of_week: day.to_string(),
            load_type: load.to_string(),
        }
    }

    #[test]
    fn test_categories_in_first_seen_order() {
        let records = vec![
            record("Monday", "Maximum_Load"),
            record("Monday", "Light_Load"),
            record("Tuesday", "Maximum_Load"),
        ];
        let encoder = FeatureEncoder::fit(&records);
        let load = &encoder.groups()[2];
        assert_eq!(load.categories, vec!["Maximum_Load", "Light_Load"]);
        assert_eq!(encoder.indicator_count(), 1 + 2 + 2);
        assert_eq!(encoder.width(), 6 + 5);
    }

    #[test]
    fn test_feature_names_order() {
        let records = vec![record("Monday", "Light_Load")];
        let names = FeatureEncoder::fit(&records).feature_names();
        assert_eq!(names[0], "Lagging_Current_Reactive.Power_kVarh");
        assert_eq!(names[5], "NSM");
        assert_eq!(names[6], "WeekStatus_Weekday");
        assert_eq!(names[7], "Day_of_week_Monday");
        assert_eq!(names[8], "Load_Type_Light_Load");
    }

    #[test]
    fn test_unseen_category_sets_no_indicator() {
        let encoder = FeatureEncoder::fit(&[record("Monday", "Light_Load")]);
        let row = encoder.encode(&record("Sunday", "No_Load"));
        assert_eq!(row.len(), encoder.width());
        // WeekStatus still matches, the other two groups are all zero
        assert_eq!(&row[6..], &[1.0, 0.0, 0.0]);
    }
}
