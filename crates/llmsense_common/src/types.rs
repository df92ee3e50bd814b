//! Core data model: sensor readings and the windows that select them.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SenseError};

/// Target column of every regression
pub const TARGET_COLUMN: &str = "Usage_kWh";

/// Numeric predictors, in source column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericFeature {
    LaggingReactivePower,
    LeadingReactivePower,
    Co2,
    LaggingPowerFactor,
    LeadingPowerFactor,
    Nsm,
}

impl NumericFeature {
    pub const ALL: [NumericFeature; 6] = [
        NumericFeature::LaggingReactivePower,
        NumericFeature::LeadingReactivePower,
        NumericFeature::Co2,
        NumericFeature::LaggingPowerFactor,
        NumericFeature::LeadingPowerFactor,
        NumericFeature::Nsm,
    ];

    /// Column name as it appears in the dataset and in equations
    pub fn column(&self) -> &'static str {
        match self {
            Self::LaggingReactivePower => "Lagging_Current_Reactive.Power_kVarh",
            Self::LeadingReactivePower => "Leading_Current_Reactive_Power_kVarh",
            Self::Co2 => "CO2(tCO2)",
            Self::LaggingPowerFactor => "Lagging_Current_Power_Factor",
            Self::LeadingPowerFactor => "Leading_Current_Power_Factor",
            Self::Nsm => "NSM",
        }
    }
}

/// Categorical predictors, in source column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoricalFeature {
    WeekStatus,
    DayOfWeek,
    LoadType,
}

impl CategoricalFeature {
    pub const ALL: [CategoricalFeature; 3] = [
        CategoricalFeature::WeekStatus,
        CategoricalFeature::DayOfWeek,
        CategoricalFeature::LoadType,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            Self::WeekStatus => "WeekStatus",
            Self::DayOfWeek => "Day_of_week",
            Self::LoadType => "Load_Type",
        }
    }
}

/// One timestamped row of plant telemetry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorRecord {
    pub timestamp: NaiveDateTime,
    pub usage_kwh: f64,
    pub lagging_reactive_power_kvarh: f64,
    pub leading_reactive_power_kvarh: f64,
    pub co2_tco2: f64,
    pub lagging_power_factor: f64,
    pub leading_power_factor: f64,
    /// Seconds since midnight
    pub nsm: f64,
    pub week_status: String,
    pub day_of_week: String,
    pub load_type: String,
}

impl SensorRecord {
    pub fn numeric(&self, feature: NumericFeature) -> f64 {
        match feature {
            NumericFeature::LaggingReactivePower => self.lagging_reactive_power_kvarh,
            NumericFeature::LeadingReactivePower => self.leading_reactive_power_kvarh,
            NumericFeature::Co2 => self.co2_tco2,
            NumericFeature::LaggingPowerFactor => self.lagging_power_factor,
            NumericFeature::LeadingPowerFactor => self.leading_power_factor,
            NumericFeature::Nsm => self.nsm,
        }
    }

    pub fn category(&self, feature: CategoricalFeature) -> &str {
        match feature {
            CategoricalFeature::WeekStatus => &self.week_status,
            CategoricalFeature::DayOfWeek => &self.day_of_week,
            CategoricalFeature::LoadType => &self.load_type,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Calendar interval used to select records before fitting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeWindow {
    /// A single calendar day
    Day { date: NaiveDate },
    /// Inclusive on both ends
    Range { start: NaiveDate, end: NaiveDate },
    Month { year: i32, month: u32 },
}

impl TimeWindow {
    pub fn day(date: NaiveDate) -> Self {
        Self::Day { date }
    }

    pub fn range(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(SenseError::Dataset(format!(
                "window start {} is after end {}",
                start, end
            )));
        }
        Ok(Self::Range { start, end })
    }

    pub fn month(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(SenseError::Dataset(format!("invalid month {}", month)));
        }
        Ok(Self::Month { year, month })
    }

    /// Parse a `YYYY-MM` month label
    pub fn parse_month(label: &str) -> Result<Self> {
        let (year, month) = label
            .split_once('-')
            .and_then(|(y, m)| Some((y.parse::<i32>().ok()?, m.parse::<u32>().ok()?)))
            .ok_or_else(|| SenseError::Dataset(format!("invalid month label {:?}", label)))?;
        Self::month(year, month)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match self {
            Self::Day { date: day } => date == *day,
            Self::Range { start, end } => *start <= date && date <= *end,
            Self::Month { year, month } => date.year() == *year && date.month() == *month,
        }
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Day { date } => write!(f, "{}", date),
            Self::Range { start, end } => write!(f, "{} to {}", start, end),
            Self::Month { year, month } => write!(f, "{:04}-{:02}", year, month),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_range_is_inclusive() {
        let w = TimeWindow::range(d(2018, 1, 2), d(2018, 1, 4)).unwrap();
        assert!(!w.contains(d(2018, 1, 1)));
        assert!(w.contains(d(2018, 1, 2)));
        assert!(w.contains(d(2018, 1, 4)));
        assert!(!w.contains(d(2018, 1, 5)));
    }

    #[test]
    fn test_inverted_range_rejected() {
        assert!(TimeWindow::range(d(2018, 2, 1), d(2018, 1, 1)).is_err());
    }

    #[test]
    fn test_parse_month() {
        let w = TimeWindow::parse_month("2018-03").unwrap();
        assert!(w.contains(d(2018, 3, 31)));
        assert!(!w.contains(d(2018, 4, 1)));
        assert_eq!(w.to_string(), "2018-03");
        assert!(TimeWindow::parse_month("2018-13").is_err());
        assert!(TimeWindow::parse_month("march").is_err());
    }

    #[test]
    fn test_window_display() {
        assert_eq!(TimeWindow::day(d(2018, 1, 1)).to_string(), "2018-01-01");
        let r = TimeWindow::range(d(2018, 1, 1), d(2018, 1, 31)).unwrap();
        assert_eq!(r.to_string(), "2018-01-01 to 2018-01-31");
    }

    #[test]
    fn test_feature_columns_in_source_order() {
        let cols: Vec<_> = NumericFeature::ALL.iter().map(|f| f.column()).collect();
        assert_eq!(cols[0], "Lagging_Current_Reactive.Power_kVarh");
        assert_eq!(cols[5], "NSM");
        assert_eq!(CategoricalFeature::ALL[2].column(), "Load_Type");
    }
}
