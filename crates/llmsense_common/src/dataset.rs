//! Steel-industry sensor dataset loading.
//!
//! The table is loaded once per session and only read afterwards.

use std::io::Read;
use std::path::Path;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Result, SenseError};
use crate::types::{SensorRecord, TimeWindow};

/// Timestamp format used by the dataset's `date` column
pub const DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Raw CSV row, before timestamp parsing
#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    #[serde(rename = "Usage_kWh")]
    usage_kwh: f64,
    #[serde(rename = "Lagging_Current_Reactive.Power_kVarh")]
    lagging_reactive_power_kvarh: f64,
    #[serde(rename = "Leading_Current_Reactive_Power_kVarh")]
    leading_reactive_power_kvarh: f64,
    #[serde(rename = "CO2(tCO2)")]
    co2_tco2: f64,
    #[serde(rename = "Lagging_Current_Power_Factor")]
    lagging_power_factor: f64,
    #[serde(rename = "Leading_Current_Power_Factor")]
    leading_power_factor: f64,
    #[serde(rename = "NSM")]
    nsm: f64,
    #[serde(rename = "WeekStatus")]
    week_status: String,
    #[serde(rename = "Day_of_week")]
    day_of_week: String,
    #[serde(rename = "Load_Type")]
    load_type: String,
}

impl CsvRow {
    fn into_record(self, line: usize) -> Result<SensorRecord> {
        let timestamp = NaiveDateTime::parse_from_str(self.date.trim(), DATE_FORMAT).map_err(|e| {
            SenseError::Dataset(format!("line {}: bad date {:?}: {}", line, self.date, e))
        })?;

        Ok(SensorRecord {
            timestamp,
            usage_kwh: self.usage_kwh,
            lagging_reactive_power_kvarh: self.lagging_reactive_power_kvarh,
            leading_reactive_power_kvarh: self.leading_reactive_power_kvarh,
            co2_tco2: self.co2_tco2,
            lagging_power_factor: self.lagging_power_factor,
            leading_power_factor: self.leading_power_factor,
            nsm: self.nsm,
            week_status: self.week_status.trim().to_string(),
            day_of_week: self.day_of_week.trim().to_string(),
            load_type: self.load_type.trim().to_string(),
        })
    }
}

/// All sensor records of a session, in file order
#[derive(Debug, Clone, Default)]
pub struct SensorTable {
    records: Vec<SensorRecord>,
}

impl SensorTable {
    pub fn new(records: Vec<SensorRecord>) -> Self {
        Self { records }
    }

    /// Load the dataset from a CSV file
    pub fn load_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            SenseError::Dataset(format!("cannot open {}: {}", path.display(), e))
        })?;
        let table = Self::from_reader(file)?;
        info!("Loaded {} sensor records from {}", table.len(), path.display());
        Ok(table)
    }

    /// Parse CSV content with a header row
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut records = Vec::new();

        for (idx, row) in csv_reader.deserialize::<CsvRow>().enumerate() {
            // Header is line 1; csv errors carry their own position
            let line = idx + 2;
            records.push(row?.into_record(line)?);
        }

        debug!("Parsed {} rows", records.len());
        Ok(Self { records })
    }

    pub fn records(&self) -> &[SensorRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records whose calendar date falls inside the window
    pub fn filter(&self, window: &TimeWindow) -> Vec<&SensorRecord> {
        filter_window(&self.records, window)
    }

    /// First and last calendar dates present
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.iter().map(|r| r.date()).min()?;
        let last = self.records.iter().map(|r| r.date()).max()?;
        Some((first, last))
    }

    /// Distinct calendar days present, in first-seen order
    pub fn days(&self) -> Vec<NaiveDate> {
        let mut days: Vec<NaiveDate> = Vec::new();
        for record in &self.records {
            let date = record.date();
            if !days.contains(&date) {
                days.push(date);
            }
        }
        days
    }

    /// Distinct `YYYY-MM` months present, in first-seen order
    pub fn months(&self) -> Vec<TimeWindow> {
        let mut months: Vec<TimeWindow> = Vec::new();
        for record in &self.records {
            let date = record.date();
            let window = TimeWindow::Month {
                year: date.year(),
                month: date.month(),
            };
            if !months.contains(&window) {
                months.push(window);
            }
        }
        months
    }
}

/// Select the records of a window, preserving input order
pub fn filter_window<'a>(records: &'a [SensorRecord], window: &TimeWindow) -> Vec<&'a SensorRecord> {
    records.iter().filter(|r| window.contains(r.date())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
date,Usage_kWh,Lagging_Current_Reactive.Power_kVarh,Leading_Current_Reactive_Power_kVarh,CO2(tCO2),Lagging_Current_Power_Factor,Leading_Current_Power_Factor,NSM,WeekStatus,Day_of_week,Load_Type
01/01/2018 00:15,3.17,2.95,0,0,73.21,100,900,Weekday,Monday,Light_Load
01/01/2018 00:30,4,4.46,0,0,66.77,100,1800,Weekday,Monday,Light_Load
02/02/2018 09:00,70.3,30.1,0,0.03,91.9,100,32400,Weekday,Friday,Maximum_Load
";

    #[test]
    fn test_parse_sample() {
        let table = SensorTable::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);
        let first = &table.records()[0];
        assert_eq!(first.usage_kwh, 3.17);
        assert_eq!(first.nsm, 900.0);
        assert_eq!(first.load_type, "Light_Load");
        assert_eq!(first.date(), NaiveDate::from_ymd_opt(2018, 1, 1).unwrap());
    }

    #[test]
    fn test_months_first_seen_order() {
        let table = SensorTable::from_reader(SAMPLE.as_bytes()).unwrap();
        let months: Vec<String> = table.months().iter().map(|m| m.to_string()).collect();
        assert_eq!(months, vec!["2018-01", "2018-02"]);
    }

    #[test]
    fn test_filter_day() {
        let table = SensorTable::from_reader(SAMPLE.as_bytes()).unwrap();
        let day = TimeWindow::day(NaiveDate::from_ymd_opt(2018, 1, 1).unwrap());
        assert_eq!(table.filter(&day).len(), 2);
    }

    #[test]
    fn test_date_span() {
        let table = SensorTable::from_reader(SAMPLE.as_bytes()).unwrap();
        let (first, last) = table.date_span().unwrap();
        assert_eq!(first.to_string(), "2018-01-01");
        assert_eq!(last.to_string(), "2018-02-02");
        assert!(SensorTable::default().date_span().is_none());
    }

    #[test]
    fn test_days_first_seen_order() {
        let shuffled = SAMPLE.replace("01/01/2018 00:30", "03/01/2018 00:30");
        let table = SensorTable::from_reader(shuffled.as_bytes()).unwrap();
        let days: Vec<String> = table.days().iter().map(|d| d.to_string()).collect();
        assert_eq!(days, vec!["2018-01-01", "2018-01-03", "2018-02-02"]);
        assert!(SensorTable::default().days().is_empty());
    }

    #[test]
    fn test_malformed_number_is_csv_error() {
        let bad = SAMPLE.replace("70.3,", "seventy,");
        let err = SensorTable::from_reader(bad.as_bytes()).unwrap_err();
        assert!(matches!(err, SenseError::Csv(_)));
        assert!(err.to_string().starts_with("CSV error"));
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_bad_date_reports_line() {
        let bad = SAMPLE.replace("02/02/2018 09:00", "2018-02-02T09:00");
        let err = SensorTable::from_reader(bad.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 4"));
    }
}
