//! Regression summarizer.
//!
//! Fits `Usage_kWh` against the operational features of a window and renders
//! the model as an equation string, the contract every prompt builds on.

pub mod encoding;
pub mod equation;
pub mod ols;

use tracing::{debug, info};

use crate::dataset::filter_window;
use crate::types::{SensorRecord, TimeWindow, TARGET_COLUMN};

pub use encoding::{CategoryGroup, FeatureEncoder};
pub use equation::{RegressionModel, Term, EQUATION_PRECISION};

/// Minimum records a window needs before a model is fitted
pub const MIN_FIT_RECORDS: usize = 2;

/// Text returned in place of an equation for windows that are too thin
pub const INSUFFICIENT_DATA: &str = "Not enough data to generate a regression model.";

/// Result of summarizing one window
#[derive(Debug, Clone, PartialEq)]
pub enum FitOutcome {
    Equation(String),
    /// Fewer than `MIN_FIT_RECORDS` records in the window; no regression ran
    InsufficientData { records: usize },
}

impl FitOutcome {
    /// Equation text, or the fixed sentinel
    pub fn as_text(&self) -> &str {
        match self {
            Self::Equation(eq) => eq,
            Self::InsufficientData { .. } => INSUFFICIENT_DATA,
        }
    }

    pub fn equation(&self) -> Option<&str> {
        match self {
            Self::Equation(eq) => Some(eq),
            Self::InsufficientData { .. } => None,
        }
    }
}

/// Filter `records` to `window` and summarize the result as an equation
pub fn fit(records: &[SensorRecord], window: &TimeWindow) -> FitOutcome {
    let selected = filter_window(records, window);
    info!("Fitting window {} ({} records)", window, selected.len());

    match fit_model(&selected) {
        Some(model) => FitOutcome::Equation(model.to_equation()),
        None => FitOutcome::InsufficientData {
            records: selected.len(),
        },
    }
}

/// Fit a model on already-selected records
pub fn fit_model(records: &[&SensorRecord]) -> Option<RegressionModel> {
    if records.len() < MIN_FIT_RECORDS {
        debug!("Skipping fit: {} records", records.len());
        return None;
    }

    let encoder = FeatureEncoder::fit(records.iter().copied());
    let x: Vec<Vec<f64>> = records.iter().map(|r| encoder.encode(r)).collect();
    let y: Vec<f64> = records.iter().map(|r| r.usage_kwh).collect();

    let fit = ols::fit(&x, &y);
    debug!(
        "Fitted {} coefficients ({} indicators)",
        fit.coefficients.len(),
        encoder.indicator_count()
    );

    Some(RegressionModel::new(
        TARGET_COLUMN,
        fit.intercept,
        fit.coefficients,
        encoder,
    ))
}
