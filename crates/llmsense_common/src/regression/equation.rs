//! Fitted model and its canonical equation string.

use serde::{Deserialize, Serialize};

use super::encoding::FeatureEncoder;
use crate::types::SensorRecord;

/// Decimal places for intercept and coefficients
pub const EQUATION_PRECISION: usize = 4;

/// A named coefficient of the fitted model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub feature: String,
    pub coefficient: f64,
}

/// Linear model fitted for one window. Never persisted, only rendered.
#[derive(Debug, Clone)]
pub struct RegressionModel {
    pub target: String,
    pub intercept: f64,
    pub terms: Vec<Term>,
    encoder: FeatureEncoder,
}

impl RegressionModel {
    pub(crate) fn new(
        target: &str,
        intercept: f64,
        coefficients: Vec<f64>,
        encoder: FeatureEncoder,
    ) -> Self {
        let terms = encoder
            .feature_names()
            .into_iter()
            .zip(coefficients)
            .map(|(feature, coefficient)| Term {
                feature,
                coefficient,
            })
            .collect();

        Self {
            target: target.to_string(),
            intercept,
            terms,
            encoder,
        }
    }

    pub fn coefficient(&self, feature: &str) -> Option<f64> {
        self.terms
            .iter()
            .find(|t| t.feature == feature)
            .map(|t| t.coefficient)
    }

    /// Predict the target. Categories unseen during fitting contribute nothing.
    pub fn predict(&self, record: &SensorRecord) -> f64 {
        self.intercept
            + self
                .encoder
                .encode(record)
                .iter()
                .zip(&self.terms)
                .map(|(x, t)| x * t.coefficient)
                .sum::<f64>()
    }

    /// Render as `<target> = <intercept>[ +|- <|coef|> * <feature>]*`
    pub fn to_equation(&self) -> String {
        let mut equation = format!(
            "{} = {:.prec$}",
            self.target,
            self.intercept,
            prec = EQUATION_PRECISION
        );
        for term in &self.terms {
            equation.push_str(&render_term(&term.feature, term.coefficient));
        }
        equation
    }
}

/// Sign is always an explicit operator; the printed magnitude is non-negative
fn render_term(feature: &str, coefficient: f64) -> String {
    let sign = if coefficient >= 0.0 { '+' } else { '-' };
    format!(
        " {} {:.prec$} * {}",
        sign,
        coefficient.abs(),
        feature,
        prec = EQUATION_PRECISION
    )
}
