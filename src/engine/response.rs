//! Outgoing response payload.

use serde::{Deserialize, Serialize};

use crate::engine::strategy::{Method, Outcome};

/// Forecast result written to standard output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    /// Present only on the error shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub forecast: Vec<f64>,
    pub confidence_lower: Vec<f64>,
    pub confidence_upper: Vec<f64>,
    pub model_info: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aic: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bic: Option<f64>,
}

impl ForecastResponse {
    /// Zero-filled error shape of length `periods`.
    pub fn error_fallback(message: impl Into<String>, periods: usize) -> Self {
        Self {
            error: Some(message.into()),
            forecast: vec![0.0; periods],
            confidence_lower: vec![0.0; periods],
            confidence_upper: vec![0.0; periods],
            model_info: Method::Error.tag().to_string(),
            aic: None,
            bic: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Number of forecast steps.
    pub fn horizon(&self) -> usize {
        self.forecast.len()
    }
}

impl From<Outcome> for ForecastResponse {
    fn from(outcome: Outcome) -> Self {
        let (forecast, lower, upper) = outcome.forecast.into_parts();
        Self {
            error: None,
            confidence_lower: lower.unwrap_or_else(|| forecast.clone()),
            confidence_upper: upper.unwrap_or_else(|| forecast.clone()),
            forecast,
            model_info: outcome.model_info,
            aic: outcome.aic,
            bic: outcome.bic,
        }
    }
}
