//! Incoming request payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ForecastConfig;
use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};

/// Forecast request read from standard input.
///
/// Every field is optional; `{}` is a valid request for an empty series.
/// Omitted parameters take the engine's configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    /// Observations, oldest first; `null` marks a missing value.
    #[serde(default)]
    pub data: Vec<Option<f64>>,
    /// Forecast horizon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub periods: Option<i64>,
    /// Seasonal period hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasonal_period: Option<i64>,
}

impl ForecastRequest {
    /// Create a request that leaves horizon and period to the engine.
    pub fn new(data: Vec<Option<f64>>) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    pub fn with_periods(mut self, periods: i64) -> Self {
        self.periods = Some(periods);
        self
    }

    pub fn with_seasonal_period(mut self, seasonal_period: i64) -> Self {
        self.seasonal_period = Some(seasonal_period);
        self
    }

    /// Parse a request from JSON text.
    pub fn from_json(input: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(input)
            .map_err(|e| ForecastError::InvalidInput(format!("malformed JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Interpret an already parsed JSON document.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| ForecastError::InvalidInput(format!("invalid request: {e}")))
    }

    /// Validated horizon, falling back to `config.default_horizon`.
    ///
    /// Horizons above `config.max_horizon` are rejected.
    pub fn horizon(&self, config: &ForecastConfig) -> Result<usize> {
        let Some(periods) = self.periods else {
            return Ok(config.default_horizon);
        };
        let horizon = positive(periods, "periods")?;
        if horizon > config.max_horizon {
            return Err(ForecastError::InvalidInput(format!(
                "periods must be at most {}, got {periods}",
                config.max_horizon
            )));
        }
        Ok(horizon)
    }

    /// Validated seasonal period, falling back to
    /// `config.default_seasonal_period`.
    pub fn period(&self, config: &ForecastConfig) -> Result<usize> {
        self.seasonal_period
            .map_or(Ok(config.default_seasonal_period), |p| {
                positive(p, "seasonal_period")
            })
    }

    /// Observations as a series; missing values are still present.
    pub fn series(&self) -> TimeSeries {
        TimeSeries::from_observations(&self.data)
    }
}

fn positive(value: i64, field: &str) -> Result<usize> {
    usize::try_from(value)
        .ok()
        .filter(|&v| v > 0)
        .ok_or_else(|| {
            ForecastError::InvalidInput(format!("{field} must be a positive integer, got {value}"))
        })
}

/// Best-effort read of a usable horizon from a document that may not parse
/// as a full request. Values above `max_horizon` are not usable.
pub(crate) fn salvage_horizon(value: &Value, max_horizon: usize) -> Option<usize> {
    value
        .get("periods")?
        .as_i64()
        .and_then(|p| usize::try_from(p).ok())
        .filter(|&p| p > 0 && p <= max_horizon)
}
