//! Naive forecasting model.
//!
//! The naive method simply forecasts the last observed value for all future periods.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;
use crate::utils::stats::z_for_level;

/// Naive forecaster that repeats the last value.
#[derive(Debug, Clone, Default)]
pub struct Naive {
    last_value: Option<f64>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
}

impl Naive {
    pub fn new() -> Self {
        Self::default()
    }

    /// The value every forecast step repeats.
    pub fn last_value(&self) -> Option<f64> {
        self.last_value
    }
}

impl Forecaster for Naive {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.values();
        let Some(&last) = values.last() else {
            return Err(ForecastError::EmptyData);
        };
        if series.has_missing_values() {
            return Err(ForecastError::MissingValues);
        }

        self.last_value = Some(last);

        // y_hat[t] = y[t-1]
        let mut fitted = Vec::with_capacity(values.len());
        fitted.push(f64::NAN);
        fitted.extend_from_slice(&values[..values.len() - 1]);

        let residuals = values
            .iter()
            .zip(&fitted)
            .map(|(y, f)| y - f)
            .collect();

        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let last = self.last_value.ok_or(ForecastError::FitRequired)?;
        Ok(Forecast::from_values(vec![last; horizon]))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let last = self.last_value.ok_or(ForecastError::FitRequired)?;
        let residuals = self.residuals.as_ref().ok_or(ForecastError::FitRequired)?;

        let valid: Vec<f64> = residuals.iter().copied().filter(|r| !r.is_nan()).collect();
        if valid.is_empty() {
            return Ok(Forecast::from_values(vec![last; horizon]));
        }

        let sigma = (valid.iter().map(|r| r * r).sum::<f64>() / valid.len() as f64).sqrt();
        let z = z_for_level(level);

        // Random-walk error grows with sqrt(h).
        let (lower, upper) = (1..=horizon)
            .map(|h| {
                let se = sigma * (h as f64).sqrt();
                (last - z * se, last + z * se)
            })
            .unzip();

        Forecast::from_values_with_intervals(vec![last; horizon], lower, upper)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "Naive"
    }
}
