//! Simple Exponential Smoothing (SES) forecasting model.
//!
//! SES is suitable for forecasting data with no clear trend or seasonality,
//! and is the last-resort model when no ARIMA candidate can be fitted.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;
use crate::utils::stats::z_for_level;

const ALPHA_BOUNDS: (f64, f64) = (0.0001, 0.9999);

/// Simple Exponential Smoothing forecaster.
///
/// The model equation is:
/// `level_t = α × y_t + (1-α) × level_{t-1}`
///
/// with the level initialised at the first observation.
///
/// # Example
/// ```
/// use arima_forecast::core::TimeSeries;
/// use arima_forecast::models::exponential::SimpleExponentialSmoothing;
/// use arima_forecast::models::Forecaster;
///
/// let ts = TimeSeries::new(vec![10.0, 12.0, 11.0, 13.0, 12.0, 14.0]);
///
/// let mut model = SimpleExponentialSmoothing::new(0.3);
/// model.fit(&ts).unwrap();
///
/// let forecast = model.predict(3).unwrap();
/// assert_eq!(forecast.horizon(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct SimpleExponentialSmoothing {
    /// Smoothing parameter (0 < alpha < 1).
    alpha: f64,
    /// Current level state.
    level: Option<f64>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    /// Residual variance for prediction intervals.
    residual_variance: Option<f64>,
}

impl SimpleExponentialSmoothing {
    /// Create a new SES model with a fixed smoothing parameter.
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(ALPHA_BOUNDS.0, ALPHA_BOUNDS.1),
            level: None,
            fitted: None,
            residuals: None,
            residual_variance: None,
        }
    }

    /// Get the smoothing parameter.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Get the current level.
    pub fn level(&self) -> Option<f64> {
        self.level
    }
}

impl Forecaster for SimpleExponentialSmoothing {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.values();
        let Some((&first, rest)) = values.split_first() else {
            return Err(ForecastError::EmptyData);
        };
        if series.has_missing_values() {
            return Err(ForecastError::MissingValues);
        }

        let alpha = self.alpha;

        let mut level = first;
        let mut fitted = Vec::with_capacity(values.len());
        let mut residuals = Vec::with_capacity(values.len());

        // The first fitted value is the initial level itself.
        fitted.push(level);
        residuals.push(0.0);

        for &y in rest {
            fitted.push(level);
            residuals.push(y - level);
            level = alpha * y + (1.0 - alpha) * level;
        }

        self.level = Some(level);
        self.fitted = Some(fitted);
        self.residual_variance = (!rest.is_empty())
            .then(|| residuals[1..].iter().map(|r| r * r).sum::<f64>() / rest.len() as f64);
        self.residuals = Some(residuals);

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let level = self.level.ok_or(ForecastError::FitRequired)?;
        Ok(Forecast::from_values(vec![level; horizon]))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let current_level = self.level.ok_or(ForecastError::FitRequired)?;
        let alpha = self.alpha;
        let variance = self.residual_variance.unwrap_or(0.0);
        let z = z_for_level(level);

        // Var(e_{n+h}) = sigma^2 * (1 + (h - 1) * alpha^2)
        let (lower, upper) = (1..=horizon)
            .map(|h| {
                let se = (variance * (1.0 + (h - 1) as f64 * alpha * alpha)).sqrt();
                (current_level - z * se, current_level + z * se)
            })
            .unzip();

        Forecast::from_values_with_intervals(vec![current_level; horizon], lower, upper)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "SimpleExponentialSmoothing"
    }
}
