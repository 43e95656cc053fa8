//! Ordered forecasting strategies.
//!
//! The engine walks a list of strategies and keeps the first result produced
//! by one that applies. Each strategy clamps its output to be non-negative.

use std::fmt;

use tracing::debug;

use crate::core::{Forecast, TimeSeries};
use crate::engine::config::ForecastConfig;
use crate::error::{ForecastError, Result};
use crate::models::arima::AutoARIMA;
use crate::models::baseline::Naive;
use crate::models::exponential::SimpleExponentialSmoothing;
use crate::models::Forecaster;

/// Method that produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Automatic seasonal ARIMA search.
    AutoSarima,
    /// Too few observations; last value repeated.
    InsufficientData,
    /// Model fitting failed; exponential smoothing used instead.
    ExponentialSmoothing,
    /// The request could not be served.
    Error,
}

impl Method {
    /// Fixed `model_info` tag; the seasonal path reports its summary instead.
    pub fn tag(&self) -> &'static str {
        match self {
            Method::AutoSarima => "auto_sarima",
            Method::InsufficientData => "fallback_due_to_insufficient_data",
            Method::ExponentialSmoothing => "fallback_exponential_smoothing",
            Method::Error => "error_fallback",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Result of a successful strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub method: Method,
    /// Point forecast with lower/upper bounds.
    pub forecast: Forecast,
    pub model_info: String,
    pub aic: Option<f64>,
    pub bic: Option<f64>,
}

/// One step of the fallback chain.
pub trait Strategy {
    fn method(&self) -> Method;

    /// Whether this strategy should be tried for `series`.
    fn applies(&self, series: &TimeSeries, config: &ForecastConfig) -> bool {
        let _ = (series, config);
        true
    }

    /// Produce a forecast of `horizon` steps from a series without gaps.
    fn run(
        &self,
        series: &TimeSeries,
        horizon: usize,
        seasonal_period: usize,
        config: &ForecastConfig,
    ) -> Result<Outcome>;
}

/// Boxed strategy for the engine's chain.
pub type BoxedStrategy = Box<dyn Strategy>;

/// The default chain: insufficient-data guard, seasonal search, smoothing.
pub fn default_chain() -> Vec<BoxedStrategy> {
    vec![
        Box::new(InsufficientDataStrategy),
        Box::new(AutoSarimaStrategy),
        Box::new(ExponentialSmoothingStrategy),
    ]
}

/// Constant forecast of `value` with the configured multiplicative band.
fn constant_band(value: f64, horizon: usize, config: &ForecastConfig) -> Result<Forecast> {
    let band = config.band;
    Forecast::from_values_with_intervals(
        vec![value; horizon],
        vec![(band.lower * value).max(0.0); horizon],
        vec![band.upper * value; horizon],
    )
    .map(|f| f.clamp_min(0.0))
}

/// Repeats the last observation when the series is too short to fit.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsufficientDataStrategy;

impl Strategy for InsufficientDataStrategy {
    fn method(&self) -> Method {
        Method::InsufficientData
    }

    fn applies(&self, series: &TimeSeries, config: &ForecastConfig) -> bool {
        series.len() < config.min_observations
    }

    fn run(
        &self,
        series: &TimeSeries,
        horizon: usize,
        _seasonal_period: usize,
        config: &ForecastConfig,
    ) -> Result<Outcome> {
        let value = if series.is_empty() {
            0.0
        } else {
            let mut naive = Naive::new();
            naive.fit(series)?;
            naive.last_value().ok_or(ForecastError::FitRequired)?
        };

        Ok(Outcome {
            method: self.method(),
            forecast: constant_band(value, horizon, config)?,
            model_info: self.method().tag().to_string(),
            aic: None,
            bic: None,
        })
    }
}

/// Automatic seasonal ARIMA with a model-based prediction interval.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoSarimaStrategy;

impl AutoSarimaStrategy {
    /// Shrink the period when fewer than two full cycles are observed.
    pub fn effective_period(n: usize, seasonal_period: usize) -> usize {
        if n < 2 * seasonal_period {
            4.min(n / 2)
        } else {
            seasonal_period
        }
    }
}

impl Strategy for AutoSarimaStrategy {
    fn method(&self) -> Method {
        Method::AutoSarima
    }

    fn run(
        &self,
        series: &TimeSeries,
        horizon: usize,
        seasonal_period: usize,
        config: &ForecastConfig,
    ) -> Result<Outcome> {
        let period = Self::effective_period(series.len(), seasonal_period);
        if period != seasonal_period {
            debug!(
                requested = seasonal_period,
                period,
                n = series.len(),
                "seasonal period shortened"
            );
        }

        let mut model =
            AutoARIMA::with_config(config.search.clone().with_seasonal_period(period));
        model.fit(series)?;

        let forecast = model.predict_with_intervals(horizon, config.confidence_level)?;
        let finite = |values: Option<&[f64]>| values.is_some_and(|v| v.iter().all(|x| x.is_finite()));
        if !finite(Some(forecast.primary())) || !finite(forecast.lower()) || !finite(forecast.upper()) {
            return Err(ForecastError::ComputationError(
                "forecast contains non-finite values".to_string(),
            ));
        }

        let summary = model.summary().ok_or(ForecastError::FitRequired)?;
        Ok(Outcome {
            method: self.method(),
            forecast: forecast.clamp_min(0.0),
            model_info: summary.to_string(),
            aic: Some(summary.aic),
            bic: Some(summary.bic),
        })
    }
}

/// Simple exponential smoothing with a fixed smoothing parameter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExponentialSmoothingStrategy;

impl Strategy for ExponentialSmoothingStrategy {
    fn method(&self) -> Method {
        Method::ExponentialSmoothing
    }

    fn run(
        &self,
        series: &TimeSeries,
        horizon: usize,
        _seasonal_period: usize,
        config: &ForecastConfig,
    ) -> Result<Outcome> {
        let alpha = config.smoothing_alpha;
        let level = if series.is_empty() {
            0.0
        } else {
            let mut ses = SimpleExponentialSmoothing::new(alpha);
            ses.fit(series)?;
            ses.level().ok_or(ForecastError::FitRequired)?
        };

        Ok(Outcome {
            method: self.method(),
            forecast: constant_band(level, horizon, config)?,
            model_info: format!("{}_alpha_{}", self.method().tag(), alpha),
            aic: None,
            bic: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp(n: usize) -> TimeSeries {
        TimeSeries::new((1..=n).map(|i| i as f64).collect())
    }

    #[test]
    fn insufficient_data_repeats_last_value() {
        let config = ForecastConfig::default();
        let strategy = InsufficientDataStrategy;
        let series = ramp(5);

        assert!(strategy.applies(&series, &config));
        assert!(!strategy.applies(&ramp(24), &config));

        let outcome = strategy.run(&series, 3, 12, &config).unwrap();
        assert_eq!(outcome.forecast.primary(), &[5.0, 5.0, 5.0]);
        assert_eq!(outcome.forecast.lower().unwrap(), &[4.0, 4.0, 4.0]);
        assert_relative_eq!(outcome.forecast.upper().unwrap()[0], 6.0, epsilon = 1e-12);
        assert_eq!(outcome.model_info, "fallback_due_to_insufficient_data");
        assert!(outcome.aic.is_none());
    }

    #[test]
    fn insufficient_data_on_empty_series_is_zero() {
        let outcome = InsufficientDataStrategy
            .run(&TimeSeries::new(vec![]), 4, 12, &ForecastConfig::default())
            .unwrap();
        assert_eq!(outcome.forecast.primary(), &[0.0; 4]);
        assert_eq!(outcome.forecast.upper().unwrap(), &[0.0; 4]);
    }

    #[test]
    fn negative_levels_are_clamped() {
        let outcome = InsufficientDataStrategy
            .run(&TimeSeries::new(vec![-3.0, -5.0]), 2, 12, &ForecastConfig::default())
            .unwrap();
        assert_eq!(outcome.forecast.primary(), &[0.0, 0.0]);
        assert_eq!(outcome.forecast.lower().unwrap(), &[0.0, 0.0]);
        assert_eq!(outcome.forecast.upper().unwrap(), &[0.0, 0.0]);
    }

    #[test]
    fn smoothing_uses_alpha_point_three() {
        let outcome = ExponentialSmoothingStrategy
            .run(&ramp(5), 2, 12, &ForecastConfig::default())
            .unwrap();
        let point = outcome.forecast.primary();
        assert_relative_eq!(point[0], 3.2269, epsilon = 1e-9);
        assert_relative_eq!(outcome.forecast.lower().unwrap()[1], 0.8 * 3.2269, epsilon = 1e-9);
        assert_relative_eq!(outcome.forecast.upper().unwrap()[1], 1.2 * 3.2269, epsilon = 1e-9);
        assert_eq!(outcome.model_info, "fallback_exponential_smoothing_alpha_0.3");
    }

    #[test]
    fn effective_period_shrinks_short_series() {
        assert_eq!(AutoSarimaStrategy::effective_period(36, 12), 4);
        assert_eq!(AutoSarimaStrategy::effective_period(24, 12), 12);
        assert_eq!(AutoSarimaStrategy::effective_period(6, 12), 3);
        assert_eq!(AutoSarimaStrategy::effective_period(100, 7), 7);
    }

    #[test]
    fn auto_sarima_reports_summary_and_criteria() {
        let values: Vec<f64> = (0..48)
            .map(|i| {
                100.0 + i as f64 + 15.0 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin()
                    + ((i * 5) % 7) as f64
            })
            .collect();
        let outcome = AutoSarimaStrategy
            .run(&TimeSeries::new(values), 6, 12, &ForecastConfig::default())
            .unwrap();

        assert_eq!(outcome.method, Method::AutoSarima);
        assert!(outcome.model_info.contains("SARIMAX Results"));
        assert!(outcome.aic.unwrap().is_finite());
        assert!(outcome.bic.unwrap().is_finite());

        let lower = outcome.forecast.lower().unwrap();
        let upper = outcome.forecast.upper().unwrap();
        for (i, &p) in outcome.forecast.primary().iter().enumerate() {
            assert!(lower[i] >= 0.0 && lower[i] <= p && p <= upper[i]);
        }
    }

    #[test]
    fn method_tags() {
        assert_eq!(Method::Error.to_string(), "error_fallback");
        assert_eq!(default_chain().len(), 3);
        assert_eq!(default_chain()[0].method(), Method::InsufficientData);
    }
}
