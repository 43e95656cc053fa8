//! Engine configuration.

use std::time::Duration;

use crate::models::arima::AutoARIMAConfig;

/// Multipliers producing the fixed band of the fallback strategies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandFactors {
    /// Lower bound is `max(0, lower * value)`.
    pub lower: f64,
    /// Upper bound is `upper * value`.
    pub upper: f64,
}

impl Default for BandFactors {
    fn default() -> Self {
        Self {
            lower: 0.8,
            upper: 1.2,
        }
    }
}

/// Configuration of the forecasting engine.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use arima_forecast::engine::ForecastConfig;
///
/// let config = ForecastConfig::default()
///     .with_search_budget(Duration::from_millis(500))
///     .exhaustive();
///
/// assert_eq!(config.min_observations, 24);
/// assert!(!config.search.stepwise);
/// ```
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    /// Below this many clean observations no model is fitted.
    pub min_observations: usize,
    /// Horizon used when a request omits `periods` or cannot be read.
    pub default_horizon: usize,
    /// Seasonal period used when a request omits `seasonal_period`.
    pub default_seasonal_period: usize,
    /// Largest horizon served; longer requests are rejected as invalid input
    /// before any output buffer is allocated.
    pub max_horizon: usize,
    /// Smoothing parameter of the exponential-smoothing fallback.
    pub smoothing_alpha: f64,
    /// Band of the fallback strategies.
    pub band: BandFactors,
    /// Coverage of the model-based prediction interval.
    pub confidence_level: f64,
    /// Bounds and mode of the automatic order search.
    pub search: AutoARIMAConfig,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            min_observations: 24,
            default_horizon: 12,
            default_seasonal_period: 12,
            max_horizon: 10_000,
            smoothing_alpha: 0.3,
            band: BandFactors::default(),
            confidence_level: 0.95,
            search: AutoARIMAConfig::default()
                .with_max_orders(3, 2, 3)
                .with_seasonal_orders(2, 1, 2),
        }
    }
}

impl ForecastConfig {
    /// Set the minimum number of observations for model fitting.
    pub fn with_min_observations(mut self, min_observations: usize) -> Self {
        self.min_observations = min_observations;
        self
    }

    /// Set the horizon used when a request omits `periods`.
    pub fn with_default_horizon(mut self, horizon: usize) -> Self {
        self.default_horizon = horizon;
        self
    }

    /// Set the seasonal period used when a request omits `seasonal_period`.
    pub fn with_default_seasonal_period(mut self, period: usize) -> Self {
        self.default_seasonal_period = period;
        self
    }

    /// Set the largest horizon a request may ask for.
    pub fn with_max_horizon(mut self, max_horizon: usize) -> Self {
        self.max_horizon = max_horizon;
        self
    }

    /// Set the fallback smoothing parameter.
    pub fn with_smoothing_alpha(mut self, alpha: f64) -> Self {
        self.smoothing_alpha = alpha;
        self
    }

    /// Set the prediction interval coverage.
    pub fn with_confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = level;
        self
    }

    /// Replace the order search configuration.
    pub fn with_search(mut self, search: AutoARIMAConfig) -> Self {
        self.search = search;
        self
    }

    /// Bound the wall-clock time of the order search.
    pub fn with_search_budget(mut self, budget: Duration) -> Self {
        self.search = self.search.with_search_budget(budget);
        self
    }

    /// Search every order within bounds instead of stepping.
    pub fn exhaustive(mut self) -> Self {
        self.search = self.search.exhaustive();
        self
    }
}
