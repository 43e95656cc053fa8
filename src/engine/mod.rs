//! One-shot forecasting engine behind the `forecast-arima` binary.
//!
//! A request is validated, stripped of missing values and handed to an
//! ordered chain of [`Strategy`] implementations; the first one that applies
//! and succeeds produces the response. Anything that goes wrong before the
//! chain runs becomes the zero-filled error shape.
//!
//! # Example
//! ```
//! use arima_forecast::engine::{Engine, ForecastConfig};
//!
//! let engine = Engine::new(ForecastConfig::default());
//! let response = engine.handle_json(r#"{"data":[1,2,3,4,5],"periods":3}"#);
//!
//! assert_eq!(response.forecast, vec![5.0, 5.0, 5.0]);
//! assert_eq!(response.confidence_lower, vec![4.0, 4.0, 4.0]);
//! assert_eq!(response.confidence_upper, vec![6.0, 6.0, 6.0]);
//! assert_eq!(response.model_info, "fallback_due_to_insufficient_data");
//! ```

mod config;
mod request;
mod response;
mod strategy;

pub use config::{BandFactors, ForecastConfig};
pub use request::ForecastRequest;
pub use response::ForecastResponse;
pub use strategy::{
    default_chain, AutoSarimaStrategy, BoxedStrategy, ExponentialSmoothingStrategy,
    InsufficientDataStrategy, Method, Outcome, Strategy,
};

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::arima::{ModelOrder, SARIMA};
use crate::models::Forecaster;

/// Name reported when the startup self-check fails.
pub const ENGINE_NAME: &str = "sarima engine";

/// Forecasting engine holding a configuration and its strategy chain.
pub struct Engine {
    config: ForecastConfig,
    strategies: Vec<BoxedStrategy>,
}

impl Engine {
    /// Engine with the default strategy chain.
    pub fn new(config: ForecastConfig) -> Self {
        Self::with_strategies(config, default_chain())
    }

    /// Engine with a custom strategy chain, tried in order.
    pub fn with_strategies(config: ForecastConfig, strategies: Vec<BoxedStrategy>) -> Self {
        Self { config, strategies }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Forecast `horizon` steps of `series`.
    ///
    /// Missing values are dropped first. Only invalid parameters (including a
    /// horizon above `max_horizon`) and an exhausted chain are reported as
    /// errors.
    pub fn forecast(
        &self,
        series: &TimeSeries,
        horizon: usize,
        seasonal_period: usize,
    ) -> Result<Outcome> {
        if horizon == 0 {
            return Err(ForecastError::InvalidInput(
                "horizon must be a positive integer".to_string(),
            ));
        }
        if horizon > self.config.max_horizon {
            return Err(ForecastError::InvalidInput(format!(
                "horizon must be at most {}, got {horizon}",
                self.config.max_horizon
            )));
        }
        if seasonal_period == 0 {
            return Err(ForecastError::InvalidInput(
                "seasonal period must be a positive integer".to_string(),
            ));
        }

        let clean = series.without_missing();
        debug!(
            observations = series.len(),
            clean = clean.len(),
            horizon,
            seasonal_period,
            "forecast requested"
        );

        let mut last_error = None;
        for strategy in &self.strategies {
            if !strategy.applies(&clean, &self.config) {
                continue;
            }
            match strategy.run(&clean, horizon, seasonal_period, &self.config) {
                Ok(outcome) => {
                    debug!(method = %outcome.method, "forecast produced");
                    return Ok(outcome);
                }
                Err(err) => {
                    warn!(method = %strategy.method(), error = %err, "ARIMA failed: {err}");
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ForecastError::ComputationError("no forecasting strategy applied".to_string())
        }))
    }

    /// Serve a parsed request; omitted parameters take the configured
    /// defaults.
    pub fn handle_request(&self, request: &ForecastRequest) -> Result<ForecastResponse> {
        let horizon = request.horizon(&self.config)?;
        let period = request.period(&self.config)?;
        self.forecast(&request.series(), horizon, period)
            .map(ForecastResponse::from)
    }

    /// Serve raw JSON text; never fails.
    ///
    /// Errors become [`ForecastResponse::error_fallback`] sized by the
    /// request's `periods` when readable and within `max_horizon`, otherwise
    /// the default horizon.
    pub fn handle_json(&self, input: &str) -> ForecastResponse {
        let value: Value = match serde_json::from_str(input) {
            Ok(value) => value,
            Err(err) => {
                return ForecastResponse::error_fallback(
                    ForecastError::InvalidInput(format!("malformed JSON: {err}")).to_string(),
                    self.config.default_horizon,
                )
            }
        };

        let periods = request::salvage_horizon(&value, self.config.max_horizon)
            .unwrap_or(self.config.default_horizon);
        ForecastRequest::from_value(value)
            .and_then(|request| self.handle_request(&request))
            .unwrap_or_else(|err| {
                debug!(error = %err, "request rejected");
                ForecastResponse::error_fallback(err.to_string(), periods)
            })
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(ForecastConfig::default())
    }
}

/// Serve raw JSON with a default-chain engine.
pub fn handle_json(input: &str, config: ForecastConfig) -> ForecastResponse {
    Engine::new(config).handle_json(input)
}

/// Verify the statistical engine works before serving a request.
///
/// Fits SARIMA(0,1,1)(0,1,1)\[4\] to a synthetic seasonal series and checks
/// that a finite forecast comes out.
pub fn preflight() -> Result<()> {
    let values: Vec<f64> = (0..32)
        .map(|i| 10.0 + 0.25 * i as f64 + [2.0, -1.0, 0.5, -1.5][i % 4] + 0.1 * ((i * 7) % 3) as f64)
        .collect();

    let mut model = SARIMA::new(ModelOrder::seasonal(0, 1, 1, 0, 1, 1, 4));
    model.fit(&TimeSeries::new(values))?;
    let forecast = model.predict_with_intervals(4, 0.95)?;

    if forecast.primary().iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ForecastError::ComputationError(
            "self-check produced a non-finite forecast".to_string(),
        ))
    }
}

/// Payload written when [`preflight`] fails.
pub fn unavailable_notice() -> Value {
    json!({ "error": format!("{ENGINE_NAME} not available, using fallback") })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> Engine {
        Engine::default()
    }

    struct Failing;

    impl Strategy for Failing {
        fn method(&self) -> Method {
            Method::AutoSarima
        }

        fn run(&self, _: &TimeSeries, _: usize, _: usize, _: &ForecastConfig) -> Result<Outcome> {
            Err(ForecastError::ComputationError("forced".to_string()))
        }
    }

    #[test]
    fn documented_example() {
        let response = engine().handle_json(r#"{"data":[1,2,3,4,5],"periods":3}"#);
        assert_eq!(response.forecast, vec![5.0, 5.0, 5.0]);
        assert_eq!(response.confidence_lower, vec![4.0, 4.0, 4.0]);
        assert_eq!(response.confidence_upper, vec![6.0, 6.0, 6.0]);
        assert_eq!(response.model_info, "fallback_due_to_insufficient_data");
        assert!(response.error.is_none());
    }

    #[test]
    fn empty_object_is_insufficient_data() {
        let response = engine().handle_json("{}");
        assert!(!response.is_error());
        assert_eq!(response.forecast, vec![0.0; 12]);
        assert_eq!(response.model_info, "fallback_due_to_insufficient_data");
    }

    #[test]
    fn omitted_parameters_use_configured_defaults() {
        let config = ForecastConfig::default()
            .with_default_horizon(5)
            .with_default_seasonal_period(4);
        let engine = Engine::new(config);

        let response = engine.handle_json("{}");
        assert!(!response.is_error());
        assert_eq!(response.forecast, vec![0.0; 5]);

        let response = engine.handle_json(r#"{"data":"x"}"#);
        assert_eq!(response.horizon(), 5);

        let data: Vec<f64> = (0..40).map(|i| 10.0 + [3.0, -1.0, 0.5, -2.5][i % 4]).collect();
        let request = ForecastRequest::new(data.into_iter().map(Some).collect());
        let response = engine.handle_request(&request).unwrap();
        assert_eq!(response.horizon(), 5);
    }

    #[test]
    fn oversized_horizon_gets_default_length_error_shape() {
        let response = engine().handle_json(r#"{"data":[1,2,3],"periods":10000000000}"#);
        assert!(response.is_error());
        assert!(response.error.as_deref().unwrap_or_default().contains("at most 10000"));
        assert_eq!(response.horizon(), 12);

        let engine = Engine::new(ForecastConfig::default().with_max_horizon(8));
        assert!(engine.handle_json(r#"{"periods":8}"#).error.is_none());
        assert_eq!(engine.handle_json(r#"{"periods":9}"#).horizon(), 12);
        assert!(matches!(
            engine.forecast(&TimeSeries::new(vec![1.0]), 9, 4),
            Err(ForecastError::InvalidInput(_))
        ));
    }

    #[test]
    fn nulls_are_dropped_before_guard() {
        let response = engine().handle_json(r#"{"data":[1,null,7,null],"periods":2}"#);
        assert_eq!(response.forecast, vec![7.0, 7.0]);
    }

    #[test]
    fn malformed_input_gets_error_shape() {
        let response = engine().handle_json(r#"{"data":"x"}"#);
        assert!(response.is_error());
        assert_eq!(response.forecast, vec![0.0; 12]);
        assert_eq!(response.model_info, "error_fallback");

        let response = engine().handle_json(r#"{"data":"x","periods":4}"#);
        assert_eq!(response.confidence_upper, vec![0.0; 4]);

        let response = engine().handle_json("{not json");
        assert_eq!(response.horizon(), 12);
    }

    #[test]
    fn invalid_parameters_get_error_shape() {
        let response = engine().handle_json(r#"{"data":[1,2],"periods":0}"#);
        assert!(response.is_error());
        assert_eq!(response.horizon(), 12);

        let response = engine().handle_json(r#"{"data":[1,2],"periods":3,"seasonal_period":0}"#);
        assert!(response.is_error());
        assert_eq!(response.horizon(), 3);
    }

    #[test]
    fn forecast_rejects_zero_parameters() {
        let series = TimeSeries::new(vec![1.0, 2.0]);
        assert!(matches!(
            engine().forecast(&series, 0, 12),
            Err(ForecastError::InvalidInput(_))
        ));
        assert!(matches!(
            engine().forecast(&series, 3, 0),
            Err(ForecastError::InvalidInput(_))
        ));
    }

    #[test]
    fn failing_strategy_falls_through_to_smoothing() {
        let engine = Engine::with_strategies(
            ForecastConfig::default(),
            vec![
                Box::new(InsufficientDataStrategy),
                Box::new(Failing),
                Box::new(ExponentialSmoothingStrategy),
            ],
        );
        let series = TimeSeries::new((0..30).map(|i| 10.0 + (i % 3) as f64).collect());
        let outcome = engine.forecast(&series, 4, 12).unwrap();

        assert_eq!(outcome.method, Method::ExponentialSmoothing);
        assert_eq!(outcome.model_info, "fallback_exponential_smoothing_alpha_0.3");
        assert_eq!(outcome.forecast.horizon(), 4);
    }

    #[test]
    fn exhausted_chain_reports_last_error() {
        let engine = Engine::with_strategies(ForecastConfig::default(), vec![Box::new(Failing)]);
        let result = engine.forecast(&TimeSeries::new(vec![1.0; 30]), 2, 12);
        assert!(matches!(result, Err(ForecastError::ComputationError(_))));
    }

    #[test]
    fn preflight_passes() {
        assert!(preflight().is_ok());
        assert_eq!(
            unavailable_notice(),
            json!({"error": "sarima engine not available, using fallback"})
        );
    }
}
