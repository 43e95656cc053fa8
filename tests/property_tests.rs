//! Property-based tests for the forecasting engine.
//!
//! These tests verify invariants that should hold for all valid inputs,
//! using randomly generated series and requests.

use arima_forecast::core::TimeSeries;
use arima_forecast::engine::{
    Engine, ExponentialSmoothingStrategy, ForecastConfig, ForecastRequest, ForecastResponse,
    Method, Strategy as _,
};
use proptest::prelude::*;

/// Strategy for short series with gaps (`None`) sprinkled in.
fn short_observations_strategy() -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(prop::option::weighted(0.8, 0.0..1000.0_f64), 0..30)
        .prop_filter("fewer than 24 clean values", |v| {
            v.iter().flatten().count() < 24
        })
}

/// Strategy for series long enough to reach model fitting.
fn long_values_strategy() -> impl Strategy<Value = Vec<f64>> {
    (24usize..60).prop_flat_map(|len| {
        (10.0..200.0_f64, 0.0..2.0_f64, 0.0..30.0_f64).prop_map(move |(base, slope, amplitude)| {
            (0..len)
                .map(|i| {
                    base + slope * i as f64
                        + amplitude * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin()
                        + ((i * 13) % 7) as f64 * 0.3
                })
                .collect()
        })
    })
}

fn respond(data: &[Option<f64>], periods: usize) -> ForecastResponse {
    let request = ForecastRequest::new(data.to_vec()).with_periods(periods as i64);
    Engine::default().handle_request(&request).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Short series repeat the last valid observation.
    #[test]
    fn short_series_repeat_last_valid(
        data in short_observations_strategy(),
        horizon in 1usize..30,
    ) {
        let response = respond(&data, horizon);
        let expected = data.iter().rev().flatten().next().copied().unwrap_or(0.0);

        prop_assert!(response.error.is_none());
        prop_assert_eq!(response.model_info.as_str(), "fallback_due_to_insufficient_data");
        prop_assert_eq!(response.forecast.len(), horizon);
        prop_assert!(response.forecast.iter().all(|&v| v == expected));
    }

    /// Fallback bands are the fixed multiplicative band around the forecast.
    #[test]
    fn fallback_band_is_multiplicative(
        data in short_observations_strategy(),
        horizon in 1usize..20,
    ) {
        let response = respond(&data, horizon);

        prop_assert_eq!(response.confidence_lower.len(), horizon);
        prop_assert_eq!(response.confidence_upper.len(), horizon);
        for i in 0..horizon {
            let f = response.forecast[i];
            prop_assert_eq!(response.confidence_lower[i], (0.8 * f).max(0.0));
            prop_assert_eq!(response.confidence_upper[i], 1.2 * f);
        }
    }

    /// Negative observations never leak into the output.
    #[test]
    fn outputs_are_non_negative(
        data in prop::collection::vec(prop::option::of(-1000.0..1000.0_f64), 0..23),
        horizon in 1usize..10,
    ) {
        let response = respond(&data, horizon);
        for series in [&response.forecast, &response.confidence_lower, &response.confidence_upper] {
            prop_assert!(series.iter().all(|&v| v >= 0.0));
        }
    }

    /// Exponential smoothing gives identical results on repeated runs.
    #[test]
    fn smoothing_is_deterministic(
        values in prop::collection::vec(0.0..500.0_f64, 1..80),
        horizon in 1usize..12,
    ) {
        let config = ForecastConfig::default();
        let series = TimeSeries::new(values);
        let first = ExponentialSmoothingStrategy.run(&series, horizon, 12, &config).unwrap();
        let second = ExponentialSmoothingStrategy.run(&series, horizon, 12, &config).unwrap();

        prop_assert_eq!(first.method, Method::ExponentialSmoothing);
        prop_assert_eq!(&first, &second);
        let point = first.forecast.primary();
        prop_assert!(point.iter().all(|&v| v == point[0]));
    }

    /// Invalid horizons always produce the twelve-step error shape.
    #[test]
    fn non_positive_periods_are_errors(periods in -50i64..=0) {
        let input = format!(r#"{{"data":[1,2,3],"periods":{periods}}}"#);
        let response = Engine::default().handle_json(&input);

        prop_assert!(response.error.is_some());
        prop_assert_eq!(response.model_info.as_str(), "error_fallback");
        prop_assert_eq!(response.forecast, vec![0.0; 12]);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(6))]

    /// Fitted paths keep the band ordered, finite and non-negative.
    #[test]
    fn model_paths_keep_band_ordered(values in long_values_strategy(), horizon in 1usize..13) {
        let engine = Engine::default();
        let outcome = engine.forecast(&TimeSeries::new(values), horizon, 12).unwrap();

        let point = outcome.forecast.primary();
        let lower = outcome.forecast.lower().unwrap();
        let upper = outcome.forecast.upper().unwrap();
        prop_assert_eq!(point.len(), horizon);
        for i in 0..horizon {
            prop_assert!(point[i].is_finite() && lower[i].is_finite() && upper[i].is_finite());
            prop_assert!(0.0 <= lower[i] && lower[i] <= point[i] && point[i] <= upper[i]);
        }
    }
}
