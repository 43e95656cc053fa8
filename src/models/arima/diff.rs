//! Differencing utilities for ARIMA models.

use crate::models::arima::polynomial::multiply;
use crate::utils::stats::population_variance;

/// Apply `d` rounds of first differencing.
///
/// # Arguments
/// * `series` - The input series
/// * `d` - Differencing order (number of times to difference)
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    seasonal_difference(series, d, 1)
}

/// Apply `d` rounds of lag-`period` differencing.
///
/// Returns the input unchanged when `d` or `period` is zero, and stops early
/// once the series is too short for another round.
pub fn seasonal_difference(series: &[f64], d: usize, period: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    if period == 0 {
        return result;
    }
    for _ in 0..d {
        if result.len() <= period {
            break;
        }
        result = result[period..]
            .iter()
            .zip(&result)
            .map(|(curr, prev)| curr - prev)
            .collect();
    }
    result
}

/// Coefficients of `(1 - B)^d (1 - B^s)^D`, constant term first.
pub fn differencing_polynomial(d: usize, cap_d: usize, period: usize) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..d {
        poly = multiply(&poly, &[1.0, -1.0]);
    }
    if period > 0 {
        let mut seasonal = vec![0.0; period + 1];
        seasonal[0] = 1.0;
        seasonal[period] = -1.0;
        for _ in 0..cap_d {
            poly = multiply(&poly, &seasonal);
        }
    }
    poly
}

/// Map forecasts of the differenced series back to the original scale.
///
/// `delta` is the differencing polynomial from [`differencing_polynomial`]
/// and `history` the undifferenced observations, which must be at least
/// `delta.len() - 1` long.
pub fn integrate(differenced: &[f64], history: &[f64], delta: &[f64]) -> Vec<f64> {
    let order = delta.len().saturating_sub(1);
    if order == 0 {
        return differenced.to_vec();
    }

    let mut extended: Vec<f64> = history.to_vec();
    for &w in differenced {
        let t = extended.len();
        let carried: f64 = (1..=order)
            .map(|k| delta[k] * extended.get(t.wrapping_sub(k)).copied().unwrap_or(0.0))
            .sum();
        extended.push(w - carried);
    }
    extended.split_off(history.len())
}

/// Suggest a seasonal differencing order from the strength of seasonality.
///
/// Returns 1 when lag-`period` differencing removes at least 30% of the
/// variance, otherwise 0.
pub fn suggest_seasonal_differencing(values: &[f64], period: usize) -> usize {
    if period < 2 || values.len() < 2 * period {
        return 0;
    }

    let seasonal_diffs = seasonal_difference(values, 1, period);
    let orig_var = population_variance(values);
    let diff_var = population_variance(&seasonal_diffs);

    if orig_var > 0.0 && diff_var < orig_var * 0.7 {
        1
    } else {
        0
    }
}
