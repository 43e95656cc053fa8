//! Stationarity tests used to choose a differencing order.

use crate::models::arima::difference;

/// Result of a stationarity test.
#[derive(Debug, Clone)]
pub struct StationarityResult {
    /// Test statistic
    pub statistic: f64,
    /// P-value (approximate)
    pub p_value: f64,
    /// Number of lags used
    pub lags: usize,
    /// Whether series appears stationary
    pub is_stationary: bool,
    /// Critical values at common significance levels
    pub critical_values: CriticalValues,
}

/// Critical values for stationarity tests.
#[derive(Debug, Clone, Default)]
pub struct CriticalValues {
    /// Critical value at 1% significance
    pub cv_1pct: f64,
    /// Critical value at 5% significance
    pub cv_5pct: f64,
    /// Critical value at 10% significance
    pub cv_10pct: f64,
}

const KPSS_LEVEL_CRITICAL: CriticalValues = CriticalValues {
    cv_1pct: 0.739,
    cv_5pct: 0.463,
    cv_10pct: 0.347,
};

/// KPSS test for level stationarity.
///
/// The null hypothesis is stationarity; a large statistic rejects it.
///
/// # Arguments
/// * `series` - Time series data
/// * `lags` - Bartlett window for the long-run variance
///   (default: `trunc(3 * sqrt(n) / 13)`)
pub fn kpss_test(series: &[f64], lags: Option<usize>) -> StationarityResult {
    let n = series.len();

    if n < 4 {
        return StationarityResult {
            statistic: f64::NAN,
            p_value: f64::NAN,
            lags: 0,
            is_stationary: false,
            critical_values: CriticalValues::default(),
        };
    }

    let lags = lags
        .unwrap_or_else(|| (3.0 * (n as f64).sqrt() / 13.0).trunc() as usize)
        .min(n - 1);

    let mean = series.iter().sum::<f64>() / n as f64;
    let residuals: Vec<f64> = series.iter().map(|&x| x - mean).collect();

    let eta: f64 = residuals
        .iter()
        .scan(0.0, |acc, &r| {
            *acc += r;
            Some(*acc * *acc)
        })
        .sum::<f64>()
        / (n * n) as f64;

    // Newey-West long-run variance with Bartlett weights.
    let mut long_run = residuals.iter().map(|&r| r * r).sum::<f64>() / n as f64;
    for j in 1..=lags {
        let weight = 1.0 - j as f64 / (lags + 1) as f64;
        let autocov: f64 = residuals[j..]
            .iter()
            .zip(&residuals)
            .map(|(a, b)| a * b)
            .sum::<f64>()
            / n as f64;
        long_run += 2.0 * weight * autocov;
    }

    if long_run <= f64::EPSILON {
        // Constant series: trivially level-stationary.
        return StationarityResult {
            statistic: 0.0,
            p_value: 0.1,
            lags,
            is_stationary: true,
            critical_values: KPSS_LEVEL_CRITICAL,
        };
    }

    let statistic = eta / long_run;
    let p_value = kpss_p_value(statistic);

    StationarityResult {
        statistic,
        p_value,
        lags,
        is_stationary: statistic < KPSS_LEVEL_CRITICAL.cv_5pct,
        critical_values: KPSS_LEVEL_CRITICAL,
    }
}

/// Interpolated p-value from the KPSS level table, clipped to [0.01, 0.10].
fn kpss_p_value(stat: f64) -> f64 {
    const TABLE: [(f64, f64); 4] = [(0.347, 0.10), (0.463, 0.05), (0.574, 0.025), (0.739, 0.01)];

    if stat.is_nan() {
        return f64::NAN;
    }
    if stat <= TABLE[0].0 {
        return TABLE[0].1;
    }
    for pair in TABLE.windows(2) {
        let (x0, p0) = pair[0];
        let (x1, p1) = pair[1];
        if stat <= x1 {
            return p0 + (p1 - p0) * (stat - x0) / (x1 - x0);
        }
    }
    TABLE[3].1
}

/// Number of first differences needed to make `series` level-stationary.
///
/// Differences repeatedly while the KPSS test rejects stationarity at
/// `alpha`, up to `max_d`.
pub fn ndiffs(series: &[f64], alpha: f64, max_d: usize) -> usize {
    let mut d = 0;
    let mut current = series.to_vec();

    while d < max_d {
        let result = kpss_test(&current, None);
        if result.p_value.is_nan() || result.p_value >= alpha {
            break;
        }
        d += 1;
        current = difference(&current, 1);
    }

    d
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white_noise(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| ((i * 17 + 13) % 97) as f64 / 50.0 - 1.0)
            .collect()
    }

    #[test]
    fn kpss_stationary_series() {
        let result = kpss_test(&white_noise(200), Some(10));

        assert!(!result.statistic.is_nan());
        assert!(result.statistic > 0.0);
        assert!(result.is_stationary);
    }

    #[test]
    fn kpss_trending_series() {
        let series: Vec<f64> = (0..200).map(|i| i as f64 * 0.5).collect();

        let result = kpss_test(&series, Some(10));

        assert!(!result.is_stationary);
        assert!(result.p_value <= 0.05);
    }

    #[test]
    fn kpss_short_series() {
        let result = kpss_test(&[1.0, 2.0, 3.0], Some(1));
        assert!(result.statistic.is_nan());
    }

    #[test]
    fn kpss_constant_series_is_stationary() {
        let result = kpss_test(&[5.0; 30], None);
        assert!(result.is_stationary);
    }

    #[test]
    fn kpss_critical_values_increase() {
        let result = kpss_test(&white_noise(100), None);

        assert!(result.critical_values.cv_10pct < result.critical_values.cv_5pct);
        assert!(result.critical_values.cv_5pct < result.critical_values.cv_1pct);
    }

    #[test]
    fn p_value_interpolates_table() {
        assert_eq!(kpss_p_value(0.1), 0.10);
        assert!((kpss_p_value(0.463) - 0.05).abs() < 1e-12);
        assert_eq!(kpss_p_value(5.0), 0.01);
        let mid = kpss_p_value(0.4);
        assert!(mid < 0.10 && mid > 0.05);
    }

    #[test]
    fn ndiffs_for_stationary_and_trending() {
        assert_eq!(ndiffs(&white_noise(120), 0.05, 2), 0);

        let trend: Vec<f64> = (0..120)
            .map(|i| 3.0 * i as f64 + ((i * 7) % 5) as f64)
            .collect();
        assert!(ndiffs(&trend, 0.05, 2) >= 1);
    }

    #[test]
    fn ndiffs_respects_cap() {
        let quadratic: Vec<f64> = (0..120).map(|i| (i * i) as f64).collect();
        assert!(ndiffs(&quadratic, 0.05, 1) <= 1);
    }
}
