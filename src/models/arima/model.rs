//! Seasonal ARIMA model estimated by conditional sum of squares.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::arima::diff::{difference, differencing_polynomial, integrate, seasonal_difference};
use crate::models::arima::order::ModelOrder;
use crate::models::arima::polynomial::{
    expand_ar, expand_ma, is_invertible, is_stationary, multiply, psi_weights,
};
use crate::models::arima::summary::ModelSummary;
use crate::models::Forecaster;
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use crate::utils::stats::{mean, population_variance, z_for_level};

const COEFFICIENT_BOUND: f64 = 0.99;

/// Coefficients unpacked from an optimiser parameter vector.
#[derive(Debug, Clone, Default, PartialEq)]
struct Coefficients {
    intercept: f64,
    ar: Vec<f64>,
    seasonal_ar: Vec<f64>,
    ma: Vec<f64>,
    seasonal_ma: Vec<f64>,
}

impl Coefficients {
    /// Parameter layout: `[intercept?, ar.., sar.., ma.., sma..]`.
    fn unpack(params: &[f64], order: &ModelOrder) -> Self {
        let mut rest = params;
        let mut take = |n: usize| {
            let (head, tail) = rest.split_at(n);
            rest = tail;
            head.to_vec()
        };
        let intercept = if order.has_intercept() {
            take(1)[0]
        } else {
            0.0
        };
        Self {
            intercept,
            ar: take(order.p),
            seasonal_ar: take(order.cap_p),
            ma: take(order.q),
            seasonal_ma: take(order.cap_q),
        }
    }

    fn is_admissible(&self) -> bool {
        is_stationary(&self.ar)
            && is_stationary(&self.seasonal_ar)
            && is_invertible(&self.ma)
            && is_invertible(&self.seasonal_ma)
    }

    fn named(&self, order: &ModelOrder) -> Vec<(String, f64)> {
        let mut named = Vec::new();
        if order.has_intercept() {
            named.push(("intercept".to_string(), self.intercept));
        }
        let lagged = |prefix: &str, values: &[f64], step: usize| {
            values
                .iter()
                .enumerate()
                .map(move |(i, &v)| (format!("{prefix}{}", (i + 1) * step), v))
                .collect::<Vec<_>>()
        };
        named.extend(lagged("ar.L", &self.ar, 1));
        named.extend(lagged("ma.L", &self.ma, 1));
        named.extend(lagged("ar.S.L", &self.seasonal_ar, order.s));
        named.extend(lagged("ma.S.L", &self.seasonal_ma, order.s));
        named
    }
}

/// One-step residuals of the ARMA recursion on the differenced series.
///
/// Pre-sample values and shocks are taken as zero (i.e. at the mean), so
/// every candidate order is scored on the same number of residuals.
fn conditional_residuals(w: &[f64], intercept: f64, ar: &[f64], ma: &[f64]) -> Vec<f64> {
    let mut residuals = Vec::with_capacity(w.len());
    for t in 0..w.len() {
        let mut pred = 0.0;
        for (k, &c) in ar.iter().enumerate().take(t) {
            pred += c * (w[t - 1 - k] - intercept);
        }
        for (k, &m) in ma.iter().enumerate().take(t) {
            pred += m * residuals[t - 1 - k];
        }
        residuals.push(w[t] - intercept - pred);
    }
    residuals
}

/// Seasonal ARIMA(p, d, q)(P, D, Q)\[s\] forecaster.
///
/// The multiplicative model
/// `phi(B) Phi(B^s) (1 - B)^d (1 - B^s)^D (y_t - mu) = theta(B) Theta(B^s) e_t`
/// is fitted by minimising the conditional sum of squares with Nelder-Mead.
/// A mean (or drift, when `d + D = 1`) is estimated only when `d + D < 2`.
///
/// # Example
/// ```
/// use arima_forecast::core::TimeSeries;
/// use arima_forecast::models::arima::{ModelOrder, SARIMA};
/// use arima_forecast::models::Forecaster;
///
/// let values: Vec<f64> = (0..48)
///     .map(|i| 100.0 + i as f64 + 10.0 * (i as f64 * std::f64::consts::PI / 6.0).sin())
///     .collect();
/// let mut model = SARIMA::new(ModelOrder::seasonal(0, 1, 1, 0, 1, 1, 12));
/// model.fit(&TimeSeries::new(values)).unwrap();
///
/// let forecast = model.predict_with_intervals(6, 0.95).unwrap();
/// assert_eq!(forecast.horizon(), 6);
/// ```
#[derive(Debug, Clone)]
pub struct SARIMA {
    order: ModelOrder,
    coefficients: Coefficients,
    /// Observations on the original scale.
    history: Option<Vec<f64>>,
    /// Series after regular and seasonal differencing.
    differenced: Option<Vec<f64>>,
    /// In-sample one-step predictions on the original scale.
    fitted: Option<Vec<f64>>,
    /// Innovations on the differenced scale.
    residuals: Option<Vec<f64>>,
    sigma2: Option<f64>,
    log_likelihood: Option<f64>,
    aic: Option<f64>,
    bic: Option<f64>,
}

impl SARIMA {
    /// Create an unfitted model of the given order.
    pub fn new(order: ModelOrder) -> Self {
        Self {
            order,
            coefficients: Coefficients::default(),
            history: None,
            differenced: None,
            fitted: None,
            residuals: None,
            sigma2: None,
            log_likelihood: None,
            aic: None,
            bic: None,
        }
    }

    /// Non-seasonal ARIMA(p, d, q).
    pub fn arima(p: usize, d: usize, q: usize) -> Self {
        Self::new(ModelOrder::arima(p, d, q))
    }

    /// Get the model order.
    pub fn order(&self) -> ModelOrder {
        self.order
    }

    /// Non-seasonal AR coefficients.
    pub fn ar_coefficients(&self) -> &[f64] {
        &self.coefficients.ar
    }

    /// Non-seasonal MA coefficients.
    pub fn ma_coefficients(&self) -> &[f64] {
        &self.coefficients.ma
    }

    /// Seasonal AR coefficients.
    pub fn seasonal_ar_coefficients(&self) -> &[f64] {
        &self.coefficients.seasonal_ar
    }

    /// Seasonal MA coefficients.
    pub fn seasonal_ma_coefficients(&self) -> &[f64] {
        &self.coefficients.seasonal_ma
    }

    /// Mean (or drift) of the differenced series; zero when not estimated.
    pub fn intercept(&self) -> f64 {
        self.coefficients.intercept
    }

    /// Innovation variance.
    pub fn sigma2(&self) -> Option<f64> {
        self.sigma2
    }

    /// Get AIC.
    pub fn aic(&self) -> Option<f64> {
        self.aic
    }

    /// Get BIC.
    pub fn bic(&self) -> Option<f64> {
        self.bic
    }

    /// Fit statistics and coefficients, once fitted.
    pub fn summary(&self) -> Option<ModelSummary> {
        Some(ModelSummary {
            order: self.order,
            n_obs: self.history.as_ref()?.len(),
            coefficients: self.coefficients.named(&self.order),
            sigma2: self.sigma2?,
            log_likelihood: self.log_likelihood?,
            aic: self.aic?,
            bic: self.bic?,
        })
    }

    /// Smallest series length this order can be fitted on.
    pub fn min_observations(&self) -> usize {
        self.order.differencing_lag() + self.order.ar_lag() + self.order.num_coefficients() + 2
    }

    fn expanded_ar(&self) -> Vec<f64> {
        expand_ar(
            &self.coefficients.ar,
            &self.coefficients.seasonal_ar,
            self.order.s,
        )
    }

    fn expanded_ma(&self) -> Vec<f64> {
        expand_ma(
            &self.coefficients.ma,
            &self.coefficients.seasonal_ma,
            self.order.s,
        )
    }

    fn estimate(&self, w: &[f64]) -> Coefficients {
        let order = self.order;
        let n_params = order.num_coefficients();
        if n_params == 0 {
            return Coefficients::default();
        }

        let mut initial = Vec::with_capacity(n_params);
        let mut bounds = Vec::with_capacity(n_params);
        if order.has_intercept() {
            initial.push(mean(w));
            bounds.push((f64::NEG_INFINITY, f64::INFINITY));
        }
        for count in [order.p, order.cap_p, order.q, order.cap_q] {
            for i in 0..count {
                initial.push(0.1 / (i + 1) as f64);
                bounds.push((-COEFFICIENT_BOUND, COEFFICIENT_BOUND));
            }
        }

        let config = NelderMeadConfig {
            max_iter: 1000,
            tolerance: 1e-8,
            ..Default::default()
        };

        let result = nelder_mead(
            |params| {
                let c = Coefficients::unpack(params, &order);
                if !c.is_admissible() {
                    return f64::INFINITY;
                }
                let ar = expand_ar(&c.ar, &c.seasonal_ar, order.s);
                let ma = expand_ma(&c.ma, &c.seasonal_ma, order.s);
                conditional_residuals(w, c.intercept, &ar, &ma)
                    .iter()
                    .map(|e| e * e)
                    .sum()
            },
            &initial,
            Some(&bounds),
            config,
        );

        Coefficients::unpack(&result.optimal_point, &order)
    }
}

impl Default for SARIMA {
    fn default() -> Self {
        Self::arima(1, 1, 1)
    }
}

impl Forecaster for SARIMA {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let order = self.order;
        let values = series.values();

        if series.has_missing_values() {
            return Err(ForecastError::MissingValues);
        }
        if order.s < 2 && order.cap_p + order.cap_d + order.cap_q > 0 {
            return Err(ForecastError::InvalidParameter(format!(
                "seasonal terms need a period of at least 2, got {}",
                order.s
            )));
        }

        let min_len = self.min_observations();
        if values.len() < min_len {
            return Err(ForecastError::InsufficientData {
                needed: min_len,
                got: values.len(),
            });
        }

        let w = seasonal_difference(&difference(values, order.d), order.cap_d, order.s);

        let coefficients = self.estimate(&w);
        if !coefficients.is_admissible() {
            return Err(ForecastError::ComputationError(format!(
                "{order} estimate is not stationary and invertible"
            )));
        }
        self.coefficients = coefficients;

        let residuals = conditional_residuals(
            &w,
            self.coefficients.intercept,
            &self.expanded_ar(),
            &self.expanded_ma(),
        );

        let n = residuals.len() as f64;
        let css: f64 = residuals.iter().map(|e| e * e).sum();
        let floor = 1e-10 * population_variance(values).max(1.0);
        let sigma2 = (css / n).max(floor);
        if !sigma2.is_finite() {
            return Err(ForecastError::ComputationError(format!(
                "{order} produced a non-finite innovation variance"
            )));
        }

        let k = (order.num_coefficients() + 1) as f64;
        let ll = -0.5 * n * (1.0 + (2.0 * std::f64::consts::PI).ln() + sigma2.ln());

        let lag = order.differencing_lag();
        let mut fitted = vec![f64::NAN; values.len()];
        for (t, e) in residuals.iter().enumerate() {
            fitted[t + lag] = values[t + lag] - e;
        }

        self.sigma2 = Some(sigma2);
        self.log_likelihood = Some(ll);
        self.aic = Some(-2.0 * ll + 2.0 * k);
        self.bic = Some(-2.0 * ll + k * n.ln());
        self.history = Some(values.to_vec());
        self.differenced = Some(w);
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let history = self.history.as_ref().ok_or(ForecastError::FitRequired)?;
        let w = self.differenced.as_ref().ok_or(ForecastError::FitRequired)?;
        let residuals = self.residuals.as_ref().ok_or(ForecastError::FitRequired)?;

        if horizon == 0 {
            return Ok(Forecast::new());
        }

        let mu = self.coefficients.intercept;
        let ar = self.expanded_ar();
        let ma = self.expanded_ma();

        let mut centered: Vec<f64> = w.iter().map(|v| v - mu).collect();
        let mut shocks = residuals.clone();
        for _ in 0..horizon {
            let t = centered.len();
            let mut pred = 0.0;
            for (k, &c) in ar.iter().enumerate().take(t) {
                pred += c * centered[t - 1 - k];
            }
            for (k, &m) in ma.iter().enumerate().take(t) {
                pred += m * shocks[t - 1 - k];
            }
            centered.push(pred);
            // Future shocks have zero expectation.
            shocks.push(0.0);
        }

        let forecast_diff: Vec<f64> = centered[w.len()..].iter().map(|x| x + mu).collect();
        let delta = differencing_polynomial(self.order.d, self.order.cap_d, self.order.s);
        let predictions = integrate(&forecast_diff, history, &delta);

        if predictions.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ComputationError(format!(
                "{} produced non-finite forecasts",
                self.order
            )));
        }

        Ok(Forecast::from_values(predictions))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        if !(level > 0.0 && level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "confidence level must be in (0, 1), got {level}"
            )));
        }
        let forecast = self.predict(horizon)?;
        let sigma2 = self.sigma2.ok_or(ForecastError::FitRequired)?;

        if horizon == 0 {
            return Ok(forecast);
        }

        // Integrated AR polynomial: (1 - sum c_k B^k) * delta(B).
        let mut ar_poly = vec![1.0];
        ar_poly.extend(self.expanded_ar().iter().map(|c| -c));
        let delta = differencing_polynomial(self.order.d, self.order.cap_d, self.order.s);
        let integrated_ar: Vec<f64> = multiply(&ar_poly, &delta)[1..]
            .iter()
            .map(|c| -c)
            .collect();
        let psi = psi_weights(&integrated_ar, &self.expanded_ma(), horizon);

        let z = z_for_level(level);
        let preds = forecast.primary();
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        let mut cumulative = 0.0;
        for (h, psi_h) in psi.iter().enumerate() {
            cumulative += psi_h * psi_h;
            let se = (sigma2 * cumulative).sqrt();
            lower.push(preds[h] - z * se);
            upper.push(preds[h] + z * se);
        }

        Forecast::from_values_with_intervals(preds.to_vec(), lower, upper)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        if self.order.is_seasonal() {
            "SARIMA"
        } else {
            "ARIMA"
        }
    }
}
