//! Automatic ARIMA and SARIMA model selection.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::arima::diff::{seasonal_difference, suggest_seasonal_differencing};
use crate::models::arima::model::SARIMA;
use crate::models::arima::order::ModelOrder;
use crate::models::arima::summary::ModelSummary;
use crate::models::Forecaster;
use crate::validation::ndiffs;

/// Configuration for AutoARIMA.
#[derive(Debug, Clone)]
pub struct AutoARIMAConfig {
    /// Maximum non-seasonal AR order to consider.
    pub max_p: usize,
    /// Maximum non-seasonal MA order to consider.
    pub max_q: usize,
    /// Maximum non-seasonal differencing order.
    pub max_d: usize,
    /// Maximum seasonal AR order.
    pub max_cap_p: usize,
    /// Maximum seasonal MA order.
    pub max_cap_q: usize,
    /// Maximum seasonal differencing order.
    pub max_cap_d: usize,
    /// Maximum of `p + q + P + Q`.
    pub max_order: usize,
    /// Seasonal period (0 or 1 for non-seasonal).
    pub seasonal_period: usize,
    /// Use stepwise search (faster) vs exhaustive.
    pub stepwise: bool,
    /// Selection criterion (use AIC for selection, BIC otherwise).
    pub use_aic: bool,
    /// Significance level of the KPSS test choosing `d`.
    pub test_alpha: f64,
    /// Upper bound on the number of models fitted by the stepwise search.
    pub max_models: usize,
    /// Wall-clock budget for the search; the best model so far is kept.
    pub search_budget: Option<Duration>,
}

impl Default for AutoARIMAConfig {
    fn default() -> Self {
        Self {
            max_p: 5,
            max_q: 5,
            max_d: 2,
            max_cap_p: 2,
            max_cap_q: 2,
            max_cap_d: 1,
            max_order: 5,
            seasonal_period: 0,
            stepwise: true,
            use_aic: true,
            test_alpha: 0.05,
            max_models: 94,
            search_budget: None,
        }
    }
}

impl AutoARIMAConfig {
    /// Set maximum non-seasonal orders.
    pub fn with_max_orders(mut self, max_p: usize, max_d: usize, max_q: usize) -> Self {
        self.max_p = max_p;
        self.max_d = max_d;
        self.max_q = max_q;
        self
    }

    /// Set maximum seasonal orders.
    pub fn with_seasonal_orders(mut self, max_p: usize, max_d: usize, max_q: usize) -> Self {
        self.max_cap_p = max_p;
        self.max_cap_d = max_d;
        self.max_cap_q = max_q;
        self
    }

    /// Set seasonal period.
    pub fn with_seasonal_period(mut self, period: usize) -> Self {
        self.seasonal_period = period;
        self
    }

    /// Bound the wall-clock time spent searching.
    pub fn with_search_budget(mut self, budget: Duration) -> Self {
        self.search_budget = Some(budget);
        self
    }

    /// Use exhaustive search instead of stepwise.
    pub fn exhaustive(mut self) -> Self {
        self.stepwise = false;
        self
    }

    fn is_seasonal(&self) -> bool {
        self.seasonal_period > 1
    }

    /// Whether `(p, q, P, Q)` lies inside the search space.
    fn admits(&self, order: &ModelOrder) -> bool {
        let seasonal_ok = if self.is_seasonal() {
            order.cap_p <= self.max_cap_p && order.cap_q <= self.max_cap_q
        } else {
            order.cap_p == 0 && order.cap_q == 0
        };
        order.p <= self.max_p
            && order.q <= self.max_q
            && seasonal_ok
            && order.p + order.q + order.cap_p + order.cap_q <= self.max_order
    }
}

/// Mutable state of one search run.
struct Search<'a> {
    config: &'a AutoARIMAConfig,
    series: &'a TimeSeries,
    started: Instant,
    visited: HashSet<ModelOrder>,
    scores: Vec<(ModelOrder, f64)>,
    best: Option<(SARIMA, f64)>,
    budget_hit: bool,
}

impl<'a> Search<'a> {
    fn new(config: &'a AutoARIMAConfig, series: &'a TimeSeries) -> Self {
        Self {
            config,
            series,
            started: Instant::now(),
            visited: HashSet::new(),
            scores: Vec::new(),
            best: None,
            budget_hit: false,
        }
    }

    fn best_score(&self) -> f64 {
        self.best.as_ref().map_or(f64::INFINITY, |(_, s)| *s)
    }

    fn out_of_budget(&mut self) -> bool {
        if let Some(budget) = self.config.search_budget {
            if !self.budget_hit && self.started.elapsed() >= budget {
                debug!(
                    fitted = self.visited.len(),
                    "search budget exhausted, keeping best model so far"
                );
                self.budget_hit = true;
            }
        }
        self.budget_hit
    }

    /// Fit `order` once; returns true if it became the new best.
    fn try_order(&mut self, order: ModelOrder) -> bool {
        if !self.config.admits(&order) || !self.visited.insert(order) {
            return false;
        }

        let mut model = SARIMA::new(order);
        if let Err(err) = model.fit(self.series) {
            trace!(%order, error = %err, "candidate rejected");
            return false;
        }
        let score = if self.config.use_aic {
            model.aic()
        } else {
            model.bic()
        };
        let Some(score) = score.filter(|s| s.is_finite()) else {
            return false;
        };

        debug!(%order, score, "candidate fitted");
        self.scores.push((order, score));
        if score < self.best_score() {
            self.best = Some((model, score));
            true
        } else {
            false
        }
    }

    fn run_exhaustive(&mut self, d: usize, cap_d: usize, s: usize) {
        let (max_cap_p, max_cap_q) = if self.config.is_seasonal() {
            (self.config.max_cap_p, self.config.max_cap_q)
        } else {
            (0, 0)
        };
        for p in 0..=self.config.max_p {
            for q in 0..=self.config.max_q {
                for cap_p in 0..=max_cap_p {
                    for cap_q in 0..=max_cap_q {
                        if self.out_of_budget() {
                            return;
                        }
                        self.try_order(ModelOrder::seasonal(p, d, q, cap_p, cap_d, cap_q, s));
                    }
                }
            }
        }
    }

    /// Hyndman-Khandakar stepwise search.
    fn run_stepwise(&mut self, d: usize, cap_d: usize, s: usize) {
        let seasonal = self.config.is_seasonal();
        let start: [(usize, usize, usize, usize); 4] = if seasonal {
            [(2, 2, 1, 1), (0, 0, 0, 0), (1, 0, 1, 0), (0, 1, 0, 1)]
        } else {
            [(2, 2, 0, 0), (0, 0, 0, 0), (1, 0, 0, 0), (0, 1, 0, 0)]
        };

        for (p, q, cap_p, cap_q) in start {
            if self.out_of_budget() {
                return;
            }
            self.try_order(ModelOrder::seasonal(
                p.min(self.config.max_p),
                d,
                q.min(self.config.max_q),
                cap_p.min(self.config.max_cap_p),
                cap_d,
                cap_q.min(self.config.max_cap_q),
                s,
            ));
        }

        let mut improved = true;
        while improved {
            improved = false;
            let Some(current) = self.best.as_ref().map(|(m, _)| m.order()) else {
                return;
            };
            for candidate in neighbours(current, seasonal) {
                if self.visited.len() >= self.config.max_models || self.out_of_budget() {
                    return;
                }
                if self.try_order(candidate) {
                    improved = true;
                    break;
                }
            }
        }
    }
}

/// Orders one step away from `order`, seasonal moves first.
fn neighbours(order: ModelOrder, seasonal: bool) -> Vec<ModelOrder> {
    const MOVES: [(isize, isize); 8] = [
        (-1, 0),
        (1, 0),
        (0, -1),
        (0, 1),
        (-1, -1),
        (1, 1),
        (-1, 1),
        (1, -1),
    ];

    let shift = |v: usize, delta: isize| v.checked_add_signed(delta);
    let mut result = Vec::new();

    if seasonal {
        for (dp, dq) in MOVES {
            if let (Some(cap_p), Some(cap_q)) = (shift(order.cap_p, dp), shift(order.cap_q, dq)) {
                result.push(ModelOrder {
                    cap_p,
                    cap_q,
                    ..order
                });
            }
        }
    }
    for (dp, dq) in MOVES {
        if let (Some(p), Some(q)) = (shift(order.p, dp), shift(order.q, dq)) {
            result.push(ModelOrder { p, q, ..order });
        }
    }
    result
}

/// Automatic ARIMA/SARIMA model selection.
///
/// Chooses the seasonal differencing order `D` from the strength of
/// seasonality and the regular order `d` with repeated KPSS tests, then
/// searches `(p, q)(P, Q)` minimising the information criterion.
///
/// # Example
/// ```
/// use arima_forecast::core::TimeSeries;
/// use arima_forecast::models::arima::{AutoARIMA, AutoARIMAConfig};
/// use arima_forecast::models::Forecaster;
///
/// let values: Vec<f64> = (0..48)
///     .map(|i| 20.0 + 5.0 * (i as f64 * std::f64::consts::PI / 2.0).sin() + (i % 3) as f64)
///     .collect();
/// let config = AutoARIMAConfig::default().with_seasonal_period(4);
/// let mut model = AutoARIMA::with_config(config);
/// model.fit(&TimeSeries::new(values)).unwrap();
///
/// assert!(model.selected_order().is_some());
/// assert_eq!(model.predict(4).unwrap().horizon(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct AutoARIMA {
    /// Configuration.
    config: AutoARIMAConfig,
    /// Selected model.
    selected_model: Option<SARIMA>,
    /// All fitted models and their scores, best first.
    model_scores: Vec<(ModelOrder, f64)>,
}

impl AutoARIMA {
    /// Create a new AutoARIMA with default configuration.
    pub fn new() -> Self {
        Self::with_config(AutoARIMAConfig::default())
    }

    /// Create AutoARIMA with custom configuration.
    pub fn with_config(config: AutoARIMAConfig) -> Self {
        Self {
            config,
            selected_model: None,
            model_scores: Vec::new(),
        }
    }

    /// Create AutoARIMA with seasonal period.
    pub fn seasonal(period: usize) -> Self {
        Self::with_config(AutoARIMAConfig::default().with_seasonal_period(period))
    }

    /// Get the configuration.
    pub fn config(&self) -> &AutoARIMAConfig {
        &self.config
    }

    /// Get the full selected order including seasonal components.
    pub fn selected_order(&self) -> Option<ModelOrder> {
        self.selected_model.as_ref().map(SARIMA::order)
    }

    /// Get the selected model.
    pub fn selected_model(&self) -> Option<&SARIMA> {
        self.selected_model.as_ref()
    }

    /// Get all model scores, sorted ascending.
    pub fn model_scores(&self) -> &[(ModelOrder, f64)] {
        &self.model_scores
    }

    /// AIC of the selected model.
    pub fn aic(&self) -> Option<f64> {
        self.selected_model.as_ref()?.aic()
    }

    /// BIC of the selected model.
    pub fn bic(&self) -> Option<f64> {
        self.selected_model.as_ref()?.bic()
    }

    /// Summary of the selected model.
    pub fn summary(&self) -> Option<ModelSummary> {
        self.selected_model.as_ref()?.summary()
    }

    fn selected(&self) -> Result<&SARIMA> {
        self.selected_model.as_ref().ok_or(ForecastError::FitRequired)
    }
}

impl Default for AutoARIMA {
    fn default() -> Self {
        Self::new()
    }
}

impl Forecaster for AutoARIMA {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.values();
        if series.has_missing_values() {
            return Err(ForecastError::MissingValues);
        }

        let seasonal = self.config.is_seasonal();
        let s = if seasonal {
            self.config.seasonal_period
        } else {
            0
        };

        let min_required = if seasonal { (2 * s).max(10) } else { 10 };
        if values.len() < min_required {
            return Err(ForecastError::InsufficientData {
                needed: min_required,
                got: values.len(),
            });
        }

        let cap_d = if seasonal {
            suggest_seasonal_differencing(values, s).min(self.config.max_cap_d)
        } else {
            0
        };
        let d = ndiffs(
            &seasonal_difference(values, cap_d, s),
            self.config.test_alpha,
            self.config.max_d,
        );
        debug!(d, cap_d, s, n = values.len(), "differencing orders chosen");

        let mut search = Search::new(&self.config, series);
        if self.config.stepwise {
            search.run_stepwise(d, cap_d, s);
        } else {
            search.run_exhaustive(d, cap_d, s);
        }

        let mut scores = search.scores;
        scores.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        self.model_scores = scores;

        let (model, score) = search.best.ok_or_else(|| {
            ForecastError::ComputationError(
                "no valid ARIMA/SARIMA model could be fitted".to_string(),
            )
        })?;
        debug!(order = %model.order(), score, "model selected");
        self.selected_model = Some(model);

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        self.selected()?.predict(horizon)
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        self.selected()?.predict_with_intervals(horizon, level)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.selected_model.as_ref()?.fitted_values()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.selected_model.as_ref()?.residuals()
    }

    fn name(&self) -> &str {
        match self.selected_order() {
            Some(order) if order.is_seasonal() => "AutoARIMA (SARIMA)",
            _ => "AutoARIMA",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn trend_with_wiggle(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 10.0 + 1.5 * i as f64 + (i as f64 * 0.7).sin())
            .collect()
    }

    fn seasonal_series(n: usize, period: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                50.0 + 0.5 * i as f64
                    + 10.0 * (2.0 * PI * i as f64 / period as f64).sin()
                    + ((i * 7) % 5) as f64 * 0.4
            })
            .collect()
    }

    #[test]
    fn auto_arima_selects_model() {
        let values: Vec<f64> = (0..100).map(|i| 10.0 + (i as f64 * 0.9).sin()).collect();

        let mut model = AutoARIMA::new();
        model.fit(&TimeSeries::new(values)).unwrap();

        assert!(model.selected_order().is_some());
        assert!(!model.model_scores().is_empty());
        assert_eq!(model.predict(5).unwrap().horizon(), 5);
    }

    #[test]
    fn auto_arima_differences_trend() {
        let mut model = AutoARIMA::new();
        model.fit(&TimeSeries::new(trend_with_wiggle(100))).unwrap();

        let order = model.selected_order().unwrap();
        assert!(order.d >= 1);
    }

    #[test]
    fn auto_arima_respects_bounds() {
        let config = AutoARIMAConfig::default()
            .with_max_orders(1, 1, 1)
            .with_seasonal_period(12)
            .with_seasonal_orders(1, 1, 1);
        let mut model = AutoARIMA::with_config(config);
        model.fit(&TimeSeries::new(seasonal_series(72, 12))).unwrap();

        for (order, _) in model.model_scores() {
            assert!(order.p <= 1 && order.q <= 1 && order.d <= 1);
            assert!(order.cap_p <= 1 && order.cap_q <= 1 && order.cap_d <= 1);
        }
    }

    #[test]
    fn auto_arima_exhaustive_fits_more() {
        let values = trend_with_wiggle(80);

        let mut stepwise = AutoARIMA::with_config(AutoARIMAConfig::default().with_max_orders(2, 2, 2));
        stepwise.fit(&TimeSeries::new(values.clone())).unwrap();

        let mut exhaustive = AutoARIMA::with_config(
            AutoARIMAConfig::default()
                .with_max_orders(2, 2, 2)
                .exhaustive(),
        );
        exhaustive.fit(&TimeSeries::new(values)).unwrap();

        assert!(exhaustive.model_scores().len() >= stepwise.model_scores().len());
        // Exhaustive search cannot do worse on the same differencing.
        let best = |m: &AutoARIMA| m.model_scores()[0].1;
        assert!(best(&exhaustive) <= best(&stepwise) + 1e-9);
    }

    #[test]
    fn auto_arima_model_scores_sorted() {
        let values: Vec<f64> = (0..100).map(|i| 10.0 + (i as f64 * 0.3).sin()).collect();

        let mut model = AutoARIMA::new();
        model.fit(&TimeSeries::new(values)).unwrap();

        let scores = model.model_scores();
        for pair in scores.windows(2) {
            assert!(pair[1].1 >= pair[0].1);
        }
        assert_eq!(model.aic(), Some(scores[0].1));
    }

    #[test]
    fn auto_arima_seasonal_chooses_seasonal_difference() {
        let mut model = AutoARIMA::seasonal(12);
        model.fit(&TimeSeries::new(seasonal_series(72, 12))).unwrap();

        let order = model.selected_order().unwrap();
        assert_eq!(order.cap_d, 1);
        assert_eq!(order.s, 12);

        let forecast = model.predict_with_intervals(12, 0.95).unwrap();
        assert_eq!(forecast.horizon(), 12);
        assert!(forecast.has_lower() && forecast.has_upper());
        assert!(model.summary().is_some());
    }

    #[test]
    fn auto_arima_zero_budget_keeps_nothing() {
        let config = AutoARIMAConfig::default().with_search_budget(Duration::ZERO);
        let mut model = AutoARIMA::with_config(config);
        let result = model.fit(&TimeSeries::new(trend_with_wiggle(60)));
        assert!(matches!(result, Err(ForecastError::ComputationError(_))));
    }

    #[test]
    fn auto_arima_insufficient_data() {
        let mut model = AutoARIMA::new();
        assert!(matches!(
            model.fit(&TimeSeries::new(vec![1.0, 2.0, 3.0, 4.0, 5.0])),
            Err(ForecastError::InsufficientData { .. })
        ));

        let mut seasonal = AutoARIMA::seasonal(12);
        assert!(matches!(
            seasonal.fit(&TimeSeries::new(seasonal_series(20, 12))),
            Err(ForecastError::InsufficientData { needed: 24, got: 20 })
        ));
    }

    #[test]
    fn auto_arima_requires_fit() {
        let model = AutoARIMA::new();
        assert!(matches!(model.predict(5), Err(ForecastError::FitRequired)));
        assert_eq!(model.name(), "AutoARIMA");
        assert!(model.summary().is_none());
    }

    #[test]
    fn neighbours_stay_non_negative() {
        let order = ModelOrder::seasonal(0, 1, 1, 0, 1, 0, 12);
        let next = neighbours(order, true);
        assert!(next.iter().all(|o| o.d == 1 && o.cap_d == 1 && o.s == 12));
        assert!(next.contains(&ModelOrder::seasonal(1, 1, 1, 0, 1, 0, 12)));
        assert!(next.contains(&ModelOrder::seasonal(0, 1, 1, 1, 1, 1, 12)));
        assert!(!next.contains(&order));

        let plain = neighbours(ModelOrder::arima(1, 0, 1), false);
        assert!(plain.iter().all(|o| o.cap_p == 0 && o.cap_q == 0));
        assert_eq!(plain.len(), 8);
    }

    #[test]
    fn config_builders() {
        let config = AutoARIMAConfig::default()
            .with_max_orders(3, 2, 3)
            .with_seasonal_orders(2, 1, 2)
            .with_seasonal_period(12)
            .exhaustive();

        assert_eq!(config.max_p, 3);
        assert_eq!(config.max_d, 2);
        assert_eq!(config.max_q, 3);
        assert_eq!(config.max_cap_p, 2);
        assert_eq!(config.max_cap_d, 1);
        assert_eq!(config.max_cap_q, 2);
        assert_eq!(config.seasonal_period, 12);
        assert!(!config.stepwise);
        assert!(config.admits(&ModelOrder::seasonal(1, 0, 1, 1, 0, 1, 12)));
        assert!(!config.admits(&ModelOrder::seasonal(3, 0, 3, 0, 0, 0, 12)));
    }
}
