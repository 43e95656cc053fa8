//! Forecast result structure for holding predictions.

use crate::error::{ForecastError, Result};

/// A forecast result containing point predictions and optional intervals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    /// Point predictions, one per step.
    point: Vec<f64>,
    /// Lower prediction interval bounds (optional)
    lower: Option<Vec<f64>>,
    /// Upper prediction interval bounds (optional)
    upper: Option<Vec<f64>>,
}

impl Forecast {
    /// Create an empty forecast.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a forecast from point predictions.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            point: values,
            lower: None,
            upper: None,
        }
    }

    /// Create a forecast with prediction intervals.
    ///
    /// Fails if the interval bounds do not match the number of points.
    pub fn from_values_with_intervals(
        values: Vec<f64>,
        lower: Vec<f64>,
        upper: Vec<f64>,
    ) -> Result<Self> {
        for bound in [&lower, &upper] {
            if bound.len() != values.len() {
                return Err(ForecastError::ComputationError(format!(
                    "interval length {} does not match horizon {}",
                    bound.len(),
                    values.len()
                )));
            }
        }
        Ok(Self {
            point: values,
            lower: Some(lower),
            upper: Some(upper),
        })
    }

    /// Get the forecast horizon (number of steps).
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    /// Check if forecast is empty.
    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    /// Get the point predictions.
    pub fn primary(&self) -> &[f64] {
        &self.point
    }

    /// Check if lower interval is available.
    pub fn has_lower(&self) -> bool {
        self.lower.is_some()
    }

    /// Check if upper interval is available.
    pub fn has_upper(&self) -> bool {
        self.upper.is_some()
    }

    /// Get the lower bounds.
    pub fn lower(&self) -> Option<&[f64]> {
        self.lower.as_deref()
    }

    /// Get the upper bounds.
    pub fn upper(&self) -> Option<&[f64]> {
        self.upper.as_deref()
    }

    /// Clamp points and bounds from below.
    pub fn clamp_min(mut self, floor: f64) -> Self {
        let clamp = |v: &mut Vec<f64>| v.iter_mut().for_each(|x| *x = x.max(floor));
        clamp(&mut self.point);
        if let Some(lower) = self.lower.as_mut() {
            clamp(lower);
        }
        if let Some(upper) = self.upper.as_mut() {
            clamp(upper);
        }
        self
    }

    /// Decompose into `(point, lower, upper)`.
    pub fn into_parts(self) -> (Vec<f64>, Option<Vec<f64>>, Option<Vec<f64>>) {
        (self.point, self.lower, self.upper)
    }
}
