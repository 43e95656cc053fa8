//! TimeSeries data structure for positional observations.
//!
//! Observations carry no timestamps: the index of a value is its position on
//! the time axis.

/// A univariate series of equally spaced observations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    values: Vec<f64>,
}

impl TimeSeries {
    /// Create a series from raw values.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Create a series from optional observations, mapping `None` to NaN.
    ///
    /// The result still contains the gaps; call
    /// [`TimeSeries::without_missing`] to remove them.
    pub fn from_observations(observations: &[Option<f64>]) -> Self {
        Self {
            values: observations
                .iter()
                .map(|v| v.unwrap_or(f64::NAN))
                .collect(),
        }
    }

    /// Get the number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the observations.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Check if series has missing values (NaN or Inf).
    pub fn has_missing_values(&self) -> bool {
        self.values.iter().any(|v| !v.is_finite())
    }

    /// Copy of the series with missing values (NaN or Inf) dropped.
    pub fn without_missing(&self) -> TimeSeries {
        Self::new(
            self.values
                .iter()
                .copied()
                .filter(|v| v.is_finite())
                .collect(),
        )
    }
}
