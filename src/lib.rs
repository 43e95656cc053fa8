//! # arima-forecast
//!
//! Automatic seasonal ARIMA forecasting with graceful degradation.
//!
//! The library carries the statistical machinery (SARIMA estimation, stepwise
//! order search, KPSS differencing tests, exponential smoothing) and the
//! [`engine`] that turns a JSON request into a forecast, falling back to
//! simpler methods when data is scarce or fitting fails.

#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod core;
pub mod engine;
pub mod error;
pub mod models;
pub mod utils;
pub mod validation;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::core::{Forecast, TimeSeries};
    pub use crate::engine::{Engine, ForecastConfig, ForecastRequest, ForecastResponse};
    pub use crate::error::{ForecastError, Result};
    pub use crate::models::arima::{AutoARIMA, AutoARIMAConfig, ModelOrder, SARIMA};
    pub use crate::models::Forecaster;
    pub use crate::utils::quantile_normal;
}
