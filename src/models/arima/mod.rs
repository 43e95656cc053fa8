//! ARIMA and SARIMA (Autoregressive Integrated Moving Average) models.
//!
//! This module provides:
//! - SARIMA models with seasonal components (P, D, Q)\[s\]
//! - AutoARIMA for automatic order selection

mod auto_arima;
mod diff;
mod model;
mod order;
mod polynomial;
mod summary;

pub use auto_arima::{AutoARIMA, AutoARIMAConfig};
pub use diff::{
    difference, differencing_polynomial, integrate, seasonal_difference,
    suggest_seasonal_differencing,
};
pub use model::SARIMA;
pub use order::ModelOrder;
pub use summary::ModelSummary;
