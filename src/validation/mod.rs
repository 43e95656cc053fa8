//! Statistical tests supporting automatic model selection.
//!
//! # Example
//!
//! ```
//! use arima_forecast::validation::{kpss_test, ndiffs};
//!
//! let trend: Vec<f64> = (0..100).map(|i| i as f64).collect();
//! let kpss = kpss_test(&trend, None);
//! assert!(!kpss.is_stationary);
//! assert!(ndiffs(&trend, 0.05, 2) >= 1);
//! ```

pub mod stationarity;

pub use stationarity::{kpss_test, ndiffs, CriticalValues, StationarityResult};
