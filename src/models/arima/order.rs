//! Model order notation.

use std::fmt;

/// Model order (p, d, q)(P, D, Q)\[s\].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelOrder {
    /// Non-seasonal AR order.
    pub p: usize,
    /// Non-seasonal differencing order.
    pub d: usize,
    /// Non-seasonal MA order.
    pub q: usize,
    /// Seasonal AR order.
    pub cap_p: usize,
    /// Seasonal differencing order.
    pub cap_d: usize,
    /// Seasonal MA order.
    pub cap_q: usize,
    /// Seasonal period.
    pub s: usize,
}

impl ModelOrder {
    /// Non-seasonal ARIMA(p, d, q).
    pub fn arima(p: usize, d: usize, q: usize) -> Self {
        Self {
            p,
            d,
            q,
            cap_p: 0,
            cap_d: 0,
            cap_q: 0,
            s: 0,
        }
    }

    /// Seasonal ARIMA(p, d, q)(P, D, Q)\[s\].
    pub fn seasonal(
        p: usize,
        d: usize,
        q: usize,
        cap_p: usize,
        cap_d: usize,
        cap_q: usize,
        s: usize,
    ) -> Self {
        Self {
            p,
            d,
            q,
            cap_p,
            cap_d,
            cap_q,
            s,
        }
    }

    /// Check if this is a seasonal model.
    pub fn is_seasonal(&self) -> bool {
        self.s > 1 && (self.cap_p > 0 || self.cap_d > 0 || self.cap_q > 0)
    }

    /// Combined differencing degree `d + D`.
    pub fn total_differencing(&self) -> usize {
        self.d + self.cap_d
    }

    /// Whether a mean/drift term is estimated (only when `d + D < 2`).
    pub fn has_intercept(&self) -> bool {
        self.total_differencing() < 2
    }

    /// Number of estimated ARMA coefficients plus the intercept.
    pub fn num_coefficients(&self) -> usize {
        self.p + self.q + self.cap_p + self.cap_q + usize::from(self.has_intercept())
    }

    /// Length of the lost prefix after all differencing.
    pub fn differencing_lag(&self) -> usize {
        self.d + self.cap_d * self.s
    }

    /// Largest lag of the expanded AR polynomial.
    pub fn ar_lag(&self) -> usize {
        self.p + self.cap_p * self.s
    }

    /// Largest lag of the expanded MA polynomial.
    pub fn ma_lag(&self) -> usize {
        self.q + self.cap_q * self.s
    }
}

impl fmt::Display for ModelOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_seasonal() {
            write!(
                f,
                "SARIMA({},{},{})({},{},{})[{}]",
                self.p, self.d, self.q, self.cap_p, self.cap_d, self.cap_q, self.s
            )
        } else {
            write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
        }
    }
}
