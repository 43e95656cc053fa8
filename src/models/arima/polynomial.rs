//! Lag-polynomial arithmetic for multiplicative seasonal models.
//!
//! Polynomials are coefficient vectors in the backshift operator `B`,
//! constant term first.

/// Product of two lag polynomials.
pub fn multiply(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return vec![];
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        if x == 0.0 {
            continue;
        }
        for (j, &y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// `1 + sign * sum(coef_i B^(i * step))`.
fn lag_polynomial(coefficients: &[f64], step: usize, sign: f64) -> Vec<f64> {
    let mut poly = vec![0.0; coefficients.len() * step + 1];
    poly[0] = 1.0;
    for (i, &c) in coefficients.iter().enumerate() {
        poly[(i + 1) * step] = sign * c;
    }
    poly
}

/// Combined AR coefficients of `(1 - phi(B))(1 - Phi(B^s))`.
///
/// The result `c` satisfies `x_t = sum(c[k-1] * x_{t-k}) + ...`.
pub fn expand_ar(ar: &[f64], seasonal_ar: &[f64], period: usize) -> Vec<f64> {
    let product = multiply(
        &lag_polynomial(ar, 1, -1.0),
        &lag_polynomial(seasonal_ar, period.max(1), -1.0),
    );
    trim(product.iter().skip(1).map(|c| -c).collect())
}

/// Combined MA coefficients of `(1 + theta(B))(1 + Theta(B^s))`.
pub fn expand_ma(ma: &[f64], seasonal_ma: &[f64], period: usize) -> Vec<f64> {
    let product = multiply(
        &lag_polynomial(ma, 1, 1.0),
        &lag_polynomial(seasonal_ma, period.max(1), 1.0),
    );
    trim(product[1..].to_vec())
}

fn trim(mut coefficients: Vec<f64>) -> Vec<f64> {
    while coefficients.last() == Some(&0.0) {
        coefficients.pop();
    }
    coefficients
}

/// Whether `1 - sum(phi_i z^i)` has all roots outside the unit circle.
///
/// Runs the Durbin-Levinson recursion backwards; the process is stationary
/// iff every partial autocorrelation is strictly inside (-1, 1).
pub fn is_stationary(ar: &[f64]) -> bool {
    let mut a = ar.to_vec();
    while let Some(&kappa) = a.last() {
        if !kappa.is_finite() || kappa.abs() >= 1.0 {
            return false;
        }
        let k = a.len();
        let denom = 1.0 - kappa * kappa;
        let reduced: Vec<f64> = (0..k - 1)
            .map(|j| (a[j] + kappa * a[k - 2 - j]) / denom)
            .collect();
        a = reduced;
    }
    true
}

/// Whether `1 + sum(theta_i z^i)` has all roots outside the unit circle.
pub fn is_invertible(ma: &[f64]) -> bool {
    let negated: Vec<f64> = ma.iter().map(|t| -t).collect();
    is_stationary(&negated)
}

/// Psi weights of the MA(infinity) representation.
///
/// `ar` uses the `x_t = sum(ar[k-1] x_{t-k})` convention. Returns
/// `psi_0..psi_{count-1}` with `psi_0 = 1`.
pub fn psi_weights(ar: &[f64], ma: &[f64], count: usize) -> Vec<f64> {
    let mut psi = Vec::with_capacity(count);
    for j in 0..count {
        if j == 0 {
            psi.push(1.0);
            continue;
        }
        let mut value = ma.get(j - 1).copied().unwrap_or(0.0);
        for (i, &a) in ar.iter().enumerate().take(j) {
            value += a * psi[j - 1 - i];
        }
        psi.push(value);
    }
    psi
}
