//! Text summary of a fitted seasonal ARIMA model.

use std::fmt;

use crate::models::arima::order::ModelOrder;

const WIDTH: usize = 78;

/// Fit statistics and coefficients of a fitted model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSummary {
    /// Fitted order.
    pub order: ModelOrder,
    /// Number of observations the model was fitted on.
    pub n_obs: usize,
    /// Named coefficients (`intercept`, `ar.L1`, `ma.S.L12`, ...).
    pub coefficients: Vec<(String, f64)>,
    /// Innovation variance.
    pub sigma2: f64,
    /// Gaussian log-likelihood.
    pub log_likelihood: f64,
    /// Akaike information criterion.
    pub aic: f64,
    /// Bayesian information criterion.
    pub bic: f64,
}

impl ModelSummary {
    /// Look up a coefficient by name.
    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.coefficients
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heavy = "=".repeat(WIDTH);
        let light = "-".repeat(WIDTH);

        writeln!(f, "{:^width$}", "SARIMAX Results", width = WIDTH)?;
        writeln!(f, "{heavy}")?;
        writeln!(
            f,
            "{:<21}{:>20}   {:<21}{:>13}",
            "Model:",
            self.order.to_string(),
            "No. Observations:",
            self.n_obs
        )?;
        writeln!(
            f,
            "{:<21}{:>20.3}   {:<21}{:>13.3}",
            "Log Likelihood", self.log_likelihood, "AIC", self.aic
        )?;
        writeln!(
            f,
            "{:<21}{:>20.3}   {:<21}{:>13.3}",
            "sigma2", self.sigma2, "BIC", self.bic
        )?;
        writeln!(f, "{light}")?;
        writeln!(f, "{:<16}{:>10}", "", "coef")?;
        for (name, value) in &self.coefficients {
            writeln!(f, "{:<16}{:>10.4}", name, value)?;
        }
        write!(f, "{heavy}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ModelSummary {
        ModelSummary {
            order: ModelOrder::seasonal(1, 1, 1, 0, 1, 1, 12),
            n_obs: 48,
            coefficients: vec![
                ("ar.L1".to_string(), 0.4321),
                ("ma.L1".to_string(), -0.21),
                ("ma.S.L12".to_string(), -0.5),
            ],
            sigma2: 4.321,
            log_likelihood: -123.456,
            aic: 254.912,
            bic: 262.345,
        }
    }

    #[test]
    fn summary_contains_fit_statistics() {
        let text = sample().to_string();
        assert!(text.contains("SARIMAX Results"));
        assert!(text.contains("SARIMA(1,1,1)(0,1,1)[12]"));
        assert!(text.contains("No. Observations:"));
        assert!(text.contains("48"));
        assert!(text.contains("-123.456"));
        assert!(text.contains("254.912"));
        assert!(text.contains("262.345"));
        assert!(text.contains("ma.S.L12"));
        assert!(text.contains("-0.5000"));
    }

    #[test]
    fn coefficient_lookup() {
        let summary = sample();
        assert_eq!(summary.coefficient("ar.L1"), Some(0.4321));
        assert_eq!(summary.coefficient("intercept"), None);
    }
}
