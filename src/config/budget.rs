//! Budget configuration

use serde::{Deserialize, Serialize};

/// Spending caps and usage tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Daily spending limit in USD, reset at local midnight
    pub daily_limit_usd: f64,

    /// Maximum estimated cost of a single request in USD
    pub per_request_limit_usd: f64,

    /// Record usage reported by callers
    pub tracking_enabled: bool,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            daily_limit_usd: 10.0,
            per_request_limit_usd: 0.50,
            tracking_enabled: true,
        }
    }
}

impl BudgetConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.daily_limit_usd.is_finite() || self.daily_limit_usd < 0.0 {
            return Err("daily_limit_usd must be a finite value >= 0.0".to_string());
        }
        if !self.per_request_limit_usd.is_finite() || self.per_request_limit_usd < 0.0 {
            return Err("per_request_limit_usd must be a finite value >= 0.0".to_string());
        }
        if self.per_request_limit_usd > self.daily_limit_usd {
            return Err("per_request_limit_usd cannot exceed daily_limit_usd".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BudgetConfig::default();
        assert_eq!(config.daily_limit_usd, 10.0);
        assert_eq!(config.per_request_limit_usd, 0.50);
        assert!(config.tracking_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_negative_and_non_finite_limits() {
        let negative = BudgetConfig {
            daily_limit_usd: -1.0,
            ..Default::default()
        };
        assert!(negative.validate().is_err());

        let nan = BudgetConfig {
            per_request_limit_usd: f64::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_rejects_per_request_above_daily() {
        let config = BudgetConfig {
            daily_limit_usd: 1.0,
            per_request_limit_usd: 2.0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("per_request_limit_usd"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: BudgetConfig = toml::from_str("daily_limit_usd = 25.0").unwrap();
        assert_eq!(config.daily_limit_usd, 25.0);
        assert_eq!(config.per_request_limit_usd, 0.50);
    }
}
