//! Layered configuration.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`SWITCHYARD_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use switchyard::config::SwitchyardConfig;
//!
//! let config = SwitchyardConfig::default();
//! assert_eq!(config.budget.daily_limit_usd, 10.0);
//!
//! let toml = r#"
//! [routing]
//! prefer_local = true
//! "#;
//! let config: SwitchyardConfig = toml::from_str(toml).unwrap();
//! assert!(config.routing.prefer_local);
//! assert_eq!(config.routing.max_fallbacks, 3);
//! ```

pub mod budget;
pub mod error;
pub mod fallback;
pub mod logging;
pub mod routing;

pub use budget::BudgetConfig;
pub use error::ConfigError;
pub use fallback::FallbackConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use routing::RoutingConfig;

use crate::catalog::{CatalogError, ModelCatalog, ModelDefinition};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified router configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SwitchyardConfig {
    /// Spending caps
    pub budget: BudgetConfig,
    /// Router preferences
    pub routing: RoutingConfig,
    /// Failure and rate-limit tracking
    pub fallback: FallbackConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Model catalog. Empty means the built-in catalog.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<ModelDefinition>,
}

impl SwitchyardConfig {
    /// Load configuration from a TOML file.
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply `SWITCHYARD_*` environment variable overrides.
    ///
    /// Unparseable values are ignored and the current value is kept.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(level) = var("SWITCHYARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("SWITCHYARD_LOG_FORMAT").and_then(|f| f.parse().ok()) {
            self.logging.format = format;
        }

        if let Some(prefer_local) = var("SWITCHYARD_PREFER_LOCAL").and_then(|v| parse_flag(&v)) {
            self.routing.prefer_local = prefer_local;
        }
        if let Some(prefer_speed) = var("SWITCHYARD_PREFER_SPEED").and_then(|v| parse_flag(&v)) {
            self.routing.prefer_speed = prefer_speed;
        }

        if let Some(daily) = var("SWITCHYARD_DAILY_BUDGET").and_then(|v| v.parse().ok()) {
            self.budget.daily_limit_usd = daily;
        }
        if let Some(per_request) =
            var("SWITCHYARD_PER_REQUEST_BUDGET").and_then(|v| v.parse().ok())
        {
            self.budget.per_request_limit_usd = per_request;
        }

        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.budget
            .validate()
            .map_err(|message| ConfigError::validation("budget", message))?;
        self.routing
            .validate()
            .map_err(|message| ConfigError::validation("routing", message))?;
        self.fallback
            .validate()
            .map_err(|message| ConfigError::validation("fallback", message))?;

        let catalog = self.catalog()?;
        if let Some(id) = &self.routing.economy_model {
            if catalog.get(id).is_none() {
                return Err(ConfigError::validation(
                    "routing.economy_model",
                    format!("model '{}' is not in the catalog", id),
                ));
            }
        }

        Ok(())
    }

    /// The configured catalog, or the built-in one when none is configured.
    pub fn catalog(&self) -> Result<ModelCatalog, CatalogError> {
        if self.models.is_empty() {
            Ok(ModelCatalog::builtin())
        } else {
            ModelCatalog::new(self.models.clone())
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
