//! Routing policy configuration

use serde::{Deserialize, Serialize};

/// Router preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Route eligible tasks to local models
    pub prefer_local: bool,

    /// Route non-frontier tasks to the fastest economy model
    pub prefer_speed: bool,

    /// Model used when the budget gate denies a request.
    /// Defaults to the cheapest economy model in the catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub economy_model: Option<String>,

    /// Maximum number of fallbacks attached to a decision
    pub max_fallbacks: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            prefer_local: false,
            prefer_speed: false,
            economy_model: None,
            max_fallbacks: 3,
        }
    }
}

impl RoutingConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_fallbacks == 0 {
            return Err("max_fallbacks must be at least 1".to_string());
        }
        if matches!(&self.economy_model, Some(id) if id.trim().is_empty()) {
            return Err("economy_model cannot be empty".to_string());
        }
        Ok(())
    }
}
