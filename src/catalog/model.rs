use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Capability/cost classification of a model.
///
/// Variants are declared in ascending capability order, so the derived
/// `Ord` ranks `Local < Economy < Standard < Frontier`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Runs on the caller's own hardware; zero marginal cost
    Local,
    /// Cheapest hosted models
    Economy,
    /// General-purpose hosted models
    Standard,
    /// Most capable (and most expensive) hosted models
    Frontier,
}

impl Tier {
    /// Baseline latency estimate before output generation, in milliseconds.
    pub fn base_latency_ms(&self) -> u64 {
        match self {
            Tier::Frontier => 2000,
            Tier::Standard => 1000,
            Tier::Economy => 500,
            Tier::Local => 300,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Local => "local",
            Tier::Economy => "economy",
            Tier::Standard => "standard",
            Tier::Frontier => "frontier",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Tier::Local),
            "economy" => Ok(Tier::Economy),
            "standard" => Ok(Tier::Standard),
            "frontier" => Ok(Tier::Frontier),
            _ => Err(format!("Unknown tier: {}", s)),
        }
    }
}

/// Pricing for input/output tokens
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    /// Price per 1M input tokens (USD)
    pub input_cost_per_million: f64,
    /// Price per 1M output tokens (USD)
    pub output_cost_per_million: f64,
}

impl ModelPricing {
    /// Zero-cost pricing for local models
    pub const LOCAL: ModelPricing = ModelPricing {
        input_cost_per_million: 0.0,
        output_cost_per_million: 0.0,
    };

    /// Cost in USD of the given token counts at this pricing.
    pub fn cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        (input_tokens as f64 / 1_000_000.0) * self.input_cost_per_million
            + (output_tokens as f64 / 1_000_000.0) * self.output_cost_per_million
    }
}

/// A model entry in the catalog.
///
/// Catalog entries are immutable once loaded; the router only ever reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDefinition {
    /// Unique model identifier (e.g., "claude-sonnet-4")
    pub id: String,
    /// Provider serving the model (e.g., "anthropic", "ollama")
    pub provider: String,
    /// Capability/cost tier
    pub tier: Tier,
    /// Maximum context window in tokens
    pub context_window: u32,
    /// Price per 1M input tokens (USD)
    pub cost_per_1m_input: f64,
    /// Price per 1M output tokens (USD)
    pub cost_per_1m_output: f64,
    /// Accepts image inputs
    #[serde(default)]
    pub supports_vision: bool,
    /// Supports function/tool calling
    #[serde(default)]
    pub supports_tools: bool,
    /// Supports extended reasoning
    #[serde(default)]
    pub supports_thinking: bool,
}

impl ModelDefinition {
    /// Key used for per-endpoint availability tracking.
    pub fn key(&self) -> String {
        endpoint_key(&self.provider, &self.id)
    }

    pub fn pricing(&self) -> ModelPricing {
        ModelPricing {
            input_cost_per_million: self.cost_per_1m_input,
            output_cost_per_million: self.cost_per_1m_output,
        }
    }
}

/// Builds the `provider:model` key shared by availability tracking.
pub fn endpoint_key(provider: &str, model: &str) -> String {
    format!("{}:{}", provider, model)
}
