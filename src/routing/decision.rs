//! Routing decision returned to callers

use crate::analyzer::TaskAnalysis;
use crate::catalog::{ModelDefinition, Tier};
use serde::Serialize;

/// Outcome of one `Router::route` call.
#[derive(Debug, Clone, Serialize)]
pub struct RoutingDecision {
    /// Correlation id for logs and outcome reporting
    pub request_id: String,

    /// Chosen model
    pub model: ModelDefinition,

    /// Provider of the chosen model
    pub provider: String,

    /// Human-readable explanation of the choice
    pub reason: String,

    /// Estimated cost in USD on the chosen model
    pub estimated_cost: f64,

    /// Estimated latency in milliseconds
    pub estimated_latency_ms: u64,

    /// Ordered alternatives to try if the chosen model fails
    pub fallbacks: Vec<ModelDefinition>,

    /// Confidence in the match between request and model (0.0-1.0)
    pub confidence: f64,

    /// True when the budget gate forced the economy model
    pub budget_limited: bool,

    /// Tier floor the request needed but no eligible model reached.
    /// `None` when the floor was met or a policy override chose the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded_from: Option<Tier>,

    /// Classification the decision was made from
    pub analysis: TaskAnalysis,
}

impl RoutingDecision {
    /// Chosen model followed by its fallbacks, ready for fallback execution.
    pub fn candidates(&self) -> Vec<ModelDefinition> {
        let mut candidates = Vec::with_capacity(self.fallbacks.len() + 1);
        candidates.push(self.model.clone());
        candidates.extend(self.fallbacks.iter().cloned());
        candidates
    }
}
