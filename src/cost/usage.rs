//! Usage counters accumulated by the cost optimizer

use crate::analyzer::TaskType;
use crate::catalog::Tier;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Per-model usage totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelUsage {
    pub tier: Tier,
    pub requests: u64,
    pub tokens: u64,
    pub cost: f64,
}

/// Usage since the last daily reset.
///
/// Monotonically increasing within a day; cleared at local midnight.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsageMetrics {
    pub total_requests: u64,
    pub total_tokens: u64,
    pub total_cost: f64,
    pub by_model: BTreeMap<String, ModelUsage>,
    pub by_task_type: HashMap<TaskType, u64>,
}

impl UsageMetrics {
    pub(crate) fn record(
        &mut self,
        model: &str,
        tier: Tier,
        tokens: u64,
        cost: f64,
        task_type: TaskType,
    ) {
        self.total_requests += 1;
        self.total_tokens += tokens;
        self.total_cost += cost;

        let entry = self.by_model.entry(model.to_string()).or_insert(ModelUsage {
            tier,
            requests: 0,
            tokens: 0,
            cost: 0.0,
        });
        entry.requests += 1;
        entry.tokens += tokens;
        entry.cost += cost;

        *self.by_task_type.entry(task_type).or_insert(0) += 1;
    }

    /// Spend on models in the given tier.
    pub fn cost_in_tier(&self, tier: Tier) -> f64 {
        self.by_model
            .values()
            .filter(|usage| usage.tier == tier)
            .map(|usage| usage.cost)
            .sum()
    }

    pub fn requests_for(&self, task_type: TaskType) -> u64 {
        self.by_task_type.get(&task_type).copied().unwrap_or(0)
    }
}

/// One row of the per-model cost breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostBreakdownEntry {
    pub model: String,
    pub tier: Tier,
    pub requests: u64,
    pub tokens: u64,
    pub cost: f64,
    /// Share of total cost, 0-100
    pub percentage: f64,
}
