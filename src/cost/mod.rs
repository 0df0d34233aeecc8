//! Budget enforcement and usage accounting.
//!
//! [`CostOptimizer`] gates requests against per-request and daily spending
//! caps, records actual usage reported by callers, and derives a per-model
//! cost breakdown and spending recommendations from it. Usage resets at
//! local midnight.

mod recommendations;
mod usage;

pub use recommendations::{Recommendation, RecommendationKind};
pub use usage::{CostBreakdownEntry, ModelUsage, UsageMetrics};

use crate::analyzer::{TaskAnalysis, TaskType};
use crate::catalog::{ModelDefinition, ModelPricing};
use crate::clock::{Clock, SystemClock};
use crate::config::BudgetConfig;
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

/// Spending caps in USD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub daily: f64,
    pub per_request: f64,
}

impl From<&BudgetConfig> for Budget {
    fn from(config: &BudgetConfig) -> Self {
        Self {
            daily: config.daily_limit_usd,
            per_request: config.per_request_limit_usd,
        }
    }
}

/// Result of a budget gate.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetCheck {
    pub allowed: bool,
    pub reason: Option<String>,
    /// Conservative cost estimate the decision was based on
    pub estimated_cost: f64,
}

struct Ledger {
    usage: UsageMetrics,
    next_reset: DateTime<Utc>,
}

/// Enforces spending caps and tracks usage.
///
/// All state lives behind locks owned by the instance; share it with
/// `Arc<CostOptimizer>`.
pub struct CostOptimizer {
    budget: RwLock<Budget>,
    reference_pricing: ModelPricing,
    tracking_enabled: bool,
    ledger: Mutex<Ledger>,
    clock: Arc<dyn Clock>,
}

impl CostOptimizer {
    /// Create an optimizer.
    ///
    /// `reference_pricing` is the pricing used for pre-flight budget checks,
    /// normally the economy fallback model's rates.
    pub fn new(budget: Budget, reference_pricing: ModelPricing) -> Self {
        Self::with_clock(budget, reference_pricing, Arc::new(SystemClock))
    }

    pub fn with_clock(
        budget: Budget,
        reference_pricing: ModelPricing,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let next_reset = next_local_midnight(clock.now());
        Self {
            budget: RwLock::new(budget),
            reference_pricing,
            tracking_enabled: true,
            ledger: Mutex::new(Ledger {
                usage: UsageMetrics::default(),
                next_reset,
            }),
            clock,
        }
    }

    /// Build from configuration.
    pub fn from_config(
        config: &BudgetConfig,
        reference_pricing: ModelPricing,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut optimizer = Self::with_clock(Budget::from(config), reference_pricing, clock);
        optimizer.tracking_enabled = config.tracking_enabled;
        optimizer
    }

    /// Disable or enable usage recording.
    pub fn with_tracking(mut self, enabled: bool) -> Self {
        self.tracking_enabled = enabled;
        self
    }

    pub fn budget(&self) -> Budget {
        *self.budget.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_budget(&self, budget: Budget) {
        tracing::info!(
            daily = budget.daily,
            per_request = budget.per_request,
            "CostOptimizer: budget updated"
        );
        *self.budget.write().unwrap_or_else(|e| e.into_inner()) = budget;
    }

    /// Cost in USD of the given token counts on `model`.
    pub fn estimate_cost(
        &self,
        model: &ModelDefinition,
        input_tokens: u64,
        output_tokens: u64,
    ) -> f64 {
        model.pricing().cost(input_tokens, output_tokens)
    }

    /// Gate a request against the per-request and daily caps.
    ///
    /// The per-request cap is checked first and applies regardless of how much
    /// daily budget remains.
    pub fn check_budget(&self, analysis: &TaskAnalysis) -> BudgetCheck {
        let budget = self.budget();
        let estimated_cost = self.reference_pricing.cost(
            u64::from(analysis.estimated_input_tokens),
            u64::from(analysis.estimated_output_tokens),
        );

        let spent = {
            let mut ledger = self.lock_ledger();
            self.maybe_reset(&mut ledger);
            ledger.usage.total_cost
        };

        let denial = if estimated_cost > budget.per_request {
            Some(format!(
                "estimated cost ${:.4} exceeds per-request limit ${:.4}",
                estimated_cost, budget.per_request
            ))
        } else if spent + estimated_cost > budget.daily {
            Some(format!(
                "daily limit ${:.2} reached (${:.4} spent, ${:.4} requested)",
                budget.daily, spent, estimated_cost
            ))
        } else {
            None
        };

        match denial {
            Some(reason) => {
                tracing::warn!(
                    estimated_cost,
                    spent,
                    daily = budget.daily,
                    per_request = budget.per_request,
                    reason = %reason,
                    "CostOptimizer: budget check denied"
                );
                metrics::counter!("switchyard_budget_denials_total").increment(1);
                BudgetCheck {
                    allowed: false,
                    reason: Some(reason),
                    estimated_cost,
                }
            }
            None => BudgetCheck {
                allowed: true,
                reason: None,
                estimated_cost,
            },
        }
    }

    /// Record actual usage of a completed request.
    ///
    /// No-op when tracking is disabled.
    pub fn record_usage(
        &self,
        model: &ModelDefinition,
        input_tokens: u64,
        output_tokens: u64,
        task_type: TaskType,
    ) {
        if !self.tracking_enabled {
            return;
        }

        let cost = self.estimate_cost(model, input_tokens, output_tokens);
        {
            let mut ledger = self.lock_ledger();
            self.maybe_reset(&mut ledger);
            ledger
                .usage
                .record(&model.id, model.tier, input_tokens + output_tokens, cost, task_type);
        }

        metrics::counter!("switchyard_usage_tokens_total", "model" => model.id.clone())
            .increment(input_tokens + output_tokens);
        metrics::histogram!("switchyard_usage_cost_usd", "model" => model.id.clone()).record(cost);

        tracing::debug!(
            model = %model.id,
            input_tokens,
            output_tokens,
            cost,
            task_type = %task_type,
            "CostOptimizer: recorded usage"
        );
    }

    /// Snapshot of usage since the last reset.
    pub fn usage(&self) -> UsageMetrics {
        let mut ledger = self.lock_ledger();
        self.maybe_reset(&mut ledger);
        ledger.usage.clone()
    }

    /// Daily budget not yet spent (never negative).
    pub fn remaining_daily_budget(&self) -> f64 {
        let spent = self.usage().total_cost;
        (self.budget().daily - spent).max(0.0)
    }

    /// When usage will next be cleared.
    pub fn next_reset(&self) -> DateTime<Utc> {
        self.lock_ledger().next_reset
    }

    /// Clear usage immediately.
    pub fn reset_usage(&self) {
        let mut ledger = self.lock_ledger();
        ledger.usage = UsageMetrics::default();
        ledger.next_reset = next_local_midnight(self.clock.now());
    }

    /// Per-model spend, most expensive first.
    pub fn get_cost_breakdown(&self) -> Vec<CostBreakdownEntry> {
        let usage = self.usage();
        let total = usage.total_cost;

        let mut breakdown: Vec<CostBreakdownEntry> = usage
            .by_model
            .into_iter()
            .map(|(model, entry)| CostBreakdownEntry {
                percentage: if total > 0.0 {
                    entry.cost / total * 100.0
                } else {
                    0.0
                },
                model,
                tier: entry.tier,
                requests: entry.requests,
                tokens: entry.tokens,
                cost: entry.cost,
            })
            .collect();

        breakdown.sort_by(|a, b| b.cost.total_cmp(&a.cost).then_with(|| a.model.cmp(&b.model)));
        breakdown
    }

    /// Heuristic suggestions for reducing spend.
    pub fn get_recommendations(&self) -> Vec<Recommendation> {
        recommendations::recommend(&self.usage())
    }

    fn lock_ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn maybe_reset(&self, ledger: &mut Ledger) {
        let now = self.clock.now();
        if now >= ledger.next_reset {
            tracing::info!(
                previous_cost = ledger.usage.total_cost,
                previous_requests = ledger.usage.total_requests,
                "Usage reset: new day started"
            );
            metrics::counter!("switchyard_usage_resets_total").increment(1);
            ledger.usage = UsageMetrics::default();
            ledger.next_reset = next_local_midnight(now);
        }
    }
}

/// First local midnight strictly after `now`.
fn next_local_midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    now.with_timezone(&Local)
        .date_naive()
        .succ_opt()
        .and_then(|tomorrow| tomorrow.and_hms_opt(0, 0, 0))
        .and_then(|midnight| Local.from_local_datetime(&midnight).earliest())
        .map(|midnight| midnight.with_timezone(&Utc))
        .unwrap_or_else(|| now + Duration::days(1))
}
