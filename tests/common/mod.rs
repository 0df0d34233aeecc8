//! Shared test utilities for Switchyard integration tests.
//!
//! Builders for models, catalogs, routers and analyses so individual test
//! files only spell out what they care about.

#![allow(dead_code)]

use std::sync::Arc;
use switchyard::analyzer::{Complexity, TaskAnalysis, TaskType};
use switchyard::catalog::{ModelCatalog, ModelDefinition, Tier};
use switchyard::clock::ManualClock;
use switchyard::config::FallbackConfig;
use switchyard::cost::{Budget, CostOptimizer};
use switchyard::fallback::FallbackManager;
use switchyard::routing::{Router, RoutingPolicy};

// =============================================================================
// Well-Known Test Constants
// =============================================================================

/// UUID v4 string length: "xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx"
pub const UUID_V4_STRING_LEN: usize = 36;

pub const DEFAULT_BUDGET: Budget = Budget {
    daily: 10.0,
    per_request: 0.50,
};

// =============================================================================
// Model Builders
// =============================================================================

/// Model with every capability and a 128k window.
pub fn make_model(
    id: &str,
    provider: &str,
    tier: Tier,
    input: f64,
    output: f64,
) -> ModelDefinition {
    ModelDefinition {
        id: id.to_string(),
        provider: provider.to_string(),
        tier,
        context_window: 128_000,
        cost_per_1m_input: input,
        cost_per_1m_output: output,
        supports_vision: true,
        supports_tools: true,
        supports_thinking: true,
    }
}

/// Model with no optional capabilities.
pub fn make_plain_model(id: &str, provider: &str, tier: Tier) -> ModelDefinition {
    ModelDefinition {
        supports_vision: false,
        supports_tools: false,
        supports_thinking: false,
        ..make_model(id, provider, tier, 1.0, 1.0)
    }
}

// =============================================================================
// Analysis Builders
// =============================================================================

pub fn make_analysis(complexity: Complexity, input: u32, output: u32) -> TaskAnalysis {
    TaskAnalysis {
        complexity,
        task_type: TaskType::Chat,
        estimated_input_tokens: input,
        estimated_output_tokens: output,
        requires_vision: false,
        requires_tools: false,
        requires_thinking: false,
        requires_large_context: false,
        context_tokens: input + output,
    }
}

// =============================================================================
// Component Builders
// =============================================================================

pub fn economy_pricing(catalog: &ModelCatalog) -> switchyard::catalog::ModelPricing {
    catalog
        .cheapest_in_tier(Tier::Economy)
        .map(|m| m.pricing())
        .expect("catalog has an economy model")
}

pub fn make_cost_optimizer(
    catalog: &ModelCatalog,
    budget: Budget,
    clock: &ManualClock,
) -> Arc<CostOptimizer> {
    Arc::new(CostOptimizer::with_clock(
        budget,
        economy_pricing(catalog),
        Arc::new(clock.clone()),
    ))
}

pub fn make_fallback_manager(clock: &ManualClock) -> Arc<FallbackManager> {
    Arc::new(FallbackManager::with_clock(
        FallbackConfig::default(),
        Arc::new(clock.clone()),
    ))
}

/// Everything a router test needs to poke at.
pub struct Harness {
    pub router: Router,
    pub cost: Arc<CostOptimizer>,
    pub fallback: Arc<FallbackManager>,
    pub clock: ManualClock,
}

pub fn make_harness(policy: RoutingPolicy, budget: Budget) -> Harness {
    make_harness_with_catalog(ModelCatalog::builtin(), policy, budget)
}

pub fn make_harness_with_catalog(
    catalog: ModelCatalog,
    policy: RoutingPolicy,
    budget: Budget,
) -> Harness {
    let clock = ManualClock::new();
    let cost = make_cost_optimizer(&catalog, budget, &clock);
    let fallback = make_fallback_manager(&clock);
    let router = Router::new(Arc::new(catalog), Arc::clone(&cost), policy)
        .expect("router builds")
        .with_fallback_manager(Arc::clone(&fallback));

    Harness {
        router,
        cost,
        fallback,
        clock,
    }
}

pub fn default_harness() -> Harness {
    make_harness(RoutingPolicy::default(), DEFAULT_BUDGET)
}
