//! Budget tracking across a simulated day of traffic.

mod common;

use common::*;
use switchyard::analyzer::{Complexity, TaskType};
use switchyard::catalog::{ModelCatalog, Tier};
use switchyard::clock::ManualClock;
use switchyard::cost::{Budget, RecommendationKind};

fn builtin(id: &str) -> switchyard::catalog::ModelDefinition {
    ModelCatalog::builtin().get(id).cloned().unwrap()
}

#[test]
fn test_breakdown_orders_by_spend() {
    let catalog = ModelCatalog::builtin();
    let clock = ManualClock::new();
    let cost = make_cost_optimizer(&catalog, DEFAULT_BUDGET, &clock);

    cost.record_usage(&builtin("gpt-4o-mini"), 10_000, 1_000, TaskType::Chat);
    cost.record_usage(&builtin("claude-sonnet-4"), 10_000, 1_000, TaskType::Refactor);
    cost.record_usage(&builtin("claude-opus-4"), 10_000, 1_000, TaskType::Architecture);
    cost.record_usage(&builtin("qwen2.5-coder:32b"), 10_000, 1_000, TaskType::Edit);

    let breakdown = cost.get_cost_breakdown();
    let ids: Vec<&str> = breakdown.iter().map(|e| e.model.as_str()).collect();
    assert_eq!(ids, ["claude-opus-4", "claude-sonnet-4", "gpt-4o-mini", "qwen2.5-coder:32b"]);

    let local = breakdown.last().unwrap();
    assert_eq!(local.tier, Tier::Local);
    assert_eq!(local.cost, 0.0);
    assert_eq!(local.percentage, 0.0);
    assert_eq!(local.tokens, 11_000);

    let total: f64 = breakdown.iter().map(|e| e.percentage).sum();
    assert!((total - 100.0).abs() < 1e-9);
}

#[test]
fn test_remaining_budget_tracks_spend_and_floors_at_zero() {
    let catalog = ModelCatalog::builtin();
    let clock = ManualClock::new();
    let cost = make_cost_optimizer(
        &catalog,
        Budget {
            daily: 2.0,
            per_request: 1.0,
        },
        &clock,
    );

    // 500k input tokens on sonnet: $1.50
    cost.record_usage(&builtin("claude-sonnet-4"), 500_000, 0, TaskType::Chat);
    assert!((cost.remaining_daily_budget() - 0.5).abs() < 1e-9);

    cost.record_usage(&builtin("claude-sonnet-4"), 500_000, 0, TaskType::Chat);
    assert_eq!(cost.remaining_daily_budget(), 0.0);

    let check = cost.check_budget(&make_analysis(Complexity::Simple, 100, 100));
    assert!(!check.allowed);
    assert!(check.reason.unwrap().contains("daily limit"));
}

#[test]
fn test_per_request_cap_applies_with_budget_to_spare() {
    let catalog = ModelCatalog::builtin();
    let clock = ManualClock::new();
    let cost = make_cost_optimizer(
        &catalog,
        Budget {
            daily: 1000.0,
            per_request: 0.001,
        },
        &clock,
    );

    // 20k tokens at economy reference pricing is above a tenth of a cent
    let check = cost.check_budget(&make_analysis(Complexity::Moderate, 10_000, 10_000));
    assert!(!check.allowed);
    assert!(check.estimated_cost > 0.001);
    assert!(check.reason.unwrap().contains("per-request limit"));
}

#[test]
fn test_usage_clears_at_local_midnight() {
    let catalog = ModelCatalog::builtin();
    let clock = ManualClock::new();
    let cost = make_cost_optimizer(&catalog, DEFAULT_BUDGET, &clock);

    cost.record_usage(&builtin("gpt-4o"), 1_000, 1_000, TaskType::Chat);
    let reset_at = cost.next_reset();
    assert!(reset_at > clock_now(&clock));

    clock.set(reset_at - chrono::Duration::seconds(1));
    assert_eq!(cost.usage().total_requests, 1);

    clock.set(reset_at);
    assert_eq!(cost.usage().total_requests, 0);
    assert!(cost.next_reset() > reset_at);
}

#[test]
fn test_set_budget_takes_effect_immediately() {
    let catalog = ModelCatalog::builtin();
    let clock = ManualClock::new();
    let cost = make_cost_optimizer(&catalog, DEFAULT_BUDGET, &clock);
    let analysis = make_analysis(Complexity::Simple, 1_000, 500);

    assert!(cost.check_budget(&analysis).allowed);
    cost.set_budget(Budget {
        daily: 0.0,
        per_request: 0.0,
    });
    assert!(!cost.check_budget(&analysis).allowed);
}

#[test]
fn test_recommendations_reflect_usage_mix() {
    let catalog = ModelCatalog::builtin();
    let clock = ManualClock::new();
    let cost = make_cost_optimizer(&catalog, DEFAULT_BUDGET, &clock);
    assert!(cost.get_recommendations().is_empty());

    cost.record_usage(&builtin("claude-opus-4"), 600_000, 500_000, TaskType::Debug);
    cost.record_usage(&builtin("gpt-4o-mini"), 1_000, 100, TaskType::Chat);

    let kinds: Vec<RecommendationKind> =
        cost.get_recommendations().into_iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![
            RecommendationKind::DowngradeFrontier,
            RecommendationKind::TruncateContext,
            RecommendationKind::ImproveCodeQuality,
        ]
    );
}

#[test]
fn test_disabled_tracking_records_nothing() {
    let catalog = ModelCatalog::builtin();
    let cost = switchyard::cost::CostOptimizer::new(DEFAULT_BUDGET, economy_pricing(&catalog))
        .with_tracking(false);
    cost.record_usage(&builtin("claude-opus-4"), 1_000_000, 0, TaskType::Chat);

    assert_eq!(cost.usage().total_requests, 0);
    assert_eq!(cost.remaining_daily_budget(), DEFAULT_BUDGET.daily);
}

fn clock_now(clock: &ManualClock) -> chrono::DateTime<chrono::Utc> {
    use switchyard::clock::Clock;
    clock.now()
}
