//! Benchmarks for routing latency across catalog sizes and request shapes.
//!
//! A routing decision is pure CPU work and should stay well under 1ms.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use switchyard::analyzer::{Message, TaskAnalyzer};
use switchyard::catalog::{ModelCatalog, ModelDefinition, Tier};
use switchyard::clock::ManualClock;
use switchyard::config::FallbackConfig;
use switchyard::cost::{Budget, CostOptimizer};
use switchyard::fallback::FallbackManager;
use switchyard::routing::{Router, RoutingPolicy};

const TIERS: [Tier; 4] = [Tier::Local, Tier::Economy, Tier::Standard, Tier::Frontier];

fn create_model(index: usize) -> ModelDefinition {
    let tier = TIERS[index % TIERS.len()];
    let price = (index % TIERS.len()) as f64 * 2.5 + index as f64 * 0.01;
    ModelDefinition {
        id: format!("model-{}", index),
        provider: format!("provider-{}", index % 7),
        tier,
        context_window: 32_768 * (1 + (index % 8) as u32),
        cost_per_1m_input: price,
        cost_per_1m_output: price * 4.0,
        supports_vision: index % 3 == 0,
        supports_tools: index % 2 == 0,
        supports_thinking: tier >= Tier::Standard,
    }
}

fn create_router(model_count: usize) -> Router {
    let catalog = ModelCatalog::new((0..model_count).map(create_model).collect()).unwrap();
    let pricing = catalog.cheapest_in_tier(Tier::Economy).unwrap().pricing();
    let clock = Arc::new(ManualClock::new());

    let cost = Arc::new(CostOptimizer::with_clock(
        Budget {
            daily: 1_000.0,
            per_request: 10.0,
        },
        pricing,
        clock.clone(),
    ));
    let fallback = Arc::new(FallbackManager::with_clock(FallbackConfig::default(), clock));

    Router::new(Arc::new(catalog), cost, RoutingPolicy::default())
        .unwrap()
        .with_fallback_manager(fallback)
}

fn bench_route_catalog_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("route_catalog_size");
    let messages = vec![Message::user("fix the failing login test")];

    for model_count in [10, 50, 200] {
        let router = create_router(model_count);
        group.bench_with_input(BenchmarkId::from_parameter(model_count), &model_count, |b, _| {
            b.iter(|| router.route(black_box(&messages), None).unwrap())
        });
    }
    group.finish();
}

fn bench_route_with_unavailable_primary(c: &mut Criterion) {
    let router = create_router(50);
    let messages = vec![Message::user("hello there")];
    let primary = router.route(&messages, None).unwrap().model;
    if let Some(manager) = router.fallback_manager() {
        manager.record_rate_limit(&primary.provider, &primary.id, None);
    }

    c.bench_function("route_unavailable_primary", |b| {
        b.iter(|| router.route(black_box(&messages), None).unwrap())
    });
}

fn bench_analyze_task(c: &mut Criterion) {
    let analyzer = TaskAnalyzer::new();
    let mut group = c.benchmark_group("analyze_task");

    let short = vec![Message::user("explain this function")];
    let code = "```rust\nfn main() {}\n```\n".repeat(8);
    let long = vec![
        Message::system("You are a careful reviewer."),
        Message::user(format!("audit the entire codebase for injection\n{}", code.repeat(50))),
    ];

    group.bench_function("short_prompt", |b| {
        b.iter(|| analyzer.analyze_task(black_box(&short), None))
    });
    group.bench_function("long_prompt", |b| {
        b.iter(|| analyzer.analyze_task(black_box(&long), None))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_route_catalog_size,
    bench_route_with_unavailable_primary,
    bench_analyze_task
);
criterion_main!(benches);
