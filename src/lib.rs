//! Switchyard - adaptive, cost-aware LLM model routing
//!
//! Given a conversation, the [`Router`](routing::Router) classifies the task,
//! checks it against spending caps, and picks the cheapest model in a tiered
//! catalog that can handle it, together with an ordered fallback chain.
//! Callers execute the provider call themselves and report outcomes back to
//! the [`FallbackManager`](fallback::FallbackManager) and
//! [`CostOptimizer`](cost::CostOptimizer).

pub mod analyzer;
pub mod catalog;
pub mod cli;
pub mod clock;
pub mod config;
pub mod cost;
pub mod fallback;
pub mod logging;
pub mod routing;
