//! Request routing.
//!
//! [`Router`] ties the pipeline together: classify the request, gate it
//! against the budget, pick a model through the tier cascade, apply policy
//! overrides, and attach a fallback chain filtered by endpoint availability.

pub mod cascade;
mod decision;
pub mod error;

pub use cascade::{capability_gaps, minimum_tier, satisfies, ModelCascade, DEFAULT_MAX_FALLBACKS};
pub use decision::RoutingDecision;
pub use error::RoutingError;

use crate::analyzer::{
    Complexity, Message, TaskAnalysis, TaskAnalyzer, TaskType, LARGE_CONTEXT_TOKENS,
};
use crate::catalog::{ModelCatalog, ModelDefinition, Tier};
use crate::clock::{Clock, SystemClock};
use crate::config::{RoutingConfig, SwitchyardConfig};
use crate::cost::CostOptimizer;
use crate::fallback::FallbackManager;
use std::sync::Arc;
use uuid::Uuid;

/// Output tokens are assumed to stream at this many milliseconds each.
const MS_PER_OUTPUT_TOKEN: u64 = 10;

/// Confidence reported when the budget forced a model that lacks a required capability.
const MISMATCH_CONFIDENCE: f64 = 0.5;

/// Routing preferences applied on top of the cascade.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingPolicy {
    pub prefer_local: bool,
    pub prefer_speed: bool,
    pub max_fallbacks: usize,
    /// Budget fallback model id; the cheapest economy model when unset
    pub economy_model: Option<String>,
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        Self {
            prefer_local: false,
            prefer_speed: false,
            max_fallbacks: DEFAULT_MAX_FALLBACKS,
            economy_model: None,
        }
    }
}

impl From<&RoutingConfig> for RoutingPolicy {
    fn from(config: &RoutingConfig) -> Self {
        Self {
            prefer_local: config.prefer_local,
            prefer_speed: config.prefer_speed,
            max_fallbacks: config.max_fallbacks,
            economy_model: config.economy_model.clone(),
        }
    }
}

/// Which step of the pipeline chose the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReasonKind {
    Budget,
    Local,
    Speed,
    Cascade,
}

impl ReasonKind {
    fn as_str(&self) -> &'static str {
        match self {
            ReasonKind::Budget => "budget",
            ReasonKind::Local => "local",
            ReasonKind::Speed => "speed",
            ReasonKind::Cascade => "cascade",
        }
    }
}

/// Chooses a model for each request.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use switchyard::analyzer::Message;
/// use switchyard::catalog::{ModelCatalog, Tier};
/// use switchyard::cost::{Budget, CostOptimizer};
/// use switchyard::routing::{Router, RoutingPolicy};
///
/// let catalog = Arc::new(ModelCatalog::builtin());
/// let economy = catalog.cheapest_in_tier(Tier::Economy).unwrap().pricing();
/// let cost = Arc::new(CostOptimizer::new(Budget { daily: 10.0, per_request: 0.5 }, economy));
/// let router = Router::new(catalog, cost, RoutingPolicy::default()).unwrap();
///
/// let decision = router.route(&[Message::user("explain this function")], None).unwrap();
/// assert_eq!(decision.model.tier, Tier::Economy);
/// ```
pub struct Router {
    analyzer: TaskAnalyzer,
    cascade: ModelCascade,
    cost: Arc<CostOptimizer>,
    fallback: Option<Arc<FallbackManager>>,
    policy: RoutingPolicy,
    economy_model: ModelDefinition,
}

impl Router {
    /// Create a router without availability tracking.
    ///
    /// # Errors
    ///
    /// `RoutingError::EconomyModelNotFound` if the policy names a budget
    /// fallback model missing from the catalog, `RoutingError::NoEconomyTier`
    /// if none is named and the catalog has no economy model.
    pub fn new(
        catalog: Arc<ModelCatalog>,
        cost: Arc<CostOptimizer>,
        policy: RoutingPolicy,
    ) -> Result<Self, RoutingError> {
        let economy_model = resolve_economy_model(&catalog, &policy)?;
        let cascade = ModelCascade::with_max_fallbacks(catalog, policy.max_fallbacks);

        Ok(Self {
            analyzer: TaskAnalyzer::new(),
            cascade,
            cost,
            fallback: None,
            policy,
            economy_model,
        })
    }

    /// Consult `fallback` for endpoint availability when routing.
    pub fn with_fallback_manager(mut self, fallback: Arc<FallbackManager>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Build a router, cost optimizer and fallback manager from configuration.
    pub fn from_config(config: &SwitchyardConfig) -> Result<Self, RoutingError> {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    pub fn from_config_with_clock(
        config: &SwitchyardConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, RoutingError> {
        let catalog = Arc::new(config.catalog()?);
        let policy = RoutingPolicy::from(&config.routing);
        let economy_model = resolve_economy_model(&catalog, &policy)?;

        let cost = Arc::new(CostOptimizer::from_config(
            &config.budget,
            economy_model.pricing(),
            Arc::clone(&clock),
        ));
        let fallback = Arc::new(FallbackManager::with_clock(config.fallback.clone(), clock));

        Ok(Self::new(catalog, cost, policy)?.with_fallback_manager(fallback))
    }

    pub fn analyzer(&self) -> &TaskAnalyzer {
        &self.analyzer
    }

    pub fn cascade(&self) -> &ModelCascade {
        &self.cascade
    }

    pub fn catalog(&self) -> &ModelCatalog {
        self.cascade.catalog()
    }

    pub fn cost_optimizer(&self) -> &Arc<CostOptimizer> {
        &self.cost
    }

    pub fn fallback_manager(&self) -> Option<&Arc<FallbackManager>> {
        self.fallback.as_ref()
    }

    pub fn policy(&self) -> &RoutingPolicy {
        &self.policy
    }

    /// Model used when the budget gate denies a request.
    pub fn economy_model(&self) -> &ModelDefinition {
        &self.economy_model
    }

    /// Route a request.
    ///
    /// A denied budget check is not an error: the decision falls back to the
    /// economy model and is flagged `budget_limited`.
    ///
    /// # Errors
    ///
    /// `RoutingError::NoEligibleModel` when no catalog model satisfies the
    /// request's hard capability requirements.
    pub fn route(
        &self,
        messages: &[Message],
        task_type: Option<TaskType>,
    ) -> Result<RoutingDecision, RoutingError> {
        let request_id = Uuid::new_v4().to_string();
        let span = tracing::debug_span!("route", request_id = %request_id);
        let _guard = span.enter();

        let analysis = self.analyzer.analyze_task(messages, task_type);

        let budget = self.cost.check_budget(&analysis);
        if !budget.allowed {
            let reason = budget.reason.unwrap_or_else(|| "budget exceeded".to_string());
            return Ok(self.budget_limited_decision(request_id, analysis, &reason));
        }

        let cascade_choice = self.cascade.select_model(&analysis)?;

        let (mut model, mut reason, kind) = if let Some(local) = self.local_override(&analysis) {
            tracing::info!(model = %local.id, "Router: local preference override");
            (local, "Local preference enabled".to_string(), ReasonKind::Local)
        } else if let Some(fast) = self.speed_override(&analysis) {
            tracing::info!(model = %fast.id, "Router: speed preference override");
            (fast, "Speed preference enabled".to_string(), ReasonKind::Speed)
        } else {
            let reason = contextual_reason(&cascade_choice, &analysis);
            (cascade_choice, reason, ReasonKind::Cascade)
        };

        let floor = minimum_tier(analysis.complexity);
        let selected_tier = model.tier;

        let mut fallbacks = self.cascade.get_fallbacks(&model, &analysis);
        if let Some(promoted) = self.promote_available(&model, &mut fallbacks) {
            reason = format!("{}; primary {} unavailable", reason, model.id);
            model = promoted;
        }

        let degraded_from = (kind == ReasonKind::Cascade && model.tier < floor).then_some(floor);
        if degraded_from.is_some() && selected_tier >= floor {
            reason = format!("{}; degraded to {} tier", reason, model.tier);
        }

        let mut decision = self.decision(request_id, model, reason, fallbacks, analysis, false);
        decision.degraded_from = degraded_from;
        self.observe(&decision, kind);
        Ok(decision)
    }

    /// Drop unavailable fallbacks and, if `model` itself is unavailable,
    /// take the first remaining one in its place.
    ///
    /// Without a fallback manager nothing is filtered.
    fn promote_available(
        &self,
        model: &ModelDefinition,
        fallbacks: &mut Vec<ModelDefinition>,
    ) -> Option<ModelDefinition> {
        let manager = self.fallback.as_ref()?;
        fallbacks.retain(|candidate| manager.is_model_available(candidate));
        if manager.is_model_available(model) {
            return None;
        }

        if fallbacks.is_empty() {
            tracing::warn!(
                model = %model.id,
                provider = %model.provider,
                "Router: primary unavailable and no available fallback"
            );
            return None;
        }

        let promoted = fallbacks.remove(0);
        tracing::warn!(
            unavailable = %model.id,
            promoted = %promoted.id,
            "Router: primary unavailable, promoting fallback"
        );
        Some(promoted)
    }

    fn budget_limited_decision(
        &self,
        request_id: String,
        analysis: TaskAnalysis,
        budget_reason: &str,
    ) -> RoutingDecision {
        let mut model = self.economy_model.clone();
        let mut reason = format!("Budget constraint: {}", budget_reason);

        let mut fallbacks = self.budget_fallbacks(&analysis);
        if let Some(promoted) = self.promote_available(&model, &mut fallbacks) {
            reason = format!("{}; budget model {} unavailable", reason, model.id);
            model = promoted;
        }

        let gaps = capability_gaps(&model, &analysis);
        if !gaps.is_empty() {
            reason.push_str(&format!("; capability mismatch: {}", gaps.join(", ")));
            tracing::warn!(
                model = %model.id,
                missing = ?gaps,
                "Router: budget fallback model lacks required capabilities"
            );
        }

        let mut decision = self.decision(request_id, model, reason, fallbacks, analysis, true);
        if !gaps.is_empty() {
            decision.confidence = MISMATCH_CONFIDENCE;
        }
        self.observe(&decision, ReasonKind::Budget);
        decision
    }

    /// Other economy and local models, usable when the budget model fails.
    ///
    /// Models meeting every requirement come first, then ascending cost.
    fn budget_fallbacks(&self, analysis: &TaskAnalysis) -> Vec<ModelDefinition> {
        let mut chain: Vec<&ModelDefinition> = self
            .catalog()
            .iter()
            .filter(|m| m.tier <= Tier::Economy && m.id != self.economy_model.id)
            .filter(|m| m.context_window >= analysis.context_tokens)
            .collect();

        chain.sort_by(|a, b| {
            satisfies(b, analysis)
                .cmp(&satisfies(a, analysis))
                .then_with(|| {
                    cascade::estimated_cost(a, analysis)
                        .total_cmp(&cascade::estimated_cost(b, analysis))
                })
                .then_with(|| a.id.cmp(&b.id))
        });
        chain.truncate(self.policy.max_fallbacks);

        chain.into_iter().cloned().collect()
    }

    fn decision(
        &self,
        request_id: String,
        model: ModelDefinition,
        reason: String,
        fallbacks: Vec<ModelDefinition>,
        analysis: TaskAnalysis,
        budget_limited: bool,
    ) -> RoutingDecision {
        let estimated_cost = self.cost.estimate_cost(
            &model,
            u64::from(analysis.estimated_input_tokens),
            u64::from(analysis.estimated_output_tokens),
        );
        let estimated_latency_ms = model.tier.base_latency_ms()
            + u64::from(analysis.estimated_output_tokens) * MS_PER_OUTPUT_TOKEN;
        let confidence = confidence(&model, &analysis);

        RoutingDecision {
            request_id,
            provider: model.provider.clone(),
            model,
            reason,
            estimated_cost,
            estimated_latency_ms,
            fallbacks,
            confidence,
            budget_limited,
            degraded_from: None,
            analysis,
        }
    }

    fn observe(&self, decision: &RoutingDecision, kind: ReasonKind) {
        metrics::counter!(
            "switchyard_route_decisions_total",
            "tier" => decision.model.tier.as_str(),
            "reason_kind" => kind.as_str()
        )
        .increment(1);

        tracing::debug!(
            model = %decision.model.id,
            provider = %decision.provider,
            tier = %decision.model.tier,
            task_type = %decision.analysis.task_type,
            complexity = %decision.analysis.complexity,
            estimated_cost = decision.estimated_cost,
            confidence = decision.confidence,
            fallbacks = decision.fallbacks.len(),
            budget_limited = decision.budget_limited,
            degraded_from = ?decision.degraded_from,
            "Router: decision"
        );
    }

    /// Local model for a local-eligible request when `prefer_local` is set.
    fn local_override(&self, analysis: &TaskAnalysis) -> Option<ModelDefinition> {
        if !self.policy.prefer_local || !local_eligible(analysis) {
            return None;
        }

        self.catalog()
            .by_tier(Tier::Local)
            .into_iter()
            .find(|model| model.supports_tools && satisfies(model, analysis))
            .cloned()
    }

    /// Cheapest eligible economy model when `prefer_speed` is set.
    fn speed_override(&self, analysis: &TaskAnalysis) -> Option<ModelDefinition> {
        if !self.policy.prefer_speed || analysis.complexity == Complexity::Frontier {
            return None;
        }

        self.cascade
            .eligible(analysis)
            .into_iter()
            .filter(|model| model.tier == Tier::Economy)
            .min_by(|a, b| {
                cascade::estimated_cost(a, analysis)
                    .total_cmp(&cascade::estimated_cost(b, analysis))
                    .then_with(|| a.id.cmp(&b.id))
            })
            .cloned()
    }
}

fn resolve_economy_model(
    catalog: &ModelCatalog,
    policy: &RoutingPolicy,
) -> Result<ModelDefinition, RoutingError> {
    match &policy.economy_model {
        Some(id) => catalog
            .get(id)
            .cloned()
            .ok_or_else(|| RoutingError::EconomyModelNotFound { model: id.clone() }),
        None => catalog
            .cheapest_in_tier(Tier::Economy)
            .cloned()
            .ok_or(RoutingError::NoEconomyTier),
    }
}

/// Local models only serve requests without vision or thinking, below
/// frontier complexity, that fit a modest window.
fn local_eligible(analysis: &TaskAnalysis) -> bool {
    !analysis.requires_vision
        && !analysis.requires_thinking
        && analysis.complexity < Complexity::Frontier
        && analysis.context_tokens <= LARGE_CONTEXT_TOKENS
}

fn contextual_reason(model: &ModelDefinition, analysis: &TaskAnalysis) -> String {
    let floor = minimum_tier(analysis.complexity);
    if model.tier < floor {
        format!(
            "No eligible {} model for {} {} task; degraded to {} tier",
            floor, analysis.complexity, analysis.task_type, model.tier
        )
    } else if analysis.complexity == Complexity::Frontier {
        format!("Frontier-complexity {} task requires {} tier", analysis.task_type, model.tier)
    } else if analysis.requires_thinking {
        format!("Extended reasoning required for {} task", analysis.task_type)
    } else if analysis.requires_large_context {
        format!(
            "Large context ({} tokens) needs a {}-token window",
            analysis.context_tokens, model.context_window
        )
    } else if matches!(analysis.task_type, TaskType::SecurityReview | TaskType::Architecture) {
        format!("{} task routed to {} tier", analysis.task_type, model.tier)
    } else {
        format!("{} {} task", analysis.complexity, analysis.task_type)
    }
}

/// Capability-match confidence in `[0.8, 1.0]`.
fn confidence(model: &ModelDefinition, analysis: &TaskAnalysis) -> f64 {
    let mut confidence = 0.8;
    if analysis.requires_vision && model.supports_vision {
        confidence += 0.05;
    }
    if analysis.requires_tools && model.supports_tools {
        confidence += 0.05;
    }
    if analysis.requires_thinking && model.supports_thinking {
        confidence += 0.1;
    }
    // under half the window used
    if u64::from(analysis.context_tokens) * 2 < u64::from(model.context_window) {
        confidence += 0.05;
    }
    f64::min(confidence, 1.0)
}
