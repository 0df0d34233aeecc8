//! Tiered model selection.
//!
//! Filters the catalog down to models that satisfy a request's hard
//! requirements, then picks the cheapest tier that still clears the
//! complexity floor and orders the rest into a bounded fallback chain.

use crate::analyzer::{Complexity, TaskAnalysis};
use crate::catalog::{ModelCatalog, ModelDefinition, Tier};
use crate::routing::error::RoutingError;
use std::cmp::Ordering;
use std::sync::Arc;

/// Default upper bound on fallback chain length.
pub const DEFAULT_MAX_FALLBACKS: usize = 3;

/// Minimum tier a request of the given complexity may be served by.
pub fn minimum_tier(complexity: Complexity) -> Tier {
    match complexity {
        Complexity::Frontier => Tier::Frontier,
        Complexity::Complex => Tier::Standard,
        Complexity::Moderate | Complexity::Simple | Complexity::Trivial => Tier::Economy,
    }
}

/// Requirements from `analysis` that `model` does not satisfy.
///
/// Empty when the model is fully eligible.
pub fn capability_gaps(model: &ModelDefinition, analysis: &TaskAnalysis) -> Vec<&'static str> {
    let mut gaps = Vec::new();
    if analysis.requires_vision && !model.supports_vision {
        gaps.push("vision");
    }
    if analysis.requires_tools && !model.supports_tools {
        gaps.push("tools");
    }
    if analysis.requires_thinking && !model.supports_thinking {
        gaps.push("thinking");
    }
    if model.context_window < analysis.context_tokens {
        gaps.push("context");
    }
    gaps
}

/// Whether `model` satisfies every requirement in `analysis`.
pub fn satisfies(model: &ModelDefinition, analysis: &TaskAnalysis) -> bool {
    capability_gaps(model, analysis).is_empty()
}

/// Estimated request cost on `model` for the analysed token counts.
pub fn estimated_cost(model: &ModelDefinition, analysis: &TaskAnalysis) -> f64 {
    model.pricing().cost(
        u64::from(analysis.estimated_input_tokens),
        u64::from(analysis.estimated_output_tokens),
    )
}

/// Selects a primary model and fallback chain from the catalog.
pub struct ModelCascade {
    catalog: Arc<ModelCatalog>,
    max_fallbacks: usize,
}

impl ModelCascade {
    pub fn new(catalog: Arc<ModelCatalog>) -> Self {
        Self::with_max_fallbacks(catalog, DEFAULT_MAX_FALLBACKS)
    }

    pub fn with_max_fallbacks(catalog: Arc<ModelCatalog>, max_fallbacks: usize) -> Self {
        Self {
            catalog,
            max_fallbacks,
        }
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    /// Catalog models satisfying every hard requirement, in catalog order.
    pub fn eligible(&self, analysis: &TaskAnalysis) -> Vec<&ModelDefinition> {
        self.catalog
            .iter()
            .filter(|model| satisfies(model, analysis))
            .collect()
    }

    /// Choose the primary model for a request.
    ///
    /// Among eligible models, picks the lowest tier at or above the complexity
    /// floor, breaking ties by estimated cost and then id. If no eligible model
    /// reaches the floor, the highest eligible tier is used instead: tier is
    /// degraded before capabilities are.
    ///
    /// # Errors
    ///
    /// Returns `RoutingError::NoEligibleModel` when no catalog model satisfies
    /// the hard capability requirements.
    pub fn select_model(&self, analysis: &TaskAnalysis) -> Result<ModelDefinition, RoutingError> {
        let eligible = self.eligible(analysis);
        if eligible.is_empty() {
            let missing = self.missing_requirements(analysis);
            tracing::warn!(
                missing = ?missing,
                context_tokens = analysis.context_tokens,
                "ModelCascade: no eligible model"
            );
            return Err(RoutingError::NoEligibleModel { missing });
        }

        let floor = minimum_tier(analysis.complexity);
        let selected = eligible
            .iter()
            .filter(|model| model.tier >= floor)
            .min_by(|a, b| {
                a.tier
                    .cmp(&b.tier)
                    .then_with(|| compare_cost(a, b, analysis))
                    .then_with(|| a.id.cmp(&b.id))
            })
            .copied();

        let model = match selected {
            Some(model) => model,
            None => {
                // eligible is non-empty, so max_by always yields a model
                let best = eligible
                    .iter()
                    .max_by(|a, b| {
                        a.tier
                            .cmp(&b.tier)
                            .then_with(|| compare_cost(b, a, analysis))
                    })
                    .copied()
                    .ok_or_else(|| RoutingError::NoEligibleModel {
                        missing: self.missing_requirements(analysis),
                    })?;
                tracing::warn!(
                    floor = %floor,
                    selected = %best.id,
                    tier = %best.tier,
                    "ModelCascade: no eligible model meets tier floor, degrading tier"
                );
                best
            }
        };

        tracing::debug!(
            model = %model.id,
            tier = %model.tier,
            floor = %floor,
            eligible = eligible.len(),
            "ModelCascade: selected primary"
        );

        Ok(model.clone())
    }

    /// Ordered fallback chain for `model`.
    ///
    /// Remaining eligible models, same provider first, then ascending
    /// estimated cost; truncated to the configured maximum.
    pub fn get_fallbacks(
        &self,
        model: &ModelDefinition,
        analysis: &TaskAnalysis,
    ) -> Vec<ModelDefinition> {
        let mut chain: Vec<&ModelDefinition> = self
            .eligible(analysis)
            .into_iter()
            .filter(|candidate| candidate.id != model.id)
            .collect();

        chain.sort_by(|a, b| {
            let a_same = a.provider == model.provider;
            let b_same = b.provider == model.provider;
            b_same
                .cmp(&a_same)
                .then_with(|| compare_cost(a, b, analysis))
                .then_with(|| a.id.cmp(&b.id))
        });
        chain.truncate(self.max_fallbacks);

        chain.into_iter().cloned().collect()
    }

    /// Requirements no single catalog model can meet; if each is individually
    /// satisfiable, the full combination is reported.
    fn missing_requirements(&self, analysis: &TaskAnalysis) -> Vec<String> {
        let mut requested = Vec::new();
        let mut missing = Vec::new();

        let mut check = |active: bool, name: String, supported: &dyn Fn(&ModelDefinition) -> bool| {
            if active {
                if !self.catalog.iter().any(supported) {
                    missing.push(name.clone());
                }
                requested.push(name);
            }
        };

        check(analysis.requires_vision, "vision".to_string(), &|m| m.supports_vision);
        check(analysis.requires_tools, "tools".to_string(), &|m| m.supports_tools);
        check(analysis.requires_thinking, "thinking".to_string(), &|m| m.supports_thinking);
        check(
            true,
            format!("context_window >= {}", analysis.context_tokens),
            &|m| m.context_window >= analysis.context_tokens,
        );

        if missing.is_empty() {
            requested
        } else {
            missing
        }
    }
}

fn compare_cost(a: &ModelDefinition, b: &ModelDefinition, analysis: &TaskAnalysis) -> Ordering {
    estimated_cost(a, analysis).total_cmp(&estimated_cost(b, analysis))
}
