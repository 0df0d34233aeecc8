//! Model catalog.
//!
//! A validated, read-only list of [`ModelDefinition`]s supplied to the router
//! at construction time.

mod builtin;
mod error;
mod model;

pub use builtin::default_models;
pub use error::*;
pub use model::*;

use std::collections::HashSet;

/// Read-only collection of model definitions.
///
/// # Examples
///
/// ```
/// use switchyard::catalog::{ModelCatalog, Tier};
///
/// let catalog = ModelCatalog::builtin();
/// assert!(catalog.get("gpt-4o-mini").is_some());
/// assert_eq!(catalog.cheapest_in_tier(Tier::Economy).unwrap().id, "gemini-2.0-flash");
/// ```
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: Vec<ModelDefinition>,
}

impl ModelCatalog {
    /// Build a catalog, validating every entry.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateModel` when two entries share an id and
    /// `CatalogError::InvalidModel` for empty ids, non-finite or negative prices,
    /// or a zero context window.
    pub fn new(models: Vec<ModelDefinition>) -> Result<Self, CatalogError> {
        if models.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for model in &models {
            validate_model(model)?;
            if !seen.insert(model.id.as_str()) {
                return Err(CatalogError::DuplicateModel(model.id.clone()));
            }
        }

        Ok(Self { models })
    }

    /// Catalog of built-in models.
    pub fn builtin() -> Self {
        Self {
            models: default_models(),
        }
    }

    pub fn models(&self) -> &[ModelDefinition] {
        &self.models
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelDefinition> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Look up a model by id.
    pub fn get(&self, id: &str) -> Option<&ModelDefinition> {
        self.models.iter().find(|m| m.id == id)
    }

    /// All models in a tier, in catalog order.
    pub fn by_tier(&self, tier: Tier) -> Vec<&ModelDefinition> {
        self.models.iter().filter(|m| m.tier == tier).collect()
    }

    /// Cheapest model in a tier by combined input+output list price.
    pub fn cheapest_in_tier(&self, tier: Tier) -> Option<&ModelDefinition> {
        self.models
            .iter()
            .filter(|m| m.tier == tier)
            .min_by(|a, b| {
                let a_cost = a.cost_per_1m_input + a.cost_per_1m_output;
                let b_cost = b.cost_per_1m_input + b.cost_per_1m_output;
                a_cost.total_cmp(&b_cost)
            })
    }
}

fn validate_model(model: &ModelDefinition) -> Result<(), CatalogError> {
    let invalid = |message: &str| CatalogError::InvalidModel {
        model: model.id.clone(),
        message: message.to_string(),
    };

    if model.id.trim().is_empty() {
        return Err(invalid("id cannot be empty"));
    }
    if model.provider.trim().is_empty() {
        return Err(invalid("provider cannot be empty"));
    }
    if model.context_window == 0 {
        return Err(invalid("context_window must be non-zero"));
    }
    for price in [model.cost_per_1m_input, model.cost_per_1m_output] {
        if !price.is_finite() || price < 0.0 {
            return Err(invalid("prices must be finite and >= 0.0"));
        }
    }
    Ok(())
}
