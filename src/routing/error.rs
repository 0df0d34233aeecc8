//! Error types for routing failures

use crate::catalog::CatalogError;
use thiserror::Error;

/// Errors that can occur while building a router or selecting a model
#[derive(Debug, Error)]
pub enum RoutingError {
    /// No catalog model satisfies the request's hard capability requirements
    #[error("No eligible model in catalog; unmet requirements: {missing:?}")]
    NoEligibleModel { missing: Vec<String> },

    /// The configured budget fallback model is not in the catalog
    #[error("Economy model '{model}' not found in catalog")]
    EconomyModelNotFound { model: String },

    /// The catalog has no economy-tier model to fall back to under budget pressure
    #[error("Catalog has no economy-tier model for budget fallback")]
    NoEconomyTier,

    /// Catalog construction failed
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
