//! Configuration error types

use crate::catalog::CatalogError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors loading or validating a [`SwitchyardConfig`](super::SwitchyardConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// TOML syntax or type mismatch
    #[error("invalid config TOML: {0}")]
    Parse(String),

    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Invalid model catalog: {0}")]
    Catalog(#[from] CatalogError),
}

impl ConfigError {
    pub(crate) fn validation(field: &str, message: impl Into<String>) -> Self {
        ConfigError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
