//! Tracing subscriber setup.
//!
//! The library only emits `tracing` events; binaries install a subscriber
//! with [`init_tracing`]. Events go to stderr so command output on stdout
//! stays machine-readable.

use crate::config::{LogFormat, LoggingConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Build filter directives from a [`LoggingConfig`].
///
/// Component levels are scoped under the crate root and emitted in sorted
/// order.
///
/// # Examples
///
/// ```
/// use switchyard::config::{LogFormat, LoggingConfig};
/// use switchyard::logging::build_filter_directives;
/// use std::collections::HashMap;
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Pretty,
///     component_levels: Some(HashMap::from([("routing".to_string(), "debug".to_string())])),
/// };
///
/// assert_eq!(build_filter_directives(&config), "info,switchyard::routing=debug");
/// ```
pub fn build_filter_directives(config: &LoggingConfig) -> String {
    let mut filter_str = config.level.clone();

    if let Some(component_levels) = &config.component_levels {
        let mut components: Vec<_> = component_levels.iter().collect();
        components.sort();
        for (component, level) in components {
            filter_str.push_str(&format!(",switchyard::{}={}", component, level));
        }
    }

    filter_str
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `config`.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter_str = build_filter_directives(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    match config.format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?,
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?,
    }

    tracing::debug!(format = %config.format, filter = %filter_str, "Logging initialized");
    Ok(())
}
