//! Fallback and circuit-breaking configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Failure tracking thresholds for [`FallbackManager`](crate::fallback::FallbackManager).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Failures within the window that make an endpoint unavailable
    pub max_failures: u32,

    /// Sliding window for counting failures, in seconds
    pub failure_window_secs: u64,

    /// Rate-limit cooldown when the provider gave no retry-after, in milliseconds
    pub default_retry_after_ms: u64,

    /// Deadline for a single attempt, in milliseconds. No deadline when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt_timeout_ms: Option<u64>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            max_failures: 3,
            failure_window_secs: 60,
            default_retry_after_ms: 30_000,
            attempt_timeout_ms: None,
        }
    }
}

impl FallbackConfig {
    pub fn failure_window(&self) -> Duration {
        Duration::from_secs(self.failure_window_secs)
    }

    pub fn default_retry_after(&self) -> Duration {
        Duration::from_millis(self.default_retry_after_ms)
    }

    pub fn attempt_timeout(&self) -> Option<Duration> {
        self.attempt_timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_failures == 0 {
            return Err("max_failures must be at least 1".to_string());
        }
        if self.failure_window_secs == 0 {
            return Err("failure_window_secs must be at least 1".to_string());
        }
        if self.attempt_timeout_ms == Some(0) {
            return Err("attempt_timeout_ms must be positive when set".to_string());
        }
        Ok(())
    }
}
