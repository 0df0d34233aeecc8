//! Per-endpoint availability state

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::VecDeque;

/// Availability of a `(provider, model)` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Availability {
    Available,
    /// Throttled by the provider until the given instant
    RateLimited { until: DateTime<Utc> },
    /// Too many recent failures
    CircuitOpen { failures: u32 },
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RateLimit {
    pub recorded_at: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

/// Mutable tracking for one endpoint.
///
/// Failures carry timestamps and expire lazily once older than the window.
#[derive(Debug, Clone)]
pub(crate) struct EndpointState {
    pub provider: String,
    pub model: String,
    pub failures: VecDeque<DateTime<Utc>>,
    pub rate_limit: Option<RateLimit>,
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure: Option<DateTime<Utc>>,
}

impl EndpointState {
    pub fn new(provider: &str, model: &str) -> Self {
        Self {
            provider: provider.to_string(),
            model: model.to_string(),
            failures: VecDeque::new(),
            rate_limit: None,
            last_success: None,
            last_failure: None,
        }
    }

    /// Drop failures older than `window` and an elapsed rate limit.
    pub fn prune(&mut self, now: DateTime<Utc>, window: Duration) {
        while let Some(&oldest) = self.failures.front() {
            if now - oldest >= window {
                self.failures.pop_front();
            } else {
                break;
            }
        }
        if matches!(&self.rate_limit, Some(limit) if now >= limit.until) {
            self.rate_limit = None;
        }
    }

    /// Failures still inside the window, without mutating.
    pub fn recent_failures(&self, now: DateTime<Utc>, window: Duration) -> u32 {
        self.failures.iter().filter(|&&at| now - at < window).count() as u32
    }

    pub fn availability(
        &self,
        now: DateTime<Utc>,
        window: Duration,
        max_failures: u32,
    ) -> Availability {
        if let Some(limit) = &self.rate_limit {
            if now < limit.until {
                return Availability::RateLimited { until: limit.until };
            }
        }

        let failures = self.recent_failures(now, window);
        if failures >= max_failures {
            Availability::CircuitOpen { failures }
        } else {
            Availability::Available
        }
    }
}

/// Read-only snapshot of one tracked endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointHealth {
    pub provider: String,
    pub model: String,
    pub availability: Availability,
    /// Failures inside the current window
    pub recent_failures: u32,
    pub rate_limited_at: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure: Option<DateTime<Utc>>,
}
