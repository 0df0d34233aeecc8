//! Endpoint availability tracking and sequential fallback execution.
//!
//! [`FallbackManager`] keeps one state machine per `(provider, model)`
//! endpoint with three states: available, rate limited, and circuit open.
//! Failures are timestamped and decay lazily against the injected
//! [`Clock`]; nothing runs in the background.
//!
//! Callers report outcomes of provider calls they made themselves through
//! [`record_success`](FallbackManager::record_success),
//! [`record_failure`](FallbackManager::record_failure) and
//! [`record_rate_limit`](FallbackManager::record_rate_limit), or let
//! [`execute_with_fallback`](FallbackManager::execute_with_fallback) drive
//! the attempts.

mod classify;
mod state;

pub use classify::{classify_error, is_rate_limit_error, parse_retry_after, FailureKind};
pub use state::{Availability, EndpointHealth};

use crate::catalog::{endpoint_key, ModelDefinition};
use crate::clock::{Clock, SystemClock};
use crate::config::FallbackConfig;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use state::{EndpointState, RateLimit};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a single attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptErrorKind {
    RateLimited,
    TimedOut,
    Failed,
}

/// One failed attempt inside [`FallbackManager::execute_with_fallback`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptError {
    pub model: String,
    pub provider: String,
    pub kind: AttemptErrorKind,
    pub message: String,
}

/// Result of [`FallbackManager::execute_with_fallback`].
#[derive(Debug)]
pub struct FallbackOutcome<T> {
    pub success: bool,
    /// The chain was stopped by the cancellation token
    pub cancelled: bool,
    /// Model that produced `result`, or the first candidate when none did
    pub model: Option<ModelDefinition>,
    /// Candidates actually invoked
    pub attempts_count: u32,
    pub total_latency: Duration,
    pub result: Option<T>,
    pub errors: Vec<AttemptError>,
}

/// Tracks endpoint availability and runs requests down a fallback chain.
///
/// State is owned by the instance; construct one per tenant or share it
/// through `Arc`.
pub struct FallbackManager {
    states: DashMap<String, EndpointState>,
    config: FallbackConfig,
    clock: Arc<dyn Clock>,
}

impl Default for FallbackManager {
    fn default() -> Self {
        Self::new(FallbackConfig::default())
    }
}

impl FallbackManager {
    pub fn new(config: FallbackConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: FallbackConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            states: DashMap::new(),
            config,
            clock,
        }
    }

    pub fn config(&self) -> &FallbackConfig {
        &self.config
    }

    fn window(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.config.failure_window()).unwrap_or(chrono::Duration::MAX)
    }

    /// Record a provider error against an endpoint.
    pub fn record_failure(&self, provider: &str, model: &str) {
        let now = self.clock.now();
        let window = self.window();
        let mut entry = self
            .states
            .entry(endpoint_key(provider, model))
            .or_insert_with(|| EndpointState::new(provider, model));

        entry.prune(now, window);
        entry.failures.push_back(now);
        entry.last_failure = Some(now);
        let failures = entry.failures.len() as u32;

        if failures >= self.config.max_failures {
            tracing::warn!(
                provider,
                model,
                failures,
                window_secs = self.config.failure_window_secs,
                "FallbackManager: circuit opened"
            );
        } else {
            tracing::debug!(provider, model, failures, "FallbackManager: failure recorded");
        }
    }

    /// Record a rate limit. Without a hint the configured default cooldown applies.
    pub fn record_rate_limit(&self, provider: &str, model: &str, retry_after: Option<Duration>) {
        let now = self.clock.now();
        let retry_after = retry_after.unwrap_or_else(|| self.config.default_retry_after());
        let until = chrono::Duration::from_std(retry_after)
            .ok()
            .and_then(|delta| now.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut entry = self
            .states
            .entry(endpoint_key(provider, model))
            .or_insert_with(|| EndpointState::new(provider, model));
        entry.rate_limit = Some(RateLimit { recorded_at: now, until });

        metrics::counter!("switchyard_rate_limits_total", "provider" => provider.to_string())
            .increment(1);
        tracing::warn!(
            provider,
            model,
            retry_after_ms = retry_after.as_millis() as u64,
            "FallbackManager: rate limited"
        );
    }

    /// Record a successful call; clears failures and any rate limit.
    pub fn record_success(&self, provider: &str, model: &str) {
        let now = self.clock.now();
        let mut entry = self
            .states
            .entry(endpoint_key(provider, model))
            .or_insert_with(|| EndpointState::new(provider, model));

        if !entry.failures.is_empty() || entry.rate_limit.is_some() {
            tracing::info!(provider, model, "FallbackManager: endpoint recovered");
        }
        entry.failures.clear();
        entry.rate_limit = None;
        entry.last_success = Some(now);
    }

    /// Current state of an endpoint. Expired entries are purged.
    pub fn availability(&self, provider: &str, model: &str) -> Availability {
        let now = self.clock.now();
        let window = self.window();
        match self.states.get_mut(&endpoint_key(provider, model)) {
            Some(mut entry) => {
                entry.prune(now, window);
                entry.availability(now, window, self.config.max_failures)
            }
            None => Availability::Available,
        }
    }

    pub fn is_available(&self, provider: &str, model: &str) -> bool {
        self.availability(provider, model).is_available()
    }

    pub fn is_model_available(&self, model: &ModelDefinition) -> bool {
        self.is_available(&model.provider, &model.id)
    }

    /// Snapshot of every tracked endpoint, ordered by provider then model.
    pub fn get_health_status(&self) -> Vec<EndpointHealth> {
        let now = self.clock.now();
        let window = self.window();

        let mut status: Vec<EndpointHealth> = self
            .states
            .iter()
            .map(|entry| {
                let state = entry.value();
                EndpointHealth {
                    provider: state.provider.clone(),
                    model: state.model.clone(),
                    availability: state.availability(now, window, self.config.max_failures),
                    recent_failures: state.recent_failures(now, window),
                    rate_limited_at: state
                        .rate_limit
                        .as_ref()
                        .filter(|limit| now < limit.until)
                        .map(|limit| limit.recorded_at),
                    last_success: state.last_success,
                    last_failure: state.last_failure,
                }
            })
            .collect();

        status.sort_by(|a, b| (&a.provider, &a.model).cmp(&(&b.provider, &b.model)));
        status
    }

    /// Forget all tracked state.
    pub fn reset(&self) {
        self.states.clear();
        tracing::info!("FallbackManager: state reset");
    }

    /// Try `models` in order until one succeeds.
    ///
    /// Unavailable candidates are skipped without being invoked. Errors are
    /// classified by message: rate-limit signatures go to
    /// [`record_rate_limit`](Self::record_rate_limit) with any retry-after
    /// hint, everything else (including a timed-out attempt) to
    /// [`record_failure`](Self::record_failure). Cancelling `cancel` aborts the
    /// in-flight attempt without recording it and stops the chain.
    ///
    /// Never fails: exhaustion is reported as `success == false`.
    pub async fn execute_with_fallback<T, E, F, Fut>(
        &self,
        models: &[ModelDefinition],
        cancel: &CancellationToken,
        mut execute: F,
    ) -> FallbackOutcome<T>
    where
        F: FnMut(ModelDefinition) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let started = Instant::now();
        let mut attempts_count = 0u32;
        let mut errors = Vec::new();

        for model in models {
            if cancel.is_cancelled() {
                return self.cancelled_outcome(models, attempts_count, started, errors);
            }

            if !self.is_model_available(model) {
                tracing::debug!(
                    model = %model.id,
                    provider = %model.provider,
                    "FallbackManager: skipping unavailable candidate"
                );
                metrics::counter!("switchyard_fallback_attempts_total", "outcome" => "skipped")
                    .increment(1);
                continue;
            }

            attempts_count += 1;
            tracing::debug!(
                model = %model.id,
                provider = %model.provider,
                attempt = attempts_count,
                "FallbackManager: attempting"
            );

            let attempt = execute(model.clone());
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                outcome = with_deadline(attempt, self.config.attempt_timeout()) => Some(outcome),
            };

            let Some(outcome) = outcome else {
                tracing::info!(
                    model = %model.id,
                    provider = %model.provider,
                    attempt = attempts_count,
                    "FallbackManager: attempt cancelled"
                );
                metrics::counter!("switchyard_fallback_attempts_total", "outcome" => "cancelled")
                    .increment(1);
                return self.cancelled_outcome(models, attempts_count, started, errors);
            };

            match outcome {
                Ok(Ok(result)) => {
                    self.record_success(&model.provider, &model.id);
                    metrics::counter!("switchyard_fallback_attempts_total", "outcome" => "success")
                        .increment(1);
                    return FallbackOutcome {
                        success: true,
                        cancelled: false,
                        model: Some(model.clone()),
                        attempts_count,
                        total_latency: started.elapsed(),
                        result: Some(result),
                        errors,
                    };
                }
                Ok(Err(err)) => {
                    let message = err.to_string();
                    let kind = match classify_error(&message) {
                        FailureKind::RateLimited { retry_after } => {
                            self.record_rate_limit(&model.provider, &model.id, retry_after);
                            AttemptErrorKind::RateLimited
                        }
                        FailureKind::Failed => {
                            self.record_failure(&model.provider, &model.id);
                            AttemptErrorKind::Failed
                        }
                    };
                    tracing::warn!(
                        model = %model.id,
                        provider = %model.provider,
                        attempt = attempts_count,
                        error = %message,
                        "FallbackManager: attempt failed"
                    );
                    metrics::counter!("switchyard_fallback_attempts_total", "outcome" => "error")
                        .increment(1);
                    errors.push(AttemptError {
                        model: model.id.clone(),
                        provider: model.provider.clone(),
                        kind,
                        message,
                    });
                }
                Err(elapsed) => {
                    self.record_failure(&model.provider, &model.id);
                    tracing::warn!(
                        model = %model.id,
                        provider = %model.provider,
                        attempt = attempts_count,
                        timeout_ms = elapsed.as_millis() as u64,
                        "FallbackManager: attempt timed out"
                    );
                    metrics::counter!("switchyard_fallback_attempts_total", "outcome" => "timeout")
                        .increment(1);
                    errors.push(AttemptError {
                        model: model.id.clone(),
                        provider: model.provider.clone(),
                        kind: AttemptErrorKind::TimedOut,
                        message: format!("attempt timed out after {}ms", elapsed.as_millis()),
                    });
                }
            }
        }

        tracing::warn!(
            candidates = models.len(),
            attempts = attempts_count,
            "FallbackManager: all candidates exhausted"
        );
        FallbackOutcome {
            success: false,
            cancelled: false,
            model: models.first().cloned(),
            attempts_count,
            total_latency: started.elapsed(),
            result: None,
            errors,
        }
    }

    fn cancelled_outcome<T>(
        &self,
        models: &[ModelDefinition],
        attempts_count: u32,
        started: Instant,
        errors: Vec<AttemptError>,
    ) -> FallbackOutcome<T> {
        FallbackOutcome {
            success: false,
            cancelled: true,
            model: models.first().cloned(),
            attempts_count,
            total_latency: started.elapsed(),
            result: None,
            errors,
        }
    }
}

/// Await `attempt`, bounded by `deadline` when set.
///
/// The error carries the deadline that elapsed.
async fn with_deadline<Fut: Future>(
    attempt: Fut,
    deadline: Option<Duration>,
) -> Result<Fut::Output, Duration> {
    match deadline {
        Some(limit) => tokio::time::timeout(limit, attempt).await.map_err(|_| limit),
        None => Ok(attempt.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Tier;
    use crate::clock::ManualClock;
    use std::sync::Mutex;

    fn model(id: &str, provider: &str) -> ModelDefinition {
        ModelDefinition {
            id: id.to_string(),
            provider: provider.to_string(),
            tier: Tier::Economy,
            context_window: 128_000,
            cost_per_1m_input: 0.1,
            cost_per_1m_output: 0.4,
            supports_vision: false,
            supports_tools: true,
            supports_thinking: false,
        }
    }

    fn manager() -> (FallbackManager, ManualClock) {
        let clock = ManualClock::new();
        let manager =
            FallbackManager::with_clock(FallbackConfig::default(), Arc::new(clock.clone()));
        (manager, clock)
    }

    #[test]
    fn test_unknown_endpoint_is_available() {
        let (manager, _) = manager();
        assert!(manager.is_available("openai", "gpt-4o"));
        assert!(manager.get_health_status().is_empty());
    }

    #[test]
    fn test_three_failures_open_circuit_until_window_elapses() {
        let (manager, clock) = manager();
        for _ in 0..2 {
            manager.record_failure("openai", "gpt-4o");
        }
        assert!(manager.is_available("openai", "gpt-4o"));

        manager.record_failure("openai", "gpt-4o");
        assert_eq!(
            manager.availability("openai", "gpt-4o"),
            Availability::CircuitOpen { failures: 3 }
        );

        clock.advance(chrono::Duration::seconds(59));
        assert!(!manager.is_available("openai", "gpt-4o"));

        clock.advance(chrono::Duration::seconds(1));
        assert!(manager.is_available("openai", "gpt-4o"));
    }

    #[test]
    fn test_failures_are_scoped_per_provider() {
        let (manager, _) = manager();
        for _ in 0..3 {
            manager.record_failure("openai", "shared-name");
        }
        assert!(!manager.is_available("openai", "shared-name"));
        assert!(manager.is_available("azure", "shared-name"));
    }

    #[test]
    fn test_rate_limit_uses_hint_or_default() {
        let (manager, clock) = manager();
        manager.record_rate_limit("anthropic", "claude-sonnet-4", Some(Duration::from_secs(5)));
        manager.record_rate_limit("openai", "gpt-4o", None);

        clock.advance(chrono::Duration::seconds(5));
        assert!(manager.is_available("anthropic", "claude-sonnet-4"));
        assert!(!manager.is_available("openai", "gpt-4o"));

        clock.advance(chrono::Duration::seconds(25));
        assert!(manager.is_available("openai", "gpt-4o"));
    }

    #[test]
    fn test_success_clears_failures_and_rate_limit() {
        let (manager, clock) = manager();
        for _ in 0..3 {
            manager.record_failure("openai", "gpt-4o");
        }
        manager.record_rate_limit("openai", "gpt-4o", None);
        manager.record_success("openai", "gpt-4o");

        assert!(manager.is_available("openai", "gpt-4o"));
        let status = manager.get_health_status();
        assert_eq!(status[0].recent_failures, 0);
        assert_eq!(status[0].last_success, Some(clock.now()));
    }

    #[test]
    fn test_health_status_is_sorted_snapshot() {
        let (manager, _) = manager();
        manager.record_failure("openai", "gpt-4o");
        manager.record_rate_limit("anthropic", "claude-opus-4", None);

        let status = manager.get_health_status();
        assert_eq!(status.len(), 2);
        assert_eq!(status[0].provider, "anthropic");
        assert!(matches!(status[0].availability, Availability::RateLimited { .. }));
        assert!(status[0].rate_limited_at.is_some());
        assert_eq!(status[1].recent_failures, 1);
        assert!(status[1].availability.is_available());
    }

    #[test]
    fn test_reset_clears_everything() {
        let (manager, _) = manager();
        manager.record_rate_limit("openai", "gpt-4o", None);
        manager.reset();
        assert!(manager.is_available("openai", "gpt-4o"));
        assert!(manager.get_health_status().is_empty());
    }

    #[tokio::test]
    async fn test_skips_rate_limited_candidate() {
        let (manager, _) = manager();
        let a = model("model-a", "p1");
        let b = model("model-b", "p2");
        manager.record_rate_limit("p1", "model-a", None);

        let invoked = Mutex::new(Vec::new());
        let outcome = manager
            .execute_with_fallback(&[a, b], &CancellationToken::new(), |m| {
                invoked.lock().unwrap().push(m.id.clone());
                async move { Ok::<_, String>(m.id) }
            })
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.attempts_count, 1);
        assert_eq!(outcome.result.as_deref(), Some("model-b"));
        assert_eq!(*invoked.lock().unwrap(), vec!["model-b".to_string()]);
    }

    #[tokio::test]
    async fn test_classifies_errors_and_moves_on() {
        let (manager, _) = manager();
        let candidates = [model("a", "p1"), model("b", "p2"), model("c", "p3")];

        let outcome = manager
            .execute_with_fallback(&candidates, &CancellationToken::new(), |m| async move {
                match m.id.as_str() {
                    "a" => Err("429 Too Many Requests, retry after 10s".to_string()),
                    "b" => Err("upstream connection reset".to_string()),
                    _ => Ok(42),
                }
            })
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.model.unwrap().id, "c");
        assert_eq!(outcome.attempts_count, 3);
        assert_eq!(outcome.result, Some(42));
        assert_eq!(outcome.errors.len(), 2);
        assert_eq!(outcome.errors[0].kind, AttemptErrorKind::RateLimited);
        assert_eq!(outcome.errors[1].kind, AttemptErrorKind::Failed);

        assert!(!manager.is_available("p1", "a"));
        assert_eq!(manager.get_health_status()[1].recent_failures, 1);
    }

    #[tokio::test]
    async fn test_exhaustion_reports_first_candidate() {
        let (manager, _) = manager();
        let candidates = [model("a", "p1"), model("b", "p2")];

        let outcome = manager
            .execute_with_fallback(&candidates, &CancellationToken::new(), |_| async {
                Err::<(), _>("boom")
            })
            .await;

        assert!(!outcome.success);
        assert!(!outcome.cancelled);
        assert_eq!(outcome.model.unwrap().id, "a");
        assert_eq!(outcome.attempts_count, 2);
        assert!(outcome.result.is_none());
    }

    #[tokio::test]
    async fn test_empty_candidate_list() {
        let (manager, _) = manager();
        let outcome = manager
            .execute_with_fallback(&[], &CancellationToken::new(), |_| async {
                Ok::<(), String>(())
            })
            .await;
        assert!(!outcome.success);
        assert!(outcome.model.is_none());
        assert_eq!(outcome.attempts_count, 0);
    }

    #[tokio::test]
    async fn test_all_unavailable_invokes_nothing() {
        let (manager, _) = manager();
        manager.record_rate_limit("p1", "a", None);
        let calls = Mutex::new(0);

        let outcome = manager
            .execute_with_fallback(&[model("a", "p1")], &CancellationToken::new(), |_| {
                *calls.lock().unwrap() += 1;
                async { Ok::<(), String>(()) }
            })
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.attempts_count, 0);
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_attempt_counts_as_failure() {
        let clock = ManualClock::new();
        let config = FallbackConfig {
            attempt_timeout_ms: Some(1_000),
            ..Default::default()
        };
        let manager = FallbackManager::with_clock(config, Arc::new(clock));
        let candidates = [model("slow", "p1"), model("fast", "p2")];

        let outcome = manager
            .execute_with_fallback(&candidates, &CancellationToken::new(), |m| async move {
                if m.id == "slow" {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                }
                Ok::<_, String>(m.id)
            })
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.result.as_deref(), Some("fast"));
        assert_eq!(outcome.errors[0].kind, AttemptErrorKind::TimedOut);
        assert!(outcome.total_latency >= Duration::from_secs(1));
        assert_eq!(manager.get_health_status()[0].recent_failures, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_chain_without_recording() {
        let (manager, _) = manager();
        let cancel = CancellationToken::new();
        let candidates = [model("a", "p1"), model("b", "p2")];

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let outcome = manager
            .execute_with_fallback(&candidates, &cancel, |_| async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<(), String>(())
            })
            .await;

        assert!(!outcome.success);
        assert!(outcome.cancelled);
        assert_eq!(outcome.attempts_count, 1);
        assert!(outcome.errors.is_empty());
        assert!(manager.get_health_status().is_empty());
    }

    #[tokio::test]
    async fn test_already_cancelled_token_invokes_nothing() {
        let (manager, _) = manager();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = manager
            .execute_with_fallback(&[model("a", "p1")], &cancel, |_| async { Ok::<(), String>(()) })
            .await;
        assert!(outcome.cancelled);
        assert_eq!(outcome.attempts_count, 0);
    }
}
