//! Routing decisions driven through the fallback executor with scripted
//! provider outcomes.

mod common;

use common::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use switchyard::analyzer::Message;
use switchyard::catalog::ModelDefinition;
use switchyard::clock::Clock;
use switchyard::fallback::{AttemptErrorKind, Availability};
use tokio_util::sync::CancellationToken;

/// Scripted provider: each model id maps to an error message, missing ids
/// succeed. Records the order models were called in.
#[derive(Clone, Default)]
struct ScriptedProvider {
    failures: Arc<HashMap<String, String>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedProvider {
    fn failing(entries: &[(&str, &str)]) -> Self {
        Self {
            failures: Arc::new(
                entries
                    .iter()
                    .map(|(id, msg)| (id.to_string(), msg.to_string()))
                    .collect(),
            ),
            calls: Arc::default(),
        }
    }

    async fn call(&self, model: ModelDefinition) -> Result<String, String> {
        self.calls.lock().unwrap().push(model.id.clone());
        match self.failures.get(&model.id) {
            Some(message) => Err(message.clone()),
            None => Ok(format!("response from {}", model.id)),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[tokio::test]
async fn test_rate_limited_primary_falls_through_and_is_skipped_next_time() {
    let h = default_harness();
    let decision = h.router.route(&[Message::user("explain this function")], None).unwrap();
    let primary = decision.model.id.clone();

    let provider =
        ScriptedProvider::failing(&[(primary.as_str(), "429 Too Many Requests: retry after 5s")]);
    let cancel = CancellationToken::new();

    let outcome = h
        .fallback
        .execute_with_fallback(&decision.candidates(), &cancel, |m| {
            let provider = provider.clone();
            async move { provider.call(m).await }
        })
        .await;

    assert!(outcome.success);
    assert_eq!(outcome.attempts_count, 2);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].kind, AttemptErrorKind::RateLimited);
    assert_ne!(outcome.model.as_ref().unwrap().id, primary);

    match h.fallback.availability(&decision.model.provider, &primary) {
        Availability::RateLimited { until } => {
            assert_eq!(until - h.clock.now(), chrono::Duration::seconds(5));
        }
        other => panic!("expected rate limit, got {:?}", other),
    }

    // next route promotes a fallback
    let rerouted = h.router.route(&[Message::user("explain this function")], None).unwrap();
    assert_ne!(rerouted.model.id, primary);
    assert!(rerouted.reason.contains("unavailable"));

    h.clock.advance(chrono::Duration::seconds(5));
    assert!(h.fallback.is_available(&decision.model.provider, &primary));
}

#[tokio::test]
async fn test_repeated_failures_open_circuit_then_decay() {
    let h = default_harness();
    let decision = h.router.route(&[Message::user("hello")], None).unwrap();
    let primary = decision.model.clone();
    let provider = ScriptedProvider::failing(&[(primary.id.as_str(), "upstream returned 503")]);
    let cancel = CancellationToken::new();

    for _ in 0..3 {
        let outcome = h
            .fallback
            .execute_with_fallback(std::slice::from_ref(&primary), &cancel, |m| {
                let provider = provider.clone();
                async move { provider.call(m).await }
            })
            .await;
        assert!(!outcome.success);
        assert_eq!(outcome.errors[0].kind, AttemptErrorKind::Failed);
    }

    assert_eq!(
        h.fallback.availability(&primary.provider, &primary.id),
        Availability::CircuitOpen { failures: 3 }
    );

    // open circuit is skipped without being invoked
    let before = provider.calls().len();
    let outcome = h
        .fallback
        .execute_with_fallback(std::slice::from_ref(&primary), &cancel, |m| {
            let provider = provider.clone();
            async move { provider.call(m).await }
        })
        .await;
    assert_eq!(outcome.attempts_count, 0);
    assert_eq!(provider.calls().len(), before);

    h.clock.advance(chrono::Duration::seconds(61));
    assert!(h.fallback.is_model_available(&primary));
}

#[tokio::test]
async fn test_exhausted_chain_reports_every_error() {
    let h = default_harness();
    let decision = h.router.route(&[Message::user("hello")], None).unwrap();
    let candidates = decision.candidates();

    let entries: Vec<(String, String)> = candidates
        .iter()
        .map(|m| (m.id.clone(), format!("{} exploded", m.id)))
        .collect();
    let borrowed: Vec<(&str, &str)> =
        entries.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
    let provider = ScriptedProvider::failing(&borrowed);

    let outcome = h
        .fallback
        .execute_with_fallback(&candidates, &CancellationToken::new(), |m| {
            let provider = provider.clone();
            async move { provider.call(m).await }
        })
        .await;

    assert!(!outcome.success);
    assert!(!outcome.cancelled);
    assert!(outcome.result.is_none());
    assert_eq!(outcome.attempts_count as usize, candidates.len());
    assert_eq!(outcome.errors.len(), candidates.len());
    assert_eq!(outcome.model.as_ref().unwrap().id, decision.model.id);

    let order: Vec<String> = candidates.iter().map(|m| m.id.clone()).collect();
    assert_eq!(provider.calls(), order);
}

#[tokio::test]
async fn test_success_clears_failure_history() {
    let h = default_harness();
    let decision = h.router.route(&[Message::user("hello")], None).unwrap();
    let primary = decision.model.clone();

    h.fallback.record_failure(&primary.provider, &primary.id);
    h.fallback.record_failure(&primary.provider, &primary.id);

    let provider = ScriptedProvider::default();
    let outcome = h
        .fallback
        .execute_with_fallback(&decision.candidates(), &CancellationToken::new(), |m| {
            let provider = provider.clone();
            async move { provider.call(m).await }
        })
        .await;
    assert!(outcome.success);
    assert_eq!(outcome.result.as_deref(), Some(format!("response from {}", primary.id).as_str()));

    // a single failure afterwards must not open the circuit
    h.fallback.record_failure(&primary.provider, &primary.id);
    assert!(h.fallback.is_model_available(&primary));

    let health = h
        .fallback
        .get_health_status()
        .into_iter()
        .find(|e| e.model == primary.id)
        .unwrap();
    assert_eq!(health.recent_failures, 1);
    assert!(health.last_success.is_some());
}

#[tokio::test]
async fn test_cancelled_token_stops_before_first_attempt() {
    let h = default_harness();
    let decision = h.router.route(&[Message::user("hello")], None).unwrap();
    let provider = ScriptedProvider::default();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = h
        .fallback
        .execute_with_fallback(&decision.candidates(), &cancel, |m| {
            let provider = provider.clone();
            async move { provider.call(m).await }
        })
        .await;

    assert!(outcome.cancelled);
    assert!(!outcome.success);
    assert_eq!(outcome.attempts_count, 0);
    assert!(provider.calls().is_empty());
}
