//! Provider error classification.
//!
//! Providers report rate limits in free-form error text. These helpers pick
//! out the signature and any retry-after hint.

use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

/// How a failed attempt is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Provider throttled the request; `retry_after` is the hint it gave, if any
    RateLimited { retry_after: Option<Duration> },
    /// Any other error
    Failed,
}

static RETRY_AFTER: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    const UNIT: &str = r"(?:(milliseconds?|ms|minutes?|mins?|m|seconds?|secs?|s)\b)?";
    vec![
        Regex::new(&format!(
            r#"(?i)retry[-_ ]?after["':=\s]*(\d+(?:\.\d+)?)\s*{UNIT}"#
        ))
        .unwrap(),
        Regex::new(&format!(r"(?i)try again in\s*(\d+(?:\.\d+)?)\s*{UNIT}")).unwrap(),
    ]
});

/// HTTP 429 as a standalone number, or "rate limit" / "rate_limit".
static RATE_LIMIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b429\b|rate[ _]limit").unwrap());

/// True if the error text carries a rate-limit signature.
pub fn is_rate_limit_error(message: &str) -> bool {
    RATE_LIMIT.is_match(message)
}

/// Extract a retry-after hint from error text.
///
/// Bare numbers are seconds. Returns `None` when no hint is present or the
/// value cannot be represented.
pub fn parse_retry_after(message: &str) -> Option<Duration> {
    RETRY_AFTER.iter().find_map(|pattern| {
        let captures = pattern.captures(message)?;
        let value: f64 = captures.get(1)?.as_str().parse().ok()?;
        let unit = captures.get(2).map(|m| m.as_str().to_lowercase());
        let seconds = match unit.as_deref() {
            Some(u) if u == "ms" || u.starts_with("millisecond") => value / 1000.0,
            Some(u) if u.starts_with('m') => value * 60.0,
            _ => value,
        };
        Duration::try_from_secs_f64(seconds).ok()
    })
}

/// Classify an attempt error by its message.
pub fn classify_error(message: &str) -> FailureKind {
    if is_rate_limit_error(message) {
        FailureKind::RateLimited {
            retry_after: parse_retry_after(message),
        }
    } else {
        FailureKind::Failed
    }
}
