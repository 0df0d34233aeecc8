//! Keyword patterns for task classification.
//!
//! Type patterns are evaluated in declaration order and the first match wins,
//! so narrow intents (completion, refactor, debug) sit ahead of broad ones
//! (edit).

use super::types::TaskType;
use regex::Regex;
use std::sync::LazyLock;

pub(crate) static TASK_TYPE_PATTERNS: LazyLock<Vec<(TaskType, Regex)>> = LazyLock::new(|| {
    vec![
        (
            TaskType::Completion,
            Regex::new(
                r"(?i)^\s*(complete|finish|continue)\b|\bautocomplete\b|\bfill in\b|\bcomplete (this|the) (code|function|line|snippet|method)\b",
            )
            .unwrap(),
        ),
        (
            TaskType::Refactor,
            Regex::new(r"(?i)\b(refactor\w*|restructure|clean ?up|reorganize|simplify|extract (a |the )?(method|function|class))\b").unwrap(),
        ),
        (
            TaskType::Debug,
            Regex::new(r"(?i)\b(debug\w*|fix|bugs?|errors?|exceptions?|crash\w*|broken|not working|fails?|failing|stack ?trace|panic\w*)\b").unwrap(),
        ),
        (
            TaskType::Explain,
            Regex::new(r"(?i)\b(explain\w*|what does|what is|how does|why does|understand|walk me through|describe)\b").unwrap(),
        ),
        (
            TaskType::Test,
            Regex::new(r"(?i)\b(unit|integration|e2e|end-to-end) tests?\b|\btest (cases?|coverage|suite)\b|\b(write|add|generate|create)\s+(some\s+|a\s+|the\s+|more\s+)?tests?\b").unwrap(),
        ),
        (
            TaskType::Documentation,
            Regex::new(r"(?i)\b(document\w*|docstrings?|jsdoc|rustdoc|readme|doc comments?|add comments)\b").unwrap(),
        ),
        (
            TaskType::SecurityReview,
            Regex::new(r"(?i)\b(security|vulnerab\w*|exploit\w*|injection|xss|csrf|cve|pen ?test\w*|audit)\b").unwrap(),
        ),
        (
            TaskType::Architecture,
            Regex::new(r"(?i)\b(architect\w*|system design|design patterns?|scalab\w*|microservices?|high[- ]level design)\b").unwrap(),
        ),
        (
            TaskType::LongHorizon,
            Regex::new(r"(?i)\b(migrat\w*|end[- ]to[- ]end|multi[- ]step|implement (a |the )?(full|complete|whole|entire)|build (a |an |the )?(full|complete|entire) \w+|(entire|whole) (codebase|project|repo\w*))\b").unwrap(),
        ),
        (
            TaskType::Edit,
            Regex::new(r"(?i)\b(edit|change|modify|update|rename|replace|add|remove|delete|insert)\b").unwrap(),
        ),
    ]
});

/// Signals that the request needs I/O or actions, i.e. tool calls.
pub(crate) static TOOL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(search\w*|run|execute|files?|browse|fetch|download|open|terminal|shell|commands?|install|deploy|grep|look up|navigate)\b").unwrap()
});

/// Phrases that scope the request to a whole code base.
pub(crate) static WHOLE_CODEBASE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(entire|whole) (codebase|code base|project|repo\w*)\b|\ball (the )?files\b|\bevery file\b").unwrap()
});

/// First task type whose pattern matches, or `Chat`.
pub(crate) fn detect_task_type(text: &str) -> TaskType {
    TASK_TYPE_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(text))
        .map(|(task_type, _)| *task_type)
        .unwrap_or(TaskType::Chat)
}
