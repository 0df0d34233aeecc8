//! Heuristic task classification.
//!
//! Turns an inbound message list into a [`TaskAnalysis`]: task type,
//! complexity, token estimates and capability requirements. Pure and
//! deterministic: no clock, no network, no shared state.

mod patterns;
mod types;

pub use types::*;

use patterns::{detect_task_type, TOOL_PATTERN, WHOLE_CODEBASE_PATTERN};

/// Characters per token used for estimation.
const CHARS_PER_TOKEN: usize = 4;

/// Input size above which a request needs a large context window.
pub const LARGE_CONTEXT_TOKENS: u32 = 32_000;

/// Classifies requests into [`TaskAnalysis`] values.
///
/// # Examples
///
/// ```
/// use switchyard::analyzer::{Complexity, Message, TaskAnalyzer, TaskType};
///
/// let analysis =
///     TaskAnalyzer::new().analyze_task(&[Message::user("explain this function")], None);
/// assert_eq!(analysis.task_type, TaskType::Explain);
/// assert!(analysis.complexity <= Complexity::Simple);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskAnalyzer;

impl TaskAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Classify a message list.
    ///
    /// `provided_type` overrides keyword detection when the caller already
    /// knows the task category.
    pub fn analyze_task(
        &self,
        messages: &[Message],
        provided_type: Option<TaskType>,
    ) -> TaskAnalysis {
        let last_text = messages
            .last()
            .map(|m| m.content.text())
            .unwrap_or_default();

        let task_type = provided_type.unwrap_or_else(|| detect_task_type(&last_text));

        let total_chars: usize = messages.iter().map(|m| m.content.char_len()).sum();
        let estimated_input_tokens: u32 = messages
            .iter()
            .map(|m| m.content.char_len().div_ceil(CHARS_PER_TOKEN) as u32)
            .sum();
        let estimated_output_tokens = estimate_output_tokens(task_type, total_chars);

        let code_blocks = messages
            .iter()
            .map(|m| count_code_blocks(&m.content.text()))
            .sum::<usize>();
        let whole_codebase = WHOLE_CODEBASE_PATTERN.is_match(&last_text);

        let score = complexity_score(
            task_type,
            estimated_input_tokens,
            code_blocks,
            total_chars,
            whole_codebase,
        );
        let complexity = Complexity::from_score(score);

        let requires_vision = messages.iter().any(|m| m.content.has_image());
        let requires_tools = TOOL_PATTERN.is_match(&last_text);
        let requires_thinking = task_type.needs_thinking() || complexity >= Complexity::Complex;
        let requires_large_context = estimated_input_tokens > LARGE_CONTEXT_TOKENS;

        tracing::debug!(
            task_type = %task_type,
            complexity = %complexity,
            score,
            input_tokens = estimated_input_tokens,
            output_tokens = estimated_output_tokens,
            code_blocks,
            requires_vision,
            requires_tools,
            requires_thinking,
            requires_large_context,
            "TaskAnalyzer: classified request"
        );

        TaskAnalysis {
            complexity,
            task_type,
            estimated_input_tokens,
            estimated_output_tokens,
            requires_vision,
            requires_tools,
            requires_thinking,
            requires_large_context,
            context_tokens: estimated_input_tokens.saturating_add(estimated_output_tokens),
        }
    }
}

fn estimate_output_tokens(task_type: TaskType, total_chars: usize) -> u32 {
    let base = task_type.base_output_tokens();
    if total_chars > 10_000 {
        base * 2
    } else if total_chars > 5_000 {
        base + base.div_ceil(2)
    } else {
        base
    }
}

fn complexity_score(
    task_type: TaskType,
    input_tokens: u32,
    code_blocks: usize,
    total_chars: usize,
    whole_codebase: bool,
) -> u32 {
    let mut score = task_type.base_complexity_score();

    if input_tokens > 50_000 {
        score += 2;
    } else if input_tokens > 20_000 {
        score += 1;
    }
    if code_blocks > 3 {
        score += 1;
    }
    if total_chars > 5_000 {
        score += 1;
    }
    if whole_codebase {
        score += 2;
    }

    score
}

/// Number of fenced code blocks (pairs of ``` fences; an unclosed fence counts).
fn count_code_blocks(text: &str) -> usize {
    text.matches("```").count().div_ceil(2)
}
