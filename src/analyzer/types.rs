//! Message and task-analysis types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Speaker role of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: MessageContent::Text(content.into()),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Multimodal message built from parts.
    pub fn with_parts(role: Role, parts: Vec<ContentPart>) -> Self {
        Self {
            role,
            content: MessageContent::Parts(parts),
        }
    }
}

/// Message content - either plain text or multimodal parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Concatenated text of the content (text parts joined by newlines).
    pub fn text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Character count of all text content.
    pub fn char_len(&self) -> usize {
        match self {
            MessageContent::Text(text) => text.chars().count(),
            MessageContent::Parts(parts) => parts
                .iter()
                .map(|part| match part {
                    ContentPart::Text { text } => text.chars().count(),
                    _ => 0,
                })
                .sum(),
        }
    }

    pub fn has_image(&self) -> bool {
        match self {
            MessageContent::Text(_) => false,
            MessageContent::Parts(parts) => parts.iter().any(ContentPart::is_image),
        }
    }
}

/// Content part for multimodal messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text {
        text: String,
    },
    ImageUrl {
        image_url: ImageUrl,
    },
    /// Inline image (base64 source block)
    Image {
        #[serde(default)]
        source: serde_json::Value,
    },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        ContentPart::ImageUrl {
            image_url: ImageUrl { url: url.into() },
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, ContentPart::ImageUrl { .. } | ContentPart::Image { .. })
    }
}

/// Image URL for vision requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Closed set of task categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskType {
    Completion,
    Chat,
    Edit,
    Explain,
    Test,
    Debug,
    Refactor,
    Documentation,
    SecurityReview,
    Architecture,
    LongHorizon,
}

impl TaskType {
    pub const ALL: [TaskType; 11] = [
        TaskType::Completion,
        TaskType::Chat,
        TaskType::Edit,
        TaskType::Explain,
        TaskType::Test,
        TaskType::Debug,
        TaskType::Refactor,
        TaskType::Documentation,
        TaskType::SecurityReview,
        TaskType::Architecture,
        TaskType::LongHorizon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Completion => "completion",
            TaskType::Chat => "chat",
            TaskType::Edit => "edit",
            TaskType::Explain => "explain",
            TaskType::Test => "test",
            TaskType::Debug => "debug",
            TaskType::Refactor => "refactor",
            TaskType::Documentation => "documentation",
            TaskType::SecurityReview => "security-review",
            TaskType::Architecture => "architecture",
            TaskType::LongHorizon => "long-horizon",
        }
    }

    /// Base complexity score (1-5) before content signals are added.
    pub fn base_complexity_score(&self) -> u32 {
        match self {
            TaskType::Completion | TaskType::Chat => 1,
            TaskType::Edit | TaskType::Explain | TaskType::Documentation => 2,
            TaskType::Test | TaskType::Debug | TaskType::Refactor => 3,
            TaskType::SecurityReview | TaskType::Architecture => 4,
            TaskType::LongHorizon => 5,
        }
    }

    /// Expected output size in tokens before length scaling.
    pub fn base_output_tokens(&self) -> u32 {
        match self {
            TaskType::Completion => 200,
            TaskType::Chat => 500,
            TaskType::Edit => 800,
            TaskType::Explain => 1000,
            TaskType::Test | TaskType::Debug | TaskType::Documentation => 1500,
            TaskType::Refactor => 2000,
            TaskType::SecurityReview => 2500,
            TaskType::Architecture => 3000,
            TaskType::LongHorizon => 5000,
        }
    }

    /// Task categories that always need extended reasoning.
    pub fn needs_thinking(&self) -> bool {
        matches!(
            self,
            TaskType::Architecture | TaskType::LongHorizon | TaskType::SecurityReview
        )
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        TaskType::ALL
            .iter()
            .find(|t| t.as_str() == normalized)
            .copied()
            .ok_or_else(|| format!("Unknown task type: {}", s))
    }
}

/// Ordinal request difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Trivial,
    Simple,
    Moderate,
    Complex,
    Frontier,
}

impl Complexity {
    /// Map a cumulative score onto the five levels.
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=1 => Complexity::Trivial,
            2 => Complexity::Simple,
            3 => Complexity::Moderate,
            4 => Complexity::Complex,
            _ => Complexity::Frontier,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Trivial => "trivial",
            Complexity::Simple => "simple",
            Complexity::Moderate => "moderate",
            Complexity::Complex => "complex",
            Complexity::Frontier => "frontier",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of one inbound request. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskAnalysis {
    pub complexity: Complexity,
    pub task_type: TaskType,
    pub estimated_input_tokens: u32,
    pub estimated_output_tokens: u32,
    pub requires_vision: bool,
    pub requires_tools: bool,
    pub requires_thinking: bool,
    pub requires_large_context: bool,
    /// Tokens the model's window must hold (input plus expected output)
    pub context_tokens: u32,
}
