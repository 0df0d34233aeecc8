//! Built-in model catalog (published list prices, USD per 1M tokens)

use super::{ModelDefinition, Tier};

#[allow(clippy::too_many_arguments)]
fn model(
    id: &str,
    provider: &str,
    tier: Tier,
    context_window: u32,
    cost_per_1m_input: f64,
    cost_per_1m_output: f64,
    supports_vision: bool,
    supports_tools: bool,
    supports_thinking: bool,
) -> ModelDefinition {
    ModelDefinition {
        id: id.to_string(),
        provider: provider.to_string(),
        tier,
        context_window,
        cost_per_1m_input,
        cost_per_1m_output,
        supports_vision,
        supports_tools,
        supports_thinking,
    }
}

/// Default catalog used when configuration supplies no `[[models]]`.
pub fn default_models() -> Vec<ModelDefinition> {
    vec![
        // Frontier
        model(
            "claude-opus-4",
            "anthropic",
            Tier::Frontier,
            200_000,
            15.00,
            75.00,
            true,
            true,
            true,
        ),
        model("o3", "openai", Tier::Frontier, 200_000, 10.00, 40.00, true, true, true),
        // Standard
        model(
            "claude-sonnet-4",
            "anthropic",
            Tier::Standard,
            200_000,
            3.00,
            15.00,
            true,
            true,
            true,
        ),
        model("gpt-4o", "openai", Tier::Standard, 128_000, 2.50, 10.00, true, true, false),
        model("gemini-2.5-pro", "google", Tier::Standard, 1_000_000, 1.25, 10.00, true, true, true),
        // Economy
        model(
            "claude-3-5-haiku",
            "anthropic",
            Tier::Economy,
            200_000,
            0.80,
            4.00,
            false,
            true,
            false,
        ),
        model("gpt-4o-mini", "openai", Tier::Economy, 128_000, 0.15, 0.60, true, true, false),
        model(
            "gemini-2.0-flash",
            "google",
            Tier::Economy,
            1_000_000,
            0.10,
            0.40,
            true,
            true,
            false,
        ),
        // Local
        model("qwen2.5-coder:32b", "ollama", Tier::Local, 32_768, 0.0, 0.0, false, true, false),
        model("llama3.2:3b", "ollama", Tier::Local, 131_072, 0.0, 0.0, false, false, false),
    ]
}
