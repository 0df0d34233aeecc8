//! Output formatting helpers for CLI commands

use crate::catalog::{ModelDefinition, Tier};
use crate::routing::RoutingDecision;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;

/// View model for catalog display
#[derive(Debug, Clone, serde::Serialize)]
pub struct ModelView {
    pub id: String,
    pub provider: String,
    pub tier: Tier,
    pub context_window: u32,
    pub cost_per_1m_input: f64,
    pub cost_per_1m_output: f64,
    pub capabilities: Vec<&'static str>,
}

impl From<&ModelDefinition> for ModelView {
    fn from(model: &ModelDefinition) -> Self {
        let mut capabilities = Vec::new();
        if model.supports_vision {
            capabilities.push("vision");
        }
        if model.supports_tools {
            capabilities.push("tools");
        }
        if model.supports_thinking {
            capabilities.push("thinking");
        }

        Self {
            id: model.id.clone(),
            provider: model.provider.clone(),
            tier: model.tier,
            context_window: model.context_window,
            cost_per_1m_input: model.cost_per_1m_input,
            cost_per_1m_output: model.cost_per_1m_output,
            capabilities,
        }
    }
}

/// Tier name colored by cost band
pub fn tier_label(tier: Tier) -> String {
    match tier {
        Tier::Frontier => tier.as_str().magenta().to_string(),
        Tier::Standard => tier.as_str().blue().to_string(),
        Tier::Economy => tier.as_str().green().to_string(),
        Tier::Local => tier.as_str().cyan().to_string(),
    }
}

fn usd(amount: f64) -> String {
    if amount == 0.0 {
        "free".to_string()
    } else if amount < 0.01 {
        format!("${:.6}", amount)
    } else {
        format!("${:.4}", amount)
    }
}

/// Format models as a table
pub fn format_models_table(models: &[ModelView]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Model",
        "Provider",
        "Tier",
        "Context",
        "Input $/1M",
        "Output $/1M",
        "Capabilities",
    ]);

    for m in models {
        table.add_row(vec![
            Cell::new(&m.id),
            Cell::new(&m.provider),
            Cell::new(tier_label(m.tier)),
            Cell::new(m.context_window),
            Cell::new(format!("{:.2}", m.cost_per_1m_input)),
            Cell::new(format!("{:.2}", m.cost_per_1m_output)),
            Cell::new(m.capabilities.join(", ")),
        ]);
    }

    table.to_string()
}

/// Format models as JSON
pub fn format_models_json(models: &[ModelView]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&json!({ "models": models }))
}

/// Format a routing decision for humans
pub fn format_decision(decision: &RoutingDecision) -> String {
    let analysis = &decision.analysis;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Field", "Value"]);

    let model = if decision.budget_limited {
        format!("{} {}", decision.model.id.bold(), "(budget limited)".yellow())
    } else {
        decision.model.id.bold().to_string()
    };

    let mut requirements = Vec::new();
    if analysis.requires_vision {
        requirements.push("vision");
    }
    if analysis.requires_tools {
        requirements.push("tools");
    }
    if analysis.requires_thinking {
        requirements.push("thinking");
    }
    if analysis.requires_large_context {
        requirements.push("large context");
    }

    let fallbacks = if decision.fallbacks.is_empty() {
        "none".dimmed().to_string()
    } else {
        decision
            .fallbacks
            .iter()
            .map(|m| m.id.as_str())
            .collect::<Vec<_>>()
            .join(" → ")
    };

    let rows: Vec<(&str, String)> = vec![
        ("Model", model),
        ("Provider", decision.provider.clone()),
        ("Tier", tier_label(decision.model.tier)),
        ("Reason", decision.reason.clone()),
        ("Task", format!("{} ({})", analysis.task_type, analysis.complexity)),
        (
            "Tokens",
            format!(
                "{} in / {} out",
                analysis.estimated_input_tokens, analysis.estimated_output_tokens
            ),
        ),
        (
            "Requires",
            if requirements.is_empty() {
                "-".to_string()
            } else {
                requirements.join(", ")
            },
        ),
        ("Est. cost", usd(decision.estimated_cost)),
        ("Est. latency", format!("{}ms", decision.estimated_latency_ms)),
        ("Confidence", format!("{:.2}", decision.confidence)),
        ("Fallbacks", fallbacks),
        ("Request ID", decision.request_id.dimmed().to_string()),
    ];

    for (field, value) in rows {
        table.add_row(vec![Cell::new(field), Cell::new(value)]);
    }

    table.to_string()
}

/// Format a routing decision as JSON
pub fn format_decision_json(decision: &RoutingDecision) -> serde_json::Result<String> {
    serde_json::to_string_pretty(decision)
}
