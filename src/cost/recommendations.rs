//! Spending recommendations derived from usage

use super::usage::UsageMetrics;
use crate::analyzer::TaskType;
use crate::catalog::Tier;
use serde::Serialize;
use std::fmt;

const FRONTIER_SPEND_SHARE: f64 = 0.5;
const HIGH_TOKEN_VOLUME: u64 = 1_000_000;
const DEBUG_REQUEST_SHARE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    /// Frontier models dominate spend
    DowngradeFrontier,
    /// Token volume is high
    TruncateContext,
    /// Debugging dominates requests
    ImproveCodeQuality,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub message: String,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

pub(crate) fn recommend(usage: &UsageMetrics) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if usage.total_cost > 0.0 {
        let frontier_share = usage.cost_in_tier(Tier::Frontier) / usage.total_cost;
        if frontier_share > FRONTIER_SPEND_SHARE {
            recommendations.push(Recommendation {
                kind: RecommendationKind::DowngradeFrontier,
                message: format!(
                    "Frontier models account for {:.0}% of spend; \
                     route routine tasks to standard or economy models",
                    frontier_share * 100.0
                ),
            });
        }
    }

    if usage.total_tokens > HIGH_TOKEN_VOLUME {
        recommendations.push(Recommendation {
            kind: RecommendationKind::TruncateContext,
            message: format!(
                "{} tokens used today; truncate or summarize context to cut input size",
                usage.total_tokens
            ),
        });
    }

    if usage.total_requests > 0 {
        let debug_share = usage.requests_for(TaskType::Debug) as f64 / usage.total_requests as f64;
        if debug_share > DEBUG_REQUEST_SHARE {
            recommendations.push(Recommendation {
                kind: RecommendationKind::ImproveCodeQuality,
                message: format!(
                    "{:.0}% of requests are debugging; \
                     invest in tests and linting to catch issues earlier",
                    debug_share * 100.0
                ),
            });
        }
    }

    recommendations
}
