//! Multi-factor provider scoring
//!
//! Each candidate gets a composite score in `[0, 1]`: a weighted sum of
//! capability match, observed performance, estimated cost, and thermal
//! pressure. The factor functions are pure; the router supplies ledger
//! snapshots and the current thermal status.

use crate::config::ScoringWeights;
use crate::core::provider::LOCAL_ACCELERATED_MARKER;
use crate::core::router::cost::REFERENCE_CALL_COST;
use crate::core::router::stats::ProviderStats;
use crate::core::router::thermal::ThermalStatus;
use crate::core::types::{CapabilityRequest, GenerateOptions, ProviderCapabilities};

/// Capability-match bonuses
const VISION_BONUS: f64 = 0.30;
const MAX_TOKENS_BONUS: f64 = 0.20;
const STREAMING_BONUS: f64 = 0.20;
const TOOL_CALLING_BONUS: f64 = 0.30;

/// Performance score assumed for providers with no history yet
const COLD_START_SCORE: f64 = 0.5;

/// Daily-budget fraction past which paid providers are penalized
const BUDGET_PRESSURE_THRESHOLD: f64 = 0.8;

/// Thermal penalty applied to accelerated local providers while throttling
const THROTTLED_SCORE: f64 = 0.2;

/// Per-factor score breakdown for one candidate
#[derive(Debug, Clone, Copy)]
pub struct ScoreBreakdown {
    pub capability: f64,
    pub performance: f64,
    pub cost: f64,
    pub thermal: f64,
    /// Weighted composite in `[0, 1]`
    pub total: f64,
}

impl ScoreBreakdown {
    /// Human-readable selection reason
    pub fn reason(&self) -> String {
        format!(
            "score {:.3} (capability {:.2}, performance {:.2}, cost {:.2}, thermal {:.2})",
            self.total, self.capability, self.performance, self.cost, self.thermal
        )
    }
}

/// Compose the four factors under the configured weights
#[allow(clippy::too_many_arguments)]
pub fn score(
    weights: &ScoringWeights,
    capabilities: &ProviderCapabilities,
    request: &CapabilityRequest,
    options: &GenerateOptions,
    stats: &ProviderStats,
    estimated_cost: f64,
    daily_spend: f64,
    daily_limit: Option<f64>,
    provider_name: &str,
    thermal_enabled: bool,
    thermal: &ThermalStatus,
) -> ScoreBreakdown {
    let capability = capability_score(capabilities, request, options);
    let performance = performance_score(stats);
    let cost = cost_score(estimated_cost, daily_spend, daily_limit);
    let thermal = thermal_score(provider_name, thermal_enabled, thermal);

    ScoreBreakdown {
        capability,
        performance,
        cost,
        thermal,
        total: capability * weights.capability
            + performance * weights.performance
            + cost * weights.cost
            + thermal * weights.thermal,
    }
}

/// Sum of matched capability bonuses; unrequested capabilities contribute 0
pub fn capability_score(
    capabilities: &ProviderCapabilities,
    request: &CapabilityRequest,
    options: &GenerateOptions,
) -> f64 {
    let mut score = 0.0;

    if request.vision && capabilities.vision {
        score += VISION_BONUS;
    }

    if let Some(requested) = options.max_tokens {
        if requested <= capabilities.max_tokens {
            score += MAX_TOKENS_BONUS;
        }
    }

    if request.streaming && capabilities.streaming {
        score += STREAMING_BONUS;
    }

    if request.tool_calling && capabilities.tool_calling {
        score += TOOL_CALLING_BONUS;
    }

    score
}

/// Blend of inverse error rate and latency headroom
///
/// Providers with zero history default to the cold-start score so a fresh
/// candidate is neither favored nor buried.
pub fn performance_score(stats: &ProviderStats) -> f64 {
    if !stats.has_history() {
        return COLD_START_SCORE;
    }

    let error_rate = stats.error_rate();
    let latency_score = if stats.average_latency_ms > 0.0 {
        (1000.0 / stats.average_latency_ms).min(1.0)
    } else {
        0.5
    };

    ((1.0 - error_rate) * 0.7 + latency_score * 0.3).max(0.0)
}

/// Cost headroom, normalized against a $0.10 reference call
///
/// Past 80% of a configured daily limit the score collapses toward the
/// remaining budget fraction instead.
pub fn cost_score(estimated_cost: f64, daily_spend: f64, daily_limit: Option<f64>) -> f64 {
    if let Some(limit) = daily_limit {
        if limit > 0.0 {
            let daily_fraction = daily_spend / limit;
            if daily_fraction > BUDGET_PRESSURE_THRESHOLD {
                return (1.0 - daily_fraction).max(0.0);
            }
        }
    }

    (1.0 - (estimated_cost / REFERENCE_CALL_COST).min(1.0)).max(0.0)
}

/// Thermal pressure factor
///
/// Only accelerated local providers pay the penalty; daemon and remote
/// backends are unaffected by host thermals.
pub fn thermal_score(provider_name: &str, enabled: bool, thermal: &ThermalStatus) -> f64 {
    if provider_name.contains(LOCAL_ACCELERATED_MARKER) && enabled && thermal.is_throttling {
        THROTTLED_SCORE
    } else {
        1.0
    }
}
