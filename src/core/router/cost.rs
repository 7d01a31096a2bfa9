//! Cost estimation and process-wide spend tracking
//!
//! Pricing is a flat per-provider-type rate keyed by the type prefix of the
//! provider name. Tracking is best-effort and process-local: the daily
//! counter is zeroed on a 24h tick and the monthly counter additionally
//! zeroed when the wall-clock month changes.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use once_cell::sync::Lazy;

use crate::core::provider::kind_key;
use crate::core::types::GenerateOptions;

/// Flat rate applied to provider types without an explicit entry, $/1K tokens
pub const DEFAULT_RATE_PER_1K: f64 = 0.002;

/// Reference call cost used to normalize the cost score
pub const REFERENCE_CALL_COST: f64 = 0.10;

/// Estimated characters per token
const CHARS_PER_TOKEN: f64 = 4.0;

/// Per-provider-type pricing, $/1K tokens
static RATES_PER_1K: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("openai", 0.002),
        ("anthropic", 0.002),
        ("mlx", 0.0),
        ("ollama", 0.0),
        ("local", 0.0),
        ("offline", 0.0),
    ])
});

/// Rate for a provider, $/1K tokens
pub fn rate_per_1k(provider_name: &str) -> f64 {
    RATES_PER_1K
        .get(kind_key(provider_name))
        .copied()
        .unwrap_or(DEFAULT_RATE_PER_1K)
}

/// Rough token estimate for a pending call: prompt plus serialized options
pub fn estimate_tokens(prompt: &str, options: &GenerateOptions) -> u64 {
    let serialized = serde_json::to_string(options).unwrap_or_default();
    let chars = prompt.chars().count() + serialized.chars().count();
    (chars as f64 / CHARS_PER_TOKEN).ceil() as u64
}

/// Estimated dollar cost of a pending call on the given provider
pub fn estimate_cost(provider_name: &str, prompt: &str, options: &GenerateOptions) -> f64 {
    cost_of_tokens(provider_name, estimate_tokens(prompt, options))
}

/// Dollar cost of an observed token count on the given provider
pub fn cost_of_tokens(provider_name: &str, tokens: u64) -> f64 {
    tokens as f64 / 1000.0 * rate_per_1k(provider_name)
}

/// Process-wide spend tracker
#[derive(Debug, Clone)]
pub struct CostLedger {
    /// Spend since the last daily reset
    pub daily_cost: f64,

    /// Spend since the last month rollover
    pub monthly_cost: f64,

    /// Month (1-12) of the last reset
    pub last_reset_month: u32,
}

impl CostLedger {
    pub fn new() -> Self {
        Self {
            daily_cost: 0.0,
            monthly_cost: 0.0,
            last_reset_month: Utc::now().month(),
        }
    }

    /// Add a completed call's cost to both windows
    pub fn record(&mut self, cost: f64) {
        self.daily_cost += cost;
        self.monthly_cost += cost;
    }

    /// Apply the 24h tick: zero the daily counter, and the monthly counter
    /// too when the month has rolled over since the last reset.
    pub fn roll_daily(&mut self, now: DateTime<Utc>) {
        self.daily_cost = 0.0;

        if now.month() != self.last_reset_month {
            self.monthly_cost = 0.0;
            self.last_reset_month = now.month();
        }
    }
}

impl Default for CostLedger {
    fn default() -> Self {
        Self::new()
    }
}
