//! Per-provider usage ledger
//!
//! One entry exists for every configured provider for the lifetime of the
//! owning router. Latency is smoothed with an exponential moving average;
//! the fallback wrapper's health ledger deliberately uses a cumulative mean
//! instead, since the two feed different semantics.

use std::time::Instant;

/// EMA smoothing factor for latency
const LATENCY_ALPHA: f64 = 0.1;

/// Router-side usage counters for one provider
#[derive(Debug, Clone, Default)]
pub struct ProviderStats {
    /// Successful generate calls
    pub request_count: u64,

    /// Total tokens consumed across successful calls
    pub token_count: u64,

    /// Accumulated spend in dollars
    pub cost: f64,

    /// When this provider last served a request
    pub last_used: Option<Instant>,

    /// Failed generate calls
    pub error_count: u64,

    /// Exponential moving average latency in milliseconds
    pub average_latency_ms: f64,
}

impl ProviderStats {
    /// Record a successful call
    pub fn record_success(&mut self, tokens: u64, cost: f64, latency_ms: f64) {
        self.request_count += 1;
        self.token_count += tokens;
        self.cost += cost;
        self.last_used = Some(Instant::now());
        self.average_latency_ms =
            self.average_latency_ms * (1.0 - LATENCY_ALPHA) + latency_ms * LATENCY_ALPHA;
    }

    /// Record a failed call
    pub fn record_error(&mut self) {
        self.error_count += 1;
    }

    /// Failure fraction over all attempts
    pub fn error_rate(&self) -> f64 {
        self.error_count as f64 / self.request_count.max(1) as f64
    }

    /// Whether any attempt has been observed yet
    pub fn has_history(&self) -> bool {
        self.request_count > 0 || self.error_count > 0
    }
}
