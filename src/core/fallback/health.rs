//! Per-provider circuit breaker ledger
//!
//! Each wrapped provider carries one health record with two explicit breaker
//! states, closed and open (timestamped). There is no stored half-open flag;
//! probe eligibility is recomputed on demand from the open timestamp, so an
//! open breaker whose cooldown has elapsed simply answers `should_try` with
//! `true` and lets the next real call decide its fate.
//!
//! Latency here is a cumulative mean over all attempts, deliberately
//! distinct from the router ledger's exponential moving average.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

/// Breaker-side health record for one provider
#[derive(Debug, Clone)]
pub struct ProviderHealth {
    /// Whether the provider is currently considered healthy
    pub is_healthy: bool,

    /// Consecutive failures since the last success
    pub consecutive_failures: u32,

    /// When the provider last failed
    pub last_failure: Option<Instant>,

    /// Cumulative mean latency in milliseconds over all attempts
    pub average_latency_ms: f64,

    /// Total attempts, success or failure
    pub request_count: u64,

    /// Sum of attempt latencies in milliseconds
    pub total_latency_ms: f64,

    /// Whether the breaker is open
    pub circuit_breaker_open: bool,

    /// When the breaker opened
    pub circuit_opened_at: Option<Instant>,
}

impl Default for ProviderHealth {
    fn default() -> Self {
        Self {
            is_healthy: true,
            consecutive_failures: 0,
            last_failure: None,
            average_latency_ms: 0.0,
            request_count: 0,
            total_latency_ms: 0.0,
            circuit_breaker_open: false,
            circuit_opened_at: None,
        }
    }
}

impl ProviderHealth {
    /// Record a successful attempt: reset the failure streak and close the
    /// breaker if it was open.
    pub fn record_success(&mut self, provider: &str, latency_ms: f64) {
        self.consecutive_failures = 0;
        self.is_healthy = true;

        if self.circuit_breaker_open {
            debug!(provider, "circuit breaker closing after success");
            self.circuit_breaker_open = false;
            self.circuit_opened_at = None;
        }

        self.record_attempt(latency_ms);
    }

    /// Record a failed attempt; at `threshold` consecutive failures the
    /// breaker opens (re-stamping the open timestamp on further failures).
    pub fn record_failure(&mut self, provider: &str, latency_ms: f64, threshold: u32) {
        self.consecutive_failures += 1;
        self.last_failure = Some(Instant::now());

        if self.consecutive_failures >= threshold {
            if !self.circuit_breaker_open {
                warn!(
                    provider,
                    failures = self.consecutive_failures,
                    "circuit breaker opening"
                );
            }
            self.circuit_breaker_open = true;
            self.circuit_opened_at = Some(Instant::now());
            self.is_healthy = false;
        }

        self.record_attempt(latency_ms);
    }

    /// Whether traffic may be sent: closed, or open past its cooldown
    pub fn should_try(&self, breaker_timeout: Duration) -> bool {
        if !self.circuit_breaker_open {
            return true;
        }

        match self.circuit_opened_at {
            Some(opened_at) => opened_at.elapsed() > breaker_timeout,
            None => true,
        }
    }

    /// Manually close the breaker and clear the failure streak
    pub fn reset(&mut self) {
        self.is_healthy = true;
        self.consecutive_failures = 0;
        self.circuit_breaker_open = false;
        self.circuit_opened_at = None;
    }

    fn record_attempt(&mut self, latency_ms: f64) {
        self.request_count += 1;
        self.total_latency_ms += latency_ms;
        self.average_latency_ms = self.total_latency_ms / self.request_count as f64;
    }
}
