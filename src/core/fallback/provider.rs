//! Resilient fallback provider
//!
//! Wraps an ordered provider list behind the provider contract itself, so a
//! fallback chain can be nested or substituted anywhere a single provider is
//! expected. Each wrapped provider is guarded by a circuit breaker; open
//! breakers are revisited by a passive health-check pass that runs at most
//! once per gating interval, and the main loop retries the whole eligible
//! list with linear backoff before giving up.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use futures::future::join_all;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::FallbackOptions;
use crate::core::fallback::health::ProviderHealth;
use crate::core::provider::{ModelProvider, ProviderKind};
use crate::core::types::{GenerateOptions, GenerateResult, ProviderCapabilities};
use crate::utils::error::{DispatchError, Result};
use crate::utils::timeout::with_timeout;

/// Bounded wait for a single health probe
const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Latency charged to a failed or timed-out probe, in milliseconds
const HEALTH_PROBE_PENALTY_MS: f64 = 5000.0;

/// Ordered failover with circuit breaking and retry
pub struct ResilientFallbackProvider {
    /// Joined child names
    name: String,

    /// Wrapped providers in failover order
    providers: Vec<Arc<dyn ModelProvider>>,

    /// Chain settings
    options: FallbackOptions,

    /// Breaker ledger, one entry per wrapped provider
    health: DashMap<String, ProviderHealth>,

    /// When the passive health-check pass last ran
    last_health_check: Mutex<Instant>,
}

impl ResilientFallbackProvider {
    /// Wrap an ordered provider list
    pub fn new(providers: Vec<Arc<dyn ModelProvider>>, options: FallbackOptions) -> Self {
        let name = providers
            .iter()
            .map(|provider| provider.name())
            .collect::<Vec<_>>()
            .join("+");

        let health = DashMap::new();
        for provider in &providers {
            health.insert(provider.name().to_string(), ProviderHealth::default());
        }

        Self {
            name,
            providers,
            options,
            health,
            last_health_check: Mutex::new(Instant::now()),
        }
    }

    /// Standard chain: local accelerated, then local daemon, then remote API
    pub fn standard(providers: Vec<Arc<dyn ModelProvider>>) -> Self {
        let mut ordered = providers;
        ordered.sort_by_key(|provider| ProviderKind::of(provider.name()).preset_rank());

        Self::new(
            ordered,
            FallbackOptions {
                health_check_interval_secs: 30,
                circuit_breaker_threshold: 3,
                circuit_breaker_timeout_secs: 60,
                retry_attempts: 2,
                retry_delay_ms: 1000,
            },
        )
    }

    /// Offline chain: local runtimes only, tighter breaker, faster retries
    pub fn local_only(providers: Vec<Arc<dyn ModelProvider>>) -> Self {
        let mut ordered: Vec<_> = providers
            .into_iter()
            .filter(|provider| ProviderKind::of(provider.name()).is_local())
            .collect();
        ordered.sort_by_key(|provider| ProviderKind::of(provider.name()).preset_rank());

        Self::new(
            ordered,
            FallbackOptions {
                health_check_interval_secs: 30,
                circuit_breaker_threshold: 2,
                circuit_breaker_timeout_secs: 30,
                retry_attempts: 3,
                retry_delay_ms: 500,
            },
        )
    }

    /// Chain settings
    pub fn options(&self) -> &FallbackOptions {
        &self.options
    }

    /// Snapshot of the breaker ledger
    pub fn health_report(&self) -> HashMap<String, ProviderHealth> {
        self.health
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Manually close a provider's breaker; `false` if the name is unknown
    pub fn reset_breaker(&self, provider_name: &str) -> bool {
        match self.health.get_mut(provider_name) {
            Some(mut entry) => {
                entry.reset();
                info!(provider = provider_name, "circuit breaker manually reset");
                true
            }
            None => false,
        }
    }

    /// Generate through the chain with retry and circuit breaking
    ///
    /// # Flow
    ///
    /// 1. Run the passive health-check pass if its gating interval elapsed
    /// 2. Filter to providers whose breakers allow traffic
    /// 3. Walk the eligible list up to `retry_attempts` times, sleeping
    ///    `retry_delay * (attempt + 1)` between passes (never after the last)
    /// 4. Surface the last captured error once everything failed
    pub async fn generate_with_fallback(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<GenerateResult> {
        self.run_health_checks().await;

        let timeout = self.options.circuit_breaker_timeout();
        let eligible: Vec<_> = self
            .providers
            .iter()
            .filter(|provider| {
                self.health
                    .get(provider.name())
                    .map(|entry| entry.should_try(timeout))
                    .unwrap_or(true)
            })
            .cloned()
            .collect();

        if eligible.is_empty() {
            return Err(DispatchError::NoHealthyProviders);
        }

        let threshold = self.options.circuit_breaker_threshold;
        let mut last_error = None;

        for attempt in 0..self.options.retry_attempts {
            for provider in &eligible {
                let start = Instant::now();
                match provider.generate(prompt, options).await {
                    Ok(result) => {
                        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
                        if let Some(mut entry) = self.health.get_mut(provider.name()) {
                            entry.record_success(provider.name(), latency_ms);
                        }
                        debug!(provider = provider.name(), attempt, "generation succeeded");
                        return Ok(result);
                    }
                    Err(err) => {
                        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
                        if let Some(mut entry) = self.health.get_mut(provider.name()) {
                            entry.record_failure(provider.name(), latency_ms, threshold);
                        }
                        warn!(provider = provider.name(), attempt, error = %err, "provider failed");
                        last_error = Some(err);
                    }
                }
            }

            if attempt + 1 < self.options.retry_attempts {
                let delay = self.options.retry_delay() * (attempt + 1);
                debug!(?delay, attempt, "all providers failed, backing off");
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error.unwrap_or(DispatchError::AllProvidersFailed {
            message: "no provider produced a result".to_string(),
        }))
    }

    /// Passive health-check pass over open breakers
    ///
    /// Probes run concurrently and independently; one failing probe never
    /// blocks the others. The gate timestamp is updated unconditionally so a
    /// fully-failed pass does not retrigger on the next call.
    async fn run_health_checks(&self) {
        let due = self.last_health_check.lock().elapsed() >= self.options.health_check_interval();
        if !due {
            return;
        }

        let open: Vec<_> = self
            .providers
            .iter()
            .filter(|provider| {
                self.health
                    .get(provider.name())
                    .map(|entry| entry.circuit_breaker_open)
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        if !open.is_empty() {
            let probes = open.into_iter().map(|provider| async move {
                let probe_options = GenerateOptions {
                    temperature: Some(0.0),
                    max_tokens: Some(1),
                    ..Default::default()
                };

                let start = Instant::now();
                let outcome = with_timeout(
                    provider.generate("health check", &probe_options),
                    HEALTH_PROBE_TIMEOUT,
                    "health probe timed out",
                )
                .await;

                (provider.name().to_string(), outcome.map(|_| start.elapsed()))
            });

            let threshold = self.options.circuit_breaker_threshold;
            for (name, outcome) in join_all(probes).await {
                match outcome {
                    Ok(elapsed) => {
                        info!(provider = %name, "health probe succeeded, closing breaker");
                        if let Some(mut entry) = self.health.get_mut(&name) {
                            entry.record_success(&name, elapsed.as_secs_f64() * 1000.0);
                        }
                    }
                    Err(err) => {
                        debug!(provider = %name, error = %err, "health probe failed");
                        if let Some(mut entry) = self.health.get_mut(&name) {
                            entry.record_failure(&name, HEALTH_PROBE_PENALTY_MS, threshold);
                        }
                    }
                }
            }
        }

        *self.last_health_check.lock() = Instant::now();
    }
}

#[async_trait]
impl ModelProvider for ResilientFallbackProvider {
    fn name(&self) -> &str {
        &self.name
    }

    /// Union of the children's capabilities
    fn capabilities(&self) -> ProviderCapabilities {
        self.providers.iter().fold(
            ProviderCapabilities {
                vision: false,
                streaming: false,
                tool_calling: false,
                max_tokens: 0,
            },
            |mut union, provider| {
                let caps = provider.capabilities();
                union.vision |= caps.vision;
                union.streaming |= caps.streaming;
                union.tool_calling |= caps.tool_calling;
                union.max_tokens = union.max_tokens.max(caps.max_tokens);
                union
            },
        )
    }

    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<GenerateResult> {
        self.generate_with_fallback(prompt, options).await
    }

    /// Available while any wrapped provider's breaker allows traffic
    async fn is_available(&self) -> bool {
        let timeout = self.options.circuit_breaker_timeout();
        self.health
            .iter()
            .any(|entry| entry.value().should_try(timeout))
    }

    /// Tear down every wrapped provider, aggregating failures
    ///
    /// Each child's outcome is collected; a failing child never hides the
    /// others' teardown.
    async fn shutdown(&self) -> Result<()> {
        let mut failures = Vec::new();
        for provider in &self.providers {
            if let Err(err) = provider.shutdown().await {
                warn!(provider = provider.name(), error = %err, "provider shutdown failed");
                failures.push((provider.name().to_string(), err.to_string()));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DispatchError::ShutdownFailed { failures })
        }
    }
}
