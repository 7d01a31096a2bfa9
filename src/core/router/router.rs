//! Capability router core
//!
//! The central orchestrator for scored provider selection. Scoring is
//! stateless per call; the router owns the stateful pieces it reads and
//! writes: the per-provider usage ledger, the process-wide cost ledger, and
//! the sampled thermal status.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::RouterOptions;
use crate::core::provider::ModelProvider;
use crate::core::router::cost::{self, CostLedger};
use crate::core::router::scoring;
use crate::core::router::stats::ProviderStats;
use crate::core::router::thermal::{self, NullThermalProbe, ThermalProbe, ThermalStatus};
use crate::core::types::{CapabilityRequest, GenerateOptions, GenerateResult};
use crate::utils::error::{DispatchError, Result};

/// Interval of the daily cost reset tick
const COST_RESET_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Outcome of a selection pass
///
/// Created fresh per call and never persisted.
#[derive(Clone)]
pub struct RoutingDecision {
    /// The winning provider
    pub provider: Arc<dyn ModelProvider>,

    /// Human-readable selection reason
    pub reason: String,

    /// Composite score in `[0, 1]`
    pub score: f64,

    /// Estimated dollar cost of the pending call
    pub estimated_cost: f64,

    /// The winner's smoothed latency, 0 when it has no history
    pub estimated_latency_ms: f64,
}

impl fmt::Debug for RoutingDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutingDecision")
            .field("provider", &self.provider.name())
            .field("score", &self.score)
            .field("estimated_cost", &self.estimated_cost)
            .field("estimated_latency_ms", &self.estimated_latency_ms)
            .finish()
    }
}

/// Scored provider selection with cost/thermal/performance awareness
pub struct CapabilityRouter {
    /// Configured providers, in configuration order (the tie-break order)
    pub(crate) providers: Vec<Arc<dyn ModelProvider>>,

    /// Router settings
    pub(crate) options: RouterOptions,

    /// Usage ledger, one entry per configured provider
    pub(crate) stats: DashMap<String, ProviderStats>,

    /// Process-wide spend tracker
    pub(crate) cost: Arc<Mutex<CostLedger>>,

    /// Last sampled thermal status
    pub(crate) thermal: Arc<RwLock<ThermalStatus>>,

    /// External thermal probe
    pub(crate) probe: Arc<dyn ThermalProbe>,

    /// Background task handles, aborted on shutdown
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl CapabilityRouter {
    /// Create a router over the given providers
    ///
    /// Every provider gets a ledger entry that lives as long as the router;
    /// scores and stats are never computed for unconfigured names.
    pub fn new(providers: Vec<Arc<dyn ModelProvider>>, options: RouterOptions) -> Self {
        let stats = DashMap::new();
        for provider in &providers {
            stats.insert(provider.name().to_string(), ProviderStats::default());
        }

        Self {
            providers,
            options,
            stats,
            cost: Arc::new(Mutex::new(CostLedger::new())),
            thermal: Arc::new(RwLock::new(ThermalStatus::nominal())),
            probe: Arc::new(NullThermalProbe),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Attach a thermal probe (builder pattern)
    pub fn with_probe(mut self, probe: Arc<dyn ThermalProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Router settings
    pub fn options(&self) -> &RouterOptions {
        &self.options
    }

    /// Configured providers in configuration order
    pub fn providers(&self) -> &[Arc<dyn ModelProvider>] {
        &self.providers
    }

    // ========== Selection ==========

    /// Score every available provider and pick the best
    ///
    /// # Flow
    ///
    /// 1. Probe `is_available()` on each configured provider, skip the rest
    /// 2. Score each candidate in `[0, 1]` across the four factors
    /// 3. Stable-sort descending; ties keep configuration order
    pub async fn select_provider(
        &self,
        prompt: &str,
        options: &GenerateOptions,
        required: &CapabilityRequest,
    ) -> Result<RoutingDecision> {
        let mut candidates = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            if provider.is_available().await {
                candidates.push(provider.clone());
            } else {
                debug!(provider = provider.name(), "skipping unavailable provider");
            }
        }

        if candidates.is_empty() {
            return Err(DispatchError::NoAvailableProviders);
        }

        let thermal = *self.thermal.read();
        let daily_spend = self.cost.lock().daily_cost;

        let mut scored: Vec<(Arc<dyn ModelProvider>, scoring::ScoreBreakdown, f64, f64)> =
            candidates
                .into_iter()
                .map(|provider| {
                    let name = provider.name();
                    let estimated_cost = cost::estimate_cost(name, prompt, options);
                    let stats = self
                        .stats
                        .get(name)
                        .map(|entry| entry.value().clone())
                        .unwrap_or_default();

                    let breakdown = scoring::score(
                        &self.options.weights,
                        &provider.capabilities(),
                        required,
                        options,
                        &stats,
                        estimated_cost,
                        daily_spend,
                        self.options.cost_limits.daily,
                        name,
                        self.options.thermal.enabled,
                        &thermal,
                    );

                    (provider, breakdown, estimated_cost, stats.average_latency_ms)
                })
                .collect();

        // Stable sort: equal scores keep configuration order
        scored.sort_by(|a, b| {
            b.1.total
                .partial_cmp(&a.1.total)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let (provider, breakdown, estimated_cost, estimated_latency_ms) = scored.remove(0);
        debug!(
            provider = provider.name(),
            score = breakdown.total,
            "selected provider"
        );

        Ok(RoutingDecision {
            provider,
            reason: breakdown.reason(),
            score: breakdown.total,
            estimated_cost,
            estimated_latency_ms,
        })
    }

    // ========== Generation ==========

    /// Select the best provider and generate, falling back on failure
    ///
    /// The winner's success updates its ledger entry and the cost ledger.
    /// On failure the configured fallback name-list is walked in order
    /// (excluding the failed provider) without rescoring; the first success
    /// wins. Exhausting the list raises an aggregate error carrying the
    /// initial failure's message.
    pub async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
        required: &CapabilityRequest,
    ) -> Result<GenerateResult> {
        let decision = self.select_provider(prompt, options, required).await?;
        let primary = decision.provider.clone();

        let start = Instant::now();
        match primary.generate(prompt, options).await {
            Ok(result) => {
                self.record_success(primary.name(), &result, start.elapsed());
                Ok(result)
            }
            Err(err) => {
                warn!(
                    provider = primary.name(),
                    error = %err,
                    "primary provider failed, walking fallback chain"
                );
                if let Some(mut entry) = self.stats.get_mut(primary.name()) {
                    entry.record_error();
                }
                self.run_fallback_chain(primary.name(), prompt, options, err)
                    .await
            }
        }
    }

    /// Ordered fallback walk; pure trial, no scoring
    async fn run_fallback_chain(
        &self,
        failed: &str,
        prompt: &str,
        options: &GenerateOptions,
        initial: DispatchError,
    ) -> Result<GenerateResult> {
        for name in self.effective_fallback_order(failed) {
            let Some(provider) = self.provider_by_name(&name) else {
                debug!(provider = %name, "fallback names an unconfigured provider, skipping");
                continue;
            };

            let start = Instant::now();
            match provider.generate(prompt, options).await {
                Ok(result) => {
                    info!(provider = %name, "fallback provider succeeded");
                    self.record_success(&name, &result, start.elapsed());
                    return Ok(result);
                }
                Err(err) => {
                    debug!(provider = %name, error = %err, "fallback provider failed");
                    if let Some(mut entry) = self.stats.get_mut(&name) {
                        entry.record_error();
                    }
                }
            }
        }

        Err(DispatchError::AllProvidersFailed {
            message: initial.to_string(),
        })
    }

    /// The fallback name-list for a given failed provider
    ///
    /// An explicit fallback order wins; otherwise the default provider (if
    /// configured and distinct from the failed one) acts as a one-element
    /// chain.
    fn effective_fallback_order(&self, failed: &str) -> Vec<String> {
        if !self.options.fallback_order.is_empty() {
            return self
                .options
                .fallback_order
                .iter()
                .filter(|name| name.as_str() != failed)
                .cloned()
                .collect();
        }

        match &self.options.default_provider {
            Some(name) if name != failed => vec![name.clone()],
            _ => Vec::new(),
        }
    }

    fn provider_by_name(&self, name: &str) -> Option<Arc<dyn ModelProvider>> {
        self.providers
            .iter()
            .find(|provider| provider.name() == name)
            .cloned()
    }

    fn record_success(&self, name: &str, result: &GenerateResult, elapsed: Duration) {
        let tokens = u64::from(result.usage.total_tokens);
        let call_cost = cost::cost_of_tokens(name, tokens);

        if let Some(mut entry) = self.stats.get_mut(name) {
            entry.record_success(tokens, call_cost, elapsed.as_secs_f64() * 1000.0);
        }

        self.cost.lock().record(call_cost);
    }

    // ========== Accessors ==========

    /// Snapshot of the per-provider usage ledger
    pub fn usage_stats(&self) -> HashMap<String, ProviderStats> {
        self.stats
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Snapshot of the spend tracker
    pub fn cost_snapshot(&self) -> CostLedger {
        self.cost.lock().clone()
    }

    /// Last sampled thermal status
    pub fn thermal_status(&self) -> ThermalStatus {
        *self.thermal.read()
    }

    // ========== Background Tasks ==========

    /// Start the thermal sampler and the daily cost reset tick
    ///
    /// Both handles are stored on the router and aborted by `shutdown`, so
    /// discarding the router without calling it leaks no scheduled work
    /// beyond the handles' abort-on-drop registration.
    pub fn start_background_tasks(&self) {
        let mut tasks = self.tasks.lock();

        if self.options.thermal.enabled {
            let probe = self.probe.clone();
            let status = self.thermal.clone();
            let interval = self.options.thermal.check_interval();

            tasks.push(tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    match probe.read_state().await {
                        Ok(reading) => {
                            let next = thermal::from_reading(reading);
                            if next.is_throttling {
                                warn!(reading, temperature = next.temperature, "host is throttling");
                            }
                            *status.write() = next;
                        }
                        Err(err) => debug!(error = %err, "thermal probe read failed"),
                    }
                }
            }));
        }

        let cost = self.cost.clone();
        tasks.push(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(COST_RESET_INTERVAL);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                cost.lock().roll_daily(Utc::now());
                debug!("daily cost counters reset");
            }
        }));
    }

    /// Stop background work and tear down every provider
    ///
    /// Teardown failures are collected per provider and aggregated; one
    /// failing child never hides the others' outcomes.
    pub async fn shutdown(&self) -> Result<()> {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }

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
