//! Configuration for the dispatch layer
//!
//! This module handles loading, validation, and defaults for every tunable
//! the router and fallback wrapper recognize. Durations are configured in
//! whole seconds (delays in milliseconds) and exposed to the core as
//! [`std::time::Duration`] through accessor methods.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::utils::error::{DispatchError, Result};

/// Top-level configuration for both resilience strategies
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Capability router settings
    pub router: RouterOptions,

    /// Fallback chain settings
    pub fallback: FallbackOptions,
}

impl DispatchConfig {
    /// Load configuration from a YAML file
    pub async fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("loading dispatch configuration from {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DispatchError::Config(format!("failed to read config file: {}", e)))?;

        Self::from_yaml_str(&content)
    }

    /// Parse and validate configuration from a YAML string
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| DispatchError::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        debug!("dispatch configuration loaded");
        Ok(config)
    }

    /// Validate the full configuration
    pub fn validate(&self) -> Result<()> {
        self.router.validate()?;
        self.fallback.validate()
    }
}

/// Capability router settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterOptions {
    /// Provider to prefer as a one-element fallback chain when no explicit
    /// fallback order is configured
    pub default_provider: Option<String>,

    /// Ordered fallback name-list walked after a primary failure
    pub fallback_order: Vec<String>,

    /// Scoring factor weights
    pub weights: ScoringWeights,

    /// Process-wide spend limits
    pub cost_limits: CostLimits,

    /// Thermal throttling awareness
    pub thermal: ThermalOptions,
}

impl RouterOptions {
    fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        self.cost_limits.validate()?;
        self.thermal.validate()?;

        if self.fallback_order.iter().any(|name| name.is_empty()) {
            return Err(DispatchError::Config(
                "fallback_order entries must be non-empty provider names".to_string(),
            ));
        }

        Ok(())
    }
}

/// Weights applied to the four scoring factors
///
/// Must be non-negative and sum to 1.0 so composite scores stay in `[0, 1]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub capability: f64,
    pub performance: f64,
    pub cost: f64,
    pub thermal: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            capability: 0.40,
            performance: 0.30,
            cost: 0.20,
            thermal: 0.10,
        }
    }
}

impl ScoringWeights {
    fn validate(&self) -> Result<()> {
        let weights = [self.capability, self.performance, self.cost, self.thermal];
        if weights.iter().any(|w| *w < 0.0) {
            return Err(DispatchError::Config(
                "scoring weights must be non-negative".to_string(),
            ));
        }

        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(DispatchError::Config(format!(
                "scoring weights must sum to 1.0, got {}",
                sum
            )));
        }

        Ok(())
    }
}

/// Process-wide spend limits in dollars
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CostLimits {
    /// Daily spend limit; scoring penalizes paid providers past 80% of it
    pub daily: Option<f64>,

    /// Monthly spend limit
    pub monthly: Option<f64>,
}

impl CostLimits {
    fn validate(&self) -> Result<()> {
        for (label, limit) in [("daily", self.daily), ("monthly", self.monthly)] {
            if let Some(value) = limit {
                if value <= 0.0 {
                    return Err(DispatchError::Config(format!(
                        "{} cost limit must be positive",
                        label
                    )));
                }
            }
        }

        if let (Some(daily), Some(monthly)) = (self.daily, self.monthly) {
            if daily > monthly {
                return Err(DispatchError::Config(
                    "daily cost limit cannot exceed the monthly limit".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Thermal throttling awareness settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermalOptions {
    /// Whether thermal state influences scoring at all
    pub enabled: bool,

    /// Temperature ceiling used for reporting
    pub max_temp: f64,

    /// Seconds between probe samples
    pub check_interval_secs: u64,
}

impl Default for ThermalOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            max_temp: 85.0,
            check_interval_secs: 30,
        }
    }
}

impl ThermalOptions {
    /// Probe sampling interval
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.max_temp <= 0.0 {
            return Err(DispatchError::Config(
                "thermal max_temp must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fallback chain settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackOptions {
    /// Seconds between passive health-check passes
    pub health_check_interval_secs: u64,

    /// Consecutive failures that open a provider's circuit breaker
    pub circuit_breaker_threshold: u32,

    /// Seconds an open breaker blocks traffic before a probe is allowed
    pub circuit_breaker_timeout_secs: u64,

    /// Full passes over the eligible provider list
    pub retry_attempts: u32,

    /// Base backoff in milliseconds; attempt `n` sleeps `base * (n + 1)`
    pub retry_delay_ms: u64,
}

impl Default for FallbackOptions {
    fn default() -> Self {
        Self {
            health_check_interval_secs: 30,
            circuit_breaker_threshold: 5,
            circuit_breaker_timeout_secs: 60,
            retry_attempts: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl FallbackOptions {
    /// Passive health-check gating interval
    pub fn health_check_interval(&self) -> Duration {
        Duration::from_secs(self.health_check_interval_secs)
    }

    /// Open-breaker cooldown before a probe is allowed
    pub fn circuit_breaker_timeout(&self) -> Duration {
        Duration::from_secs(self.circuit_breaker_timeout_secs)
    }

    /// Base retry backoff
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.retry_attempts == 0 {
            return Err(DispatchError::Config(
                "retry_attempts must be at least 1".to_string(),
            ));
        }

        if self.circuit_breaker_threshold == 0 {
            return Err(DispatchError::Config(
                "circuit_breaker_threshold must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
