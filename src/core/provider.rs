//! Model provider contract
//!
//! Defines the unified interface every backend must satisfy. The required
//! core is `name` plus `generate`; availability probing and teardown are
//! default trait methods so implementations that have nothing to say get
//! sensible behavior (`true` / no-op) for free.

use async_trait::async_trait;

use crate::core::types::{GenerateOptions, GenerateResult, ProviderCapabilities};
use crate::utils::error::Result;

/// Name marker for the local accelerated runtime (GPU-backed, in-process)
pub const LOCAL_ACCELERATED_MARKER: &str = "mlx";

/// Name marker for the local daemon runtime (out-of-process, socket-served)
pub const LOCAL_DAEMON_MARKER: &str = "ollama";

/// Unified provider interface
///
/// # Design Principles
///
/// 1. **Capability driven**: backends declare what they support through
///    `capabilities()`, and routing only matches requests against those
///    declarations
/// 2. **Provider agnostic**: callers never see backend-specific details
/// 3. **Async first**: every I/O-shaped operation is asynchronous
///
/// Provider names must be unique within any router or fallback wrapper that
/// holds them; the ledgers are keyed by name.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Unique provider name, e.g. `"mlx-local"` or `"openai-gpt4"`
    ///
    /// The substring before the first `-` identifies the provider type and
    /// keys both pricing and kind classification.
    fn name(&self) -> &str;

    /// Static capability descriptor for this backend
    fn capabilities(&self) -> ProviderCapabilities;

    /// Produce a generation result for the given prompt
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<GenerateResult>;

    /// Lightweight availability probe
    ///
    /// Providers that cannot cheaply answer report `true` and let failures
    /// surface through `generate`.
    async fn is_available(&self) -> bool {
        true
    }

    /// Release backend resources. Called once at teardown.
    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

/// Runtime class of a provider, inferred from its name prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// In-process accelerated runtime (subject to thermal throttling)
    LocalAccelerated,
    /// Local daemon runtime
    LocalDaemon,
    /// Remote API backend
    RemoteApi,
}

impl ProviderKind {
    /// Classify a provider by the type key in its name
    pub fn of(provider_name: &str) -> Self {
        match kind_key(provider_name) {
            LOCAL_ACCELERATED_MARKER => Self::LocalAccelerated,
            LOCAL_DAEMON_MARKER => Self::LocalDaemon,
            _ => Self::RemoteApi,
        }
    }

    /// Preferred ordering for fallback presets: accelerated first, remote last
    pub(crate) fn preset_rank(self) -> u8 {
        match self {
            Self::LocalAccelerated => 0,
            Self::LocalDaemon => 1,
            Self::RemoteApi => 2,
        }
    }

    /// Local runtimes run at zero marginal cost
    pub fn is_local(self) -> bool {
        matches!(self, Self::LocalAccelerated | Self::LocalDaemon)
    }
}

/// Provider type key: the substring before the first `-` in the name
pub fn kind_key(provider_name: &str) -> &str {
    provider_name
        .split('-')
        .next()
        .unwrap_or(provider_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_key_splits_on_first_dash() {
        assert_eq!(kind_key("openai-gpt4-turbo"), "openai");
        assert_eq!(kind_key("mlx-local"), "mlx");
        assert_eq!(kind_key("bare"), "bare");
    }

    #[test]
    fn test_provider_kind_classification() {
        assert_eq!(ProviderKind::of("mlx-local"), ProviderKind::LocalAccelerated);
        assert_eq!(ProviderKind::of("ollama-chat"), ProviderKind::LocalDaemon);
        assert_eq!(ProviderKind::of("openai-gpt4"), ProviderKind::RemoteApi);
        assert_eq!(ProviderKind::of("anthropic-claude"), ProviderKind::RemoteApi);
    }

    #[test]
    fn test_local_kinds() {
        assert!(ProviderKind::LocalAccelerated.is_local());
        assert!(ProviderKind::LocalDaemon.is_local());
        assert!(!ProviderKind::RemoteApi.is_local());
    }
}
