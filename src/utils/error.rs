//! Error types for routing and fallback execution
//!
//! A single error enum covers both resilience strategies. Callers only ever
//! see one of these; individual provider failures that were routed around
//! are recorded in the ledgers but never surfaced.

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Dispatch error types
#[derive(Debug, Clone, thiserror::Error)]
pub enum DispatchError {
    /// Every configured provider is unavailable, or none are configured
    #[error("no available providers")]
    NoAvailableProviders,

    /// Every wrapped provider has an open circuit breaker
    #[error("no healthy providers available")]
    NoHealthyProviders,

    /// A single provider's generate call failed
    #[error("provider '{provider}' failed: {message}")]
    Generation { provider: String, message: String },

    /// Every fallback and retry option was exhausted
    #[error("all providers failed: {message}")]
    AllProvidersFailed { message: String },

    /// A bounded wait expired
    #[error("{0}")]
    Timeout(String),

    /// Configuration parsing or validation failed
    #[error("configuration error: {0}")]
    Config(String),

    /// One or more providers failed to shut down cleanly
    #[error("shutdown failed for {} provider(s)", .failures.len())]
    ShutdownFailed {
        /// (provider name, error message) per failed teardown
        failures: Vec<(String, String)>,
    },
}

impl DispatchError {
    /// Construct a generation failure for the given provider
    pub fn generation(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Generation {
            provider: provider.into(),
            message: message.into(),
        }
    }
}
