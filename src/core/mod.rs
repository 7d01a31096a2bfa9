//! Core routing and resilience components
//!
//! Two free-standing strategies share the provider contract and ledger
//! shapes but are deliberately not unified under a common base:
//!
//! - `router` - scored provider selection with cost/thermal/performance
//!   awareness plus an ordered fallback walk on failure
//! - `fallback` - circuit-breaker-guarded ordered failover with retry and
//!   passive health checks
//!
//! A fallback-wrapped provider satisfies the provider contract itself, so it
//! can be nested or appear as one of the router's candidates.

pub mod fallback;
pub mod provider;
pub mod router;
pub mod types;

pub use fallback::{ProviderHealth, ResilientFallbackProvider};
pub use provider::{ModelProvider, ProviderKind};
pub use router::{CapabilityRouter, ProviderStats, RoutingDecision};
pub use types::{
    CapabilityRequest, FinishReason, GenerateOptions, GenerateResult, ProviderCapabilities,
    TokenUsage,
};
