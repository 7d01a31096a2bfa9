//! # model-dispatch
//!
//! Resilient provider routing for multi-backend AI agents. Given a pool of
//! interchangeable model providers (local accelerated runtimes, local daemon
//! runtimes, remote API backends), this crate picks the best provider for a
//! request, survives individual provider failures without failing the
//! caller, and avoids hammering a provider that is already down.
//!
//! ## Features
//!
//! - **Capability routing**: scored selection across capability match,
//!   observed performance, estimated cost, and host thermal pressure
//! - **Circuit breaking**: per-provider breakers with passive health probes
//!   and automatic half-open recovery
//! - **Ordered failover**: configured fallback chains with linear-backoff
//!   retry
//! - **Cost awareness**: process-local daily/monthly spend tracking with
//!   budget-pressure damping
//!
//! The two strategies compose: a [`ResilientFallbackProvider`] satisfies the
//! provider contract itself, so it can stand in as one of a
//! [`CapabilityRouter`]'s candidates.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use model_dispatch::{
//!     CapabilityRequest, CapabilityRouter, FinishReason, GenerateOptions, GenerateResult,
//!     ModelProvider, ProviderCapabilities, Result, RouterOptions, TokenUsage,
//! };
//!
//! struct EchoProvider;
//!
//! #[async_trait]
//! impl ModelProvider for EchoProvider {
//!     fn name(&self) -> &str {
//!         "ollama-echo"
//!     }
//!
//!     fn capabilities(&self) -> ProviderCapabilities {
//!         ProviderCapabilities::default()
//!     }
//!
//!     async fn generate(
//!         &self,
//!         prompt: &str,
//!         _options: &GenerateOptions,
//!     ) -> Result<GenerateResult> {
//!         Ok(GenerateResult {
//!             content: prompt.to_string(),
//!             usage: TokenUsage::default(),
//!             finish_reason: FinishReason::Stop,
//!         })
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let providers = vec![Arc::new(EchoProvider) as Arc<dyn ModelProvider>];
//!     let router = CapabilityRouter::new(providers, RouterOptions::default());
//!
//!     let reply = router
//!         .generate("hello", &GenerateOptions::default(), &CapabilityRequest::none())
//!         .await?;
//!     println!("{}", reply.content);
//!
//!     router.shutdown().await
//! }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod utils;

// Re-export main types
pub use config::{
    CostLimits, DispatchConfig, FallbackOptions, RouterOptions, ScoringWeights, ThermalOptions,
};
pub use core::fallback::{ProviderHealth, ResilientFallbackProvider};
pub use core::provider::{ModelProvider, ProviderKind};
pub use core::router::{
    CapabilityRouter, CostLedger, NullThermalProbe, ProviderStats, RoutingDecision, ThermalProbe,
    ThermalStatus,
};
pub use core::types::{
    CapabilityRequest, FinishReason, GenerateOptions, GenerateResult, ProviderCapabilities,
    TokenUsage,
};
pub use utils::error::{DispatchError, Result};
pub use utils::timeout::with_timeout;
