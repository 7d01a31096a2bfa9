//! Circuit-breaker-guarded ordered failover
//!
//! - `health` - per-provider breaker ledger and transition rules
//! - `provider` - the `ResilientFallbackProvider` wrapper and its presets

pub mod health;
pub mod provider;

pub use health::ProviderHealth;
pub use provider::ResilientFallbackProvider;
