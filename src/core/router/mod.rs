//! Scored provider selection
//!
//! ## Module Structure
//!
//! - `router` - the `CapabilityRouter` and its selection/generation flow
//! - `scoring` - the four scoring factors and their weights
//! - `stats` - per-provider usage ledger (EMA latency)
//! - `cost` - pricing table, token estimation, process-wide spend ledger
//! - `thermal` - probe contract and derived throttling signal

pub mod cost;
pub mod router;
pub mod scoring;
pub mod stats;
pub mod thermal;

#[cfg(test)]
mod tests;

pub use cost::CostLedger;
pub use router::{CapabilityRouter, RoutingDecision};
pub use scoring::ScoreBreakdown;
pub use stats::ProviderStats;
pub use thermal::{NullThermalProbe, ThermalProbe, ThermalStatus};
