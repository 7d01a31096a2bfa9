//! Thermal throttling signal
//!
//! The router samples an external probe on an interval and derives a
//! throttling flag consumed only by the scoring function. The probe contract
//! is a small integer thermal state: 0 is nominal, 3 and above means the
//! host is throttling. How the host produces that integer is an OS concern
//! and stays outside this crate.

use std::time::Instant;

use async_trait::async_trait;

use crate::utils::error::Result;

/// Raw probe reading at which the host counts as throttling
pub const THROTTLE_STATE: u32 = 3;

/// External thermal probe contract
#[async_trait]
pub trait ThermalProbe: Send + Sync {
    /// Current raw thermal state: 0 = nominal, >= 3 = throttling
    async fn read_state(&self) -> Result<u32>;
}

/// Probe for hosts without thermal reporting; always nominal
#[derive(Debug, Clone, Copy, Default)]
pub struct NullThermalProbe;

#[async_trait]
impl ThermalProbe for NullThermalProbe {
    async fn read_state(&self) -> Result<u32> {
        Ok(0)
    }
}

/// Derived throttling signal
#[derive(Debug, Clone, Copy)]
pub struct ThermalStatus {
    /// Temperature estimate in degrees Celsius
    pub temperature: f64,

    /// Whether the host is currently throttling
    pub is_throttling: bool,

    /// When the probe was last sampled
    pub last_check: Instant,
}

impl ThermalStatus {
    /// Status assumed before the first probe sample lands
    pub fn nominal() -> Self {
        from_reading(0)
    }
}

/// Map a raw probe reading to a status
pub fn from_reading(reading: u32) -> ThermalStatus {
    ThermalStatus {
        temperature: (reading as f64 * 10.0 + 40.0).min(100.0),
        is_throttling: reading >= THROTTLE_STATE,
        last_check: Instant::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nominal_reading() {
        let status = from_reading(0);
        assert_eq!(status.temperature, 40.0);
        assert!(!status.is_throttling);
    }

    #[test]
    fn test_throttling_starts_at_three() {
        assert!(!from_reading(2).is_throttling);
        assert!(from_reading(3).is_throttling);
        assert!(from_reading(5).is_throttling);
    }

    #[test]
    fn test_temperature_is_capped() {
        assert_eq!(from_reading(3).temperature, 70.0);
        assert_eq!(from_reading(6).temperature, 100.0);
        assert_eq!(from_reading(50).temperature, 100.0);
    }

    #[tokio::test]
    async fn test_null_probe_is_nominal() {
        let probe = NullThermalProbe;
        assert_eq!(probe.read_state().await.unwrap(), 0);
    }
}
