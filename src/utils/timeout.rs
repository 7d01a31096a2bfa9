//! Bounded-wait helper
//!
//! Wraps a future with a deadline and converts expiry into
//! [`DispatchError::Timeout`]. The health-probe path is the only caller with
//! an explicit bounded wait; provider calls are otherwise governed by the
//! provider's own timeout.

use std::future::Future;
use std::time::Duration;

use crate::utils::error::{DispatchError, Result};

/// Await `future` for at most `duration`, failing with `message` on expiry.
pub async fn with_timeout<F, T>(future: F, duration: Duration, message: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(DispatchError::Timeout(message.to_string())),
    }
}
