//! Shared utilities for the dispatch layer

pub mod error;
pub mod timeout;

pub use error::{DispatchError, Result};
pub use timeout::with_timeout;
