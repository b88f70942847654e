//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (delays, capacities, retry tuning, REST paths)
//! - HTTP header constants for the remote REST API
//! - The library `Config` struct and log option types

mod constants;
mod headers;
mod types;

// Re-export all constants
pub use constants::*;
pub use headers::*;
pub use types::{Config, LogFormat, LogLevel};
