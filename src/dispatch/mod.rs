//! Command dispatch.
//!
//! Executes a resolved command against the hub and verifies the result.

mod executor;

pub use executor::{CommandExecutor, Outcome, DEFAULT_RETRY_DELAY, MAX_VERIFY_RETRIES};
