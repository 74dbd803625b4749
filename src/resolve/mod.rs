//! Free-text query resolution.
//!
//! Turns a query such as `kitchen light dim 40` into a device, a command
//! keyword and its parameters, or into the set of candidate devices when the
//! query is ambiguous.

pub mod matcher;
mod resolver;

pub use matcher::{match_devices, Scorer, WordScorer};
pub use resolver::{resolve, ResolvedQuery};
