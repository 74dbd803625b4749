//! Error types for hubquick.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for hubquick operations.
#[derive(Error, Debug)]
pub enum HubError {
    /// Maker API errors (hub unreachable, HTTP failures, malformed responses).
    #[error("Hub API error: {0}")]
    Api(String),

    /// Something the user has to set up first (API key, hub id, hub address).
    #[error("{0}")]
    Upstream(String),

    /// Configuration errors (invalid config file, bad setting values, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog cache and secret store errors.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The resolved command needs a capability the device does not expose.
    #[error("Unsupported command for device: {device} cannot {command}")]
    CapabilityMismatch { device: String, command: String },

    /// A parameter could not be converted to the type the command expects.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HubError {
    /// Creates a hub API error with the given message.
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    /// Creates a guided "set this up first" error.
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a storage error with the given message.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Creates a capability mismatch error for a device and command.
    pub fn capability_mismatch(device: impl Into<String>, command: impl Into<String>) -> Self {
        Self::CapabilityMismatch {
            device: device.into(),
            command: command.into(),
        }
    }

    /// Creates an invalid parameter error with the given message.
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Api(_) => "Hub API Error",
            Self::Upstream(_) => "Setup Required",
            Self::Config(_) => "Configuration Error",
            Self::Storage(_) => "Storage Error",
            Self::CapabilityMismatch { .. } => "Unsupported Command",
            Self::InvalidParameter(_) => "Invalid Parameter",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns true for errors that end the run cleanly with guidance
    /// rather than as a failure.
    pub fn is_guidance(&self) -> bool {
        matches!(self, Self::Upstream(_))
    }
}

impl From<reqwest::Error> for HubError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return Self::api("Request timed out. Is the hub reachable?");
        }
        match e.status() {
            Some(status) => Self::api(format!("Hub returned HTTP {status}")),
            None => Self::api(e.to_string()),
        }
    }
}

/// Result type alias using HubError.
pub type Result<T> = std::result::Result<T, HubError>;
