//! Configuration management for hubquick.
//!
//! Settings that are not secrets (access mode, Maker API app id, display
//! options, catalog sources) live in a TOML file and are saved back when the
//! user changes them from the command line.

use crate::error::{HubError, Result};
use crate::hub::AccessMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Public color-names document used to build the color table.
pub const DEFAULT_COLORS_URL: &str =
    "https://raw.githubusercontent.com/jonathantneal/color-names/master/color-names.json";

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// How to reach the hub.
    #[serde(default)]
    pub hub: HubConfig,

    /// Chooser display options.
    #[serde(default)]
    pub display: DisplayConfig,

    /// Where catalog data comes from.
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Hub access configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubConfig {
    /// Local, cloud, or automatic endpoint selection.
    #[serde(default)]
    pub mode: AccessMode,

    /// Maker API app instance id.
    #[serde(default = "default_app_id")]
    pub app_id: u32,

    /// Timeout for every hub request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Wait between verification re-checks, in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_app_id() -> u32 {
    5
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_retry_delay_ms() -> u64 {
    1000
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            mode: AccessMode::default(),
            app_id: default_app_id(),
            request_timeout_secs: default_request_timeout_secs(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl HubConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Display options passed to suggestion and availability logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    /// Show each device's status next to it instead of offering `status`.
    #[serde(default)]
    pub show_status: bool,
}

/// Catalog source configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// URL of the `{"#hex": "Name"}` color-names document.
    #[serde(default = "default_colors_url")]
    pub colors_url: String,
}

fn default_colors_url() -> String {
    DEFAULT_COLORS_URL.to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            colors_url: default_colors_url(),
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hubquick")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| HubError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            HubError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Writes the configuration to `path`, creating parent directories.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                HubError::config(format!("Failed to create config directory: {e}"))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| HubError::config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| HubError::config(format!("Failed to write config file: {e}")))
    }
}
