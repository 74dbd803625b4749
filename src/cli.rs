//! Command-line argument parsing for hubquick.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::hub::AccessMode;

/// Control Hubitat devices with short free-text commands.
#[derive(Parser, Debug)]
#[command(name = "hb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log to stderr instead of the log file
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// `on` or `off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn is_on(self) -> bool {
        self == Self::On
    }
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Print chooser suggestions for a query as JSON
    Query {
        /// Free-text query, e.g. "kitchen light dim 40"
        #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Run a command on a device
    Run {
        /// Device id
        #[arg(long, value_name = "ID")]
        device_uid: String,

        /// Command keyword, e.g. on, dim, color
        #[arg(long, value_name = "CMD", default_value = "")]
        device_command: String,

        /// Command parameters
        #[arg(long, value_name = "PARAM", num_args = 0..)]
        device_params: Vec<String>,
    },

    /// Resolve a query and run it when it names one device and command
    Do {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        text: Vec<String>,
    },

    /// Refresh the cached devices and colors from the hub
    Update,

    /// Save the Maker API access token
    Apikey { key: String },

    /// Save the hub id used for cloud access
    Hubid { id: String },

    /// Save the hub's local IP address
    Ip { address: String },

    /// Set how the hub is reached
    Mode {
        #[arg(value_parser = parse_mode)]
        mode: AccessMode,
    },

    /// Show device status in suggestions
    Showstatus {
        #[arg(value_enum)]
        value: Toggle,
    },

    /// Delete cached data, settings and stored keys
    Reinit,
}

fn parse_mode(s: &str) -> Result<AccessMode, String> {
    s.parse().map_err(|e: crate::error::HubError| e.to_string())
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::Config::default_path)
    }
}
