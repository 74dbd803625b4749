//! HTTP client for the Maker API.
//!
//! Talks either directly to the hub on the local network or to the cloud
//! relay, depending on the configured access mode and whether the hub
//! answers locally.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{debug, info};

use super::HubClient;
use crate::devices::value_text;
use crate::error::{HubError, Result};

/// Cloud relay root.
const CLOUD_API_URL: &str = "https://cloud.hubitat.com/api";

/// How long a local reachability probe may take.
const PROBE_TIMEOUT: Duration = Duration::from_millis(1500);

/// How to reach the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    /// Local when the hub answers on the LAN, cloud otherwise.
    #[default]
    Auto,
    /// Always talk to the hub directly.
    Local,
    /// Always go through the cloud relay.
    Cloud,
}

impl AccessMode {
    /// Returns the mode as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Local => "local",
            Self::Cloud => "cloud",
        }
    }
}

impl FromStr for AccessMode {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "local" => Ok(Self::Local),
            "cloud" => Ok(Self::Cloud),
            _ => Err(HubError::config(format!(
                "Unknown access mode '{s}'. Expected: auto, local, or cloud"
            ))),
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Picks the Maker API base URL for the given mode and hub identity.
///
/// `local_reachable` is only consulted in [`AccessMode::Auto`].
pub fn select_base_url(
    mode: AccessMode,
    hub_id: Option<&str>,
    hub_ip: Option<&str>,
    app_id: u32,
    local_reachable: bool,
) -> Result<String> {
    let local = hub_ip.map(|ip| format!("http://{ip}/apps/api/{app_id}/"));
    let cloud = hub_id.map(|id| format!("{CLOUD_API_URL}/{id}/apps/{app_id}/"));

    let selected = match mode {
        AccessMode::Local => local.ok_or_else(|| {
            HubError::upstream("Hub IP not found. Use `hb ip <ADDRESS>` or switch to cloud mode.")
        })?,
        AccessMode::Cloud => cloud.ok_or_else(|| {
            HubError::upstream("Hub ID not found. Use `hb hubid <ID>` or switch to local mode.")
        })?,
        AccessMode::Auto => match (local, cloud) {
            (Some(local), _) if local_reachable => local,
            (_, Some(cloud)) => cloud,
            (Some(local), None) => local,
            (None, None) => {
                return Err(HubError::upstream(
                    "Hub IP not found. Use `hb ip <ADDRESS>` or `hb hubid <ID>`.",
                ))
            }
        },
    };
    Ok(selected)
}

/// Checks whether the hub accepts TCP connections at `address`
/// (port 80 unless one is given).
pub async fn is_reachable(address: &str) -> bool {
    let target = if address.contains(':') {
        address.to_string()
    } else {
        format!("{address}:80")
    };
    let reachable = matches!(
        tokio::time::timeout(PROBE_TIMEOUT, TcpStream::connect(&target)).await,
        Ok(Ok(_))
    );
    debug!("Hub at {target} reachable: {reachable}");
    reachable
}

/// Maker API client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpHubClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl HttpHubClient {
    /// Creates a client for a resolved base URL.
    pub fn new(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HubError::api(format!("Failed to create HTTP client: {}", e)))?;

        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            client,
            base_url,
            access_token: access_token.into(),
        })
    }

    /// Resolves the endpoint for `mode` (probing the hub in auto mode) and
    /// creates a client for it.
    pub async fn connect(
        mode: AccessMode,
        access_token: &str,
        hub_id: Option<&str>,
        hub_ip: Option<&str>,
        app_id: u32,
        timeout: Duration,
    ) -> Result<Self> {
        let reachable = match (mode, hub_ip) {
            (AccessMode::Auto, Some(ip)) => is_reachable(ip).await,
            _ => false,
        };
        let base_url = select_base_url(mode, hub_id, hub_ip, app_id, reachable)?;
        info!("Using Maker API at {base_url}");
        Self::new(base_url, access_token, timeout)
    }

    /// Returns the base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the request URL for a path and its positional arguments.
    ///
    /// Arguments are form-encoded and comma-joined into one trailing path
    /// segment; structured arguments are sent as JSON text.
    pub fn url_for(&self, path: &str, args: &[Value]) -> String {
        let mut url = format!("{}{}", self.base_url, path.trim_start_matches('/'));
        if !args.is_empty() {
            let encoded: Vec<String> = args.iter().map(encode_argument).collect();
            url.push('/');
            url.push_str(&encoded.join(","));
        }
        url
    }
}

fn encode_argument(arg: &Value) -> String {
    let text = match arg {
        Value::Object(_) | Value::Array(_) => arg.to_string(),
        other => value_text(other),
    };
    url::form_urlencoded::byte_serialize(text.as_bytes()).collect()
}

#[async_trait]
impl HubClient for HttpHubClient {
    async fn call(&self, path: &str, args: &[Value]) -> Result<Value> {
        let url = self.url_for(path, args);
        debug!("hub request: {url}");

        let response = self
            .client
            .get(&url)
            .query(&[("access_token", self.access_token.as_str())])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(HubError::api(
                "Hub rejected the access token. Check your API key with `hb apikey`.",
            ));
        }
        if !status.is_success() {
            return Err(HubError::api(format!("Hub returned HTTP {status} for {path}")));
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        let result: Value = serde_json::from_str(&body)
            .map_err(|e| HubError::api(format!("Invalid JSON from hub: {e}")))?;
        debug!("hub response: {result}");
        Ok(result)
    }
}
