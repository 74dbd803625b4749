//! Hubitat Maker API access.
//!
//! Provides the client trait the resolver and dispatcher talk to, an HTTP
//! implementation with local/cloud endpoint selection, hub discovery, and a
//! scripted mock for tests.

pub mod discovery;
mod http;
mod lazy;
mod mock;

pub use discovery::discover_hub;
pub use http::{is_reachable, select_base_url, AccessMode, HttpHubClient};
pub use lazy::{HubConnector, LazyHubClient};
pub use mock::{MockHubClient, RecordedCall};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::devices::{attributes_from_response, Attributes, Device};
use crate::error::{HubError, Result};

/// Trait for Maker API clients.
///
/// Implementations must be thread-safe (Send + Sync) to support async operations.
#[async_trait]
pub trait HubClient: Send + Sync {
    /// Calls a Maker API path (relative to the app root, e.g. `devices/all`)
    /// with optional positional arguments and returns the decoded JSON.
    async fn call(&self, path: &str, args: &[Value]) -> Result<Value>;
}

/// Fetches the full device list.
pub async fn fetch_all_devices(client: &dyn HubClient) -> Result<Vec<Device>> {
    let response = client.call("devices/all", &[]).await?;
    if response.is_null() {
        return Ok(Vec::new());
    }
    let devices: Vec<Device> = serde_json::from_value(response)
        .map_err(|e| HubError::api(format!("Unexpected device list: {e}")))?;
    debug!("Fetched {} devices", devices.len());
    Ok(devices)
}

/// Fetches the live attributes of one device.
pub async fn device_status(client: &dyn HubClient, device_id: &str) -> Result<Attributes> {
    let response = client.call(&format!("devices/{device_id}"), &[]).await?;
    Ok(attributes_from_response(&response))
}

/// Sends a command to a device and returns the hub's response.
pub async fn send_command(
    client: &dyn HubClient,
    device_id: &str,
    wire_command: &str,
    args: &[Value],
) -> Result<Value> {
    client
        .call(&format!("devices/{device_id}/{wire_command}"), args)
        .await
}
