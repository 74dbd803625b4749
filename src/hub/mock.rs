//! Mock hub client for testing.
//!
//! Supports scripted status sequences and call recording so dispatch and
//! verification can be tested without a hub.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::HubClient;
use crate::devices::Device;
use crate::error::{HubError, Result};

/// A call made against the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub path: String,
    pub args: Vec<Value>,
}

/// Mock hub with scripted responses and call recording.
#[derive(Debug, Default)]
pub struct MockHubClient {
    devices: Vec<Device>,
    /// Status responses per device id. The last one repeats.
    statuses: Mutex<HashMap<String, VecDeque<Value>>>,
    /// Response to command calls; `{}` when unset.
    command_response: Option<Value>,
    fail: bool,
    calls: Mutex<Vec<RecordedCall>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockHubClient {
    /// Creates a mock with no devices and empty responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the device list returned by `devices/all`.
    pub fn with_devices(mut self, devices: Vec<Device>) -> Self {
        self.devices = devices;
        self
    }

    /// Sets a fixed status response for a device.
    pub fn with_status(self, device_id: &str, status: Value) -> Self {
        self.with_status_sequence(device_id, vec![status])
    }

    /// Sets successive status responses for a device; the last one repeats.
    pub fn with_status_sequence(self, device_id: &str, statuses: Vec<Value>) -> Self {
        lock(&self.statuses).insert(device_id.to_string(), statuses.into());
        self
    }

    /// Sets the response returned by command calls.
    pub fn with_command_response(mut self, response: Value) -> Self {
        self.command_response = Some(response);
        self
    }

    /// Makes every call fail with an API error.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Copies of all calls made so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Calls whose path starts with `prefix`.
    pub fn calls_to(&self, prefix: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.path.starts_with(prefix))
            .collect()
    }

    fn next_status(&self, device_id: &str) -> Value {
        let mut statuses = lock(&self.statuses);
        match statuses.get_mut(device_id) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(Value::Null),
            Some(queue) => queue.front().cloned().unwrap_or(Value::Null),
            None => json!({}),
        }
    }
}

#[async_trait]
impl HubClient for MockHubClient {
    async fn call(&self, path: &str, args: &[Value]) -> Result<Value> {
        lock(&self.calls).push(RecordedCall {
            path: path.to_string(),
            args: args.to_vec(),
        });

        if self.fail {
            return Err(HubError::api("mock hub unavailable"));
        }

        let segments: Vec<&str> = path.split('/').collect();
        match segments.as_slice() {
            ["devices", "all"] => serde_json::to_value(&self.devices)
                .map_err(|e| HubError::internal(e.to_string())),
            ["devices", id] => Ok(self.next_status(id)),
            ["devices", _, _] => Ok(self.command_response.clone().unwrap_or_else(|| json!({}))),
            _ => Err(HubError::api(format!("mock has no route for {path}"))),
        }
    }
}
