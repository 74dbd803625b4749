//! Command execution with verification.
//!
//! Sends a command to a device, then confirms it took effect by comparing
//! the command's verification attribute with the value it should now hold.
//! The hub applies many commands asynchronously, so a mismatch is re-checked
//! a bounded number of times against freshly fetched status.

use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::commands::{materialize, resolve_toggle_live, Catalog, CommandDef, EXECUTION_CATALOG};
use crate::devices::{attributes_from_response, value_text, Attributes, ColorTable, Device};
use crate::error::{HubError, Result};
use crate::hub::{self, HubClient};
use crate::notify::{Notifier, NOTIFY_TITLE};

/// Status re-checks after the initial response.
pub const MAX_VERIFY_RETRIES: usize = 2;

/// Wait before each status re-check.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Result of dispatching a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The keyword was empty or unknown; nothing was sent.
    Ignored,
    /// The command was sent.
    Completed {
        /// Keyword after toggle resolution.
        keyword: String,
        /// Whether the verification attribute reached the expected value.
        succeeded: bool,
        /// Last observed value of the verification attribute.
        observed: Option<String>,
    },
}

impl Outcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Completed { succeeded: true, .. })
    }
}

/// Dispatches commands to devices through a hub client.
pub struct CommandExecutor<'a> {
    client: &'a dyn HubClient,
    colors: &'a ColorTable,
    notifier: &'a dyn Notifier,
    catalog: &'a Catalog,
    retry_delay: Duration,
}

impl<'a> CommandExecutor<'a> {
    /// Creates an executor using the execution catalog.
    pub fn new(client: &'a dyn HubClient, colors: &'a ColorTable, notifier: &'a dyn Notifier) -> Self {
        Self {
            client,
            colors,
            notifier,
            catalog: &EXECUTION_CATALOG,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Sets the wait between verification re-checks.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Uses a different command catalog.
    pub fn with_catalog(mut self, catalog: &'a Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Executes `keyword` with `params` on `device`.
    ///
    /// Fails without contacting the hub when the device lacks the command's
    /// capability or a parameter cannot be converted. A command that is sent
    /// but never verified is reported as an unsuccessful [`Outcome`], not an
    /// error.
    pub async fn execute(&self, device: &Device, keyword: &str, params: &[String]) -> Result<Outcome> {
        if keyword.is_empty() || !self.catalog.contains(keyword) {
            debug!(device = %device.label, keyword, "ignoring unknown command");
            return Ok(Outcome::Ignored);
        }

        let keyword = resolve_toggle_live(self.client, &device.id, keyword).await;
        let command = self
            .catalog
            .get(&keyword)
            .filter(|cmd| device.has_capability(cmd.capability))
            .ok_or_else(|| HubError::capability_mismatch(&device.label, &keyword))?;

        let args = materialize(command.arguments, params, self.colors)?;
        debug!(
            device = %device.label,
            command = command.wire_command,
            ?args,
            "sending device command"
        );
        let response = hub::send_command(self.client, &device.id, command.wire_command, &args).await?;

        let expected = expected_value(command, &args);
        let (succeeded, observed) = self
            .verify(device, command, &expected, attributes_from_response(&response))
            .await;

        let param = params.first().map(String::as_str).unwrap_or_default();
        let verb = if succeeded { "turned" } else { "failed" };
        let message = format!("{} {verb} {keyword} {param}", device.label);
        self.notifier.notify(NOTIFY_TITLE, message.trim_end());

        debug!(
            device = %device.label,
            command = %keyword,
            ?params,
            outcome = if succeeded { "succeeded" } else { "failed" },
            "device command finished"
        );

        Ok(Outcome::Completed {
            keyword,
            succeeded,
            observed,
        })
    }

    /// Checks `initial`, then re-fetches status until the attribute matches
    /// or the retry budget is spent.
    async fn verify(
        &self,
        device: &Device,
        command: &CommandDef,
        expected: &str,
        initial: Attributes,
    ) -> (bool, Option<String>) {
        let attribute = command.verify_attribute;
        let mut observed = initial.get(attribute).map(value_text);
        let mut retries = 0;

        while observed.as_deref() != Some(expected) && retries < MAX_VERIFY_RETRIES {
            tokio::time::sleep(self.retry_delay).await;
            retries += 1;

            observed = match hub::device_status(self.client, &device.id).await {
                Ok(status) => status.get(attribute).map(value_text),
                Err(e) => {
                    warn!("Status check {retries} for {} failed: {e}", device.label);
                    None
                }
            };
            debug!(
                device = %device.label,
                attribute,
                expected,
                observed = observed.as_deref(),
                retries,
                "verification re-check"
            );
        }

        (observed.as_deref() == Some(expected), observed)
    }
}

/// The value the verification attribute should hold once `command` took
/// effect: the first argument, or the wire command name for commands
/// without arguments.
fn expected_value(command: &CommandDef, args: &[Value]) -> String {
    args.first()
        .map(value_text)
        .unwrap_or_else(|| command.wire_command.to_string())
}
