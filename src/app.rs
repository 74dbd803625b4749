//! Core orchestrator for hubquick.
//!
//! Coordinates the secret store, configuration, catalog cache, hub client
//! and notifier to carry out one `hb` command.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cli::Command;
use crate::commands::RESOLUTION_CATALOG;
use crate::config::Config;
use crate::devices::{ColorTable, Device};
use crate::dispatch::{CommandExecutor, Outcome};
use crate::error::{HubError, Result};
use crate::hub::{
    self, discover_hub, AccessMode, HttpHubClient, HubClient, HubConnector, LazyHubClient,
};
use crate::notify::{Notifier, NOTIFY_TITLE};
use crate::persistence::secrets::{self, ALL_SECRETS};
use crate::persistence::{fetch_color_table, mask_secret, CatalogCache, HubCredentials, SecretStore};
use crate::resolve::resolve;
use crate::suggest::{self, SuggestContext, SuggestionList};

/// Runs `hb` commands against the configured hub.
pub struct Orchestrator {
    config: Config,
    config_path: PathBuf,
    secrets: Arc<dyn SecretStore>,
    cache: CatalogCache,
    notifier: Arc<dyn Notifier>,
    /// Client to use instead of connecting over HTTP.
    client: Option<Arc<dyn HubClient>>,
}

impl Orchestrator {
    /// Creates an orchestrator with the given components.
    pub fn new(
        config: Config,
        config_path: PathBuf,
        secrets: Arc<dyn SecretStore>,
        cache: CatalogCache,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            config_path,
            secrets,
            cache,
            notifier,
            client: None,
        }
    }

    /// Uses `client` for every hub call instead of connecting over HTTP.
    pub fn with_client(mut self, client: Arc<dyn HubClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Carries out one command.
    pub async fn run(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Query { text } => {
                let list = self.suggestions(&text.join(" ")).await?;
                println!("{}", list.to_json());
                Ok(())
            }
            Command::Run {
                device_uid,
                device_command,
                device_params,
            } => {
                self.run_device_command(&device_uid, &device_command, &device_params)
                    .await?;
                Ok(())
            }
            Command::Do { text } => self.resolve_and_run(&text.join(" ")).await,
            Command::Update => self.update().await,
            Command::Apikey { key } => self.save_secret(secrets::API_KEY, &key, "API Key"),
            Command::Hubid { id } => self.save_secret(secrets::HUB_ID, &id, "Hub ID"),
            Command::Ip { address } => self.save_secret(secrets::HUB_IP, &address, "Hub IP"),
            Command::Mode { mode } => self.set_mode(mode),
            Command::Showstatus { value } => self.set_show_status(value.is_on()),
            Command::Reinit => self.reinit(),
        }
    }

    /// Builds the chooser items for `query`.
    ///
    /// Missing setup is reported as guidance items, not as an error. The hub
    /// is only contacted when a status line is shown.
    pub async fn suggestions(&self, query: &str) -> Result<SuggestionList> {
        let mut list = SuggestionList::default();
        list.extend(suggest::setting_items(query));

        match HubCredentials::load(self.secrets.as_ref()) {
            Ok(_) => {}
            Err(e) if e.is_guidance() => {
                list.push(suggest::guidance_item("Setup required...", &e.to_string()));
                return Ok(list);
            }
            Err(e) => return Err(e),
        }

        let devices = self.cache.load_devices()?;
        if devices.is_empty() {
            list.push(suggest::guidance_item(
                "No Devices...",
                "Please use hb update to update your Hubitat devices.",
            ));
            return Ok(list);
        }
        let colors = self.cache.load_colors()?;

        let ctx = SuggestContext {
            devices: &devices,
            colors: &colors,
            display: self.config.display,
        };
        let client = LazyHubClient::new(self);
        list.extend(suggest::device_items(query, &ctx, &client).await);
        Ok(list)
    }

    /// Executes a command on a cached device.
    pub async fn run_device_command(
        &self,
        device_uid: &str,
        keyword: &str,
        params: &[String],
    ) -> Result<Outcome> {
        let devices = self.cache.load_devices()?;
        let device = find_device(&devices, device_uid)?;
        let colors = self.cache.load_colors()?;
        let client = self.client(true).await?;
        self.execute(client.as_ref(), device, &colors, keyword, params)
            .await
    }

    /// Resolves `query` and executes it when it names one device.
    async fn resolve_and_run(&self, query: &str) -> Result<()> {
        let devices = self.cache.load_devices()?;
        if devices.is_empty() {
            return Err(HubError::upstream(
                "No devices cached. Use `hb update` to fetch them.",
            ));
        }

        let resolved = resolve(query, &devices, &RESOLUTION_CATALOG);
        let Some(device) = resolved.device else {
            let message = if resolved.candidates.is_empty() {
                format!("No device matches '{query}'")
            } else {
                let labels: Vec<&str> = resolved
                    .candidates
                    .iter()
                    .map(|d| d.label.as_str())
                    .collect();
                format!("'{query}' matches several devices: {}", labels.join(", "))
            };
            self.notifier.notify(NOTIFY_TITLE, &message);
            return Ok(());
        };

        let keyword = if device.is_scene() {
            "on"
        } else {
            resolved.command_keyword.as_str()
        };
        let colors = self.cache.load_colors()?;
        let client = self.client(true).await?;
        let outcome = self
            .execute(client.as_ref(), device, &colors, keyword, &resolved.params)
            .await?;
        if outcome == Outcome::Ignored {
            self.notifier.notify(
                NOTIFY_TITLE,
                &format!("No command given for {}", device.label),
            );
        }
        Ok(())
    }

    async fn execute(
        &self,
        client: &dyn HubClient,
        device: &Device,
        colors: &ColorTable,
        keyword: &str,
        params: &[String],
    ) -> Result<Outcome> {
        CommandExecutor::new(client, colors, self.notifier.as_ref())
            .with_retry_delay(self.config.hub.retry_delay())
            .execute(device, keyword, params)
            .await
    }

    /// Refreshes the cached devices and colors.
    async fn update(&self) -> Result<()> {
        let client = self.client(true).await?;
        let devices = hub::fetch_all_devices(client.as_ref()).await?;
        let colors = fetch_color_table(
            &self.config.catalog.colors_url,
            self.config.hub.request_timeout(),
        )
        .await?;

        self.cache.store_devices(&devices)?;
        self.cache.store_colors(&colors)?;
        self.notifier
            .notify(NOTIFY_TITLE, "Devices and colors updated");
        Ok(())
    }

    fn save_secret(&self, name: &str, value: &str, what: &str) -> Result<()> {
        self.secrets.set(name, value)?;
        info!("Saved {what}: {}", mask_secret(value));
        self.notifier.notify(NOTIFY_TITLE, &format!("{what} Saved"));
        Ok(())
    }

    fn set_mode(&mut self, mode: AccessMode) -> Result<()> {
        self.config.hub.mode = mode;
        self.config.save_to_file(&self.config_path)?;
        info!("Access mode set to {mode}");
        self.notifier
            .notify(NOTIFY_TITLE, &format!("Mode {mode} Saved"));
        Ok(())
    }

    fn set_show_status(&mut self, show: bool) -> Result<()> {
        self.config.display.show_status = show;
        self.config.save_to_file(&self.config_path)?;
        let value = if show { "on" } else { "off" };
        info!("Show status set to {value}");
        self.notifier
            .notify(NOTIFY_TITLE, &format!("Show Status {value}"));
        Ok(())
    }

    /// Deletes the catalog cache, the stored secrets and the config file.
    fn reinit(&mut self) -> Result<()> {
        self.cache.clear()?;
        for name in ALL_SECRETS {
            self.secrets.delete(name)?;
        }
        match std::fs::remove_file(&self.config_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(HubError::config(format!(
                    "Failed to remove {}: {e}",
                    self.config_path.display()
                )))
            }
        }
        self.config = Config::default();
        info!("Reinitialized");
        self.notifier.notify(NOTIFY_TITLE, "Reinitialized");
        Ok(())
    }

    /// Returns the hub client, connecting over HTTP unless one was injected.
    ///
    /// With `discover`, a missing hub address is looked up on the local
    /// network first.
    async fn client(&self, discover: bool) -> Result<Arc<dyn HubClient>> {
        if let Some(client) = &self.client {
            return Ok(Arc::clone(client));
        }

        let credentials = HubCredentials::load(self.secrets.as_ref())?;
        let hub = &self.config.hub;

        let mut hub_ip = credentials.hub_ip.clone();
        if hub_ip.is_none() && discover && hub.mode != AccessMode::Cloud {
            hub_ip = discover_hub().await;
            debug!("Discovered hub address: {hub_ip:?}");
        }

        let client = HttpHubClient::connect(
            hub.mode,
            &credentials.api_key,
            credentials.hub_id.as_deref(),
            hub_ip.as_deref(),
            hub.app_id,
            hub.request_timeout(),
        )
        .await?;
        Ok(Arc::new(client))
    }
}

#[async_trait]
impl HubConnector for Orchestrator {
    async fn connect(&self) -> Result<Arc<dyn HubClient>> {
        self.client(false).await
    }
}

fn find_device<'a>(devices: &'a [Device], device_uid: &str) -> Result<&'a Device> {
    devices.iter().find(|d| d.id == device_uid).ok_or_else(|| {
        HubError::upstream(format!(
            "Device {device_uid} not found. Use `hb update` to refresh devices."
        ))
    })
}
