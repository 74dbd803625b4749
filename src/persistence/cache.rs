//! Catalog cache.
//!
//! The device list and color table are fetched in bulk by `hb update` and
//! stored as flat JSON files. Every other run reads them back as an
//! immutable snapshot.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::devices::{ColorTable, Device};
use crate::error::{HubError, Result};

const DEVICES_FILE: &str = "devices.json";
const COLORS_FILE: &str = "colors.json";

/// JSON file store for the device and color catalogs.
#[derive(Debug, Clone)]
pub struct CatalogCache {
    dir: PathBuf,
}

impl CatalogCache {
    /// Opens the cache in the default platform data directory.
    ///
    /// - Linux: `~/.local/share/hubquick/`
    /// - macOS: `~/Library/Application Support/hubquick/`
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_dir()?)
    }

    /// Opens (creating if needed) a cache rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            HubError::storage(format!(
                "Failed to create cache directory {}: {e}",
                dir.display()
            ))
        })?;
        Ok(Self { dir })
    }

    /// Returns the default cache directory for the current platform.
    pub fn default_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .or_else(dirs::config_dir)
            .ok_or_else(|| HubError::storage("Could not determine data directory"))?;
        Ok(data_dir.join("hubquick"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cached devices. Empty if never refreshed.
    pub fn load_devices(&self) -> Result<Vec<Device>> {
        Ok(self.read(DEVICES_FILE)?.unwrap_or_default())
    }

    pub fn store_devices(&self, devices: &[Device]) -> Result<()> {
        self.write(DEVICES_FILE, &devices)?;
        info!("Cached {} devices", devices.len());
        Ok(())
    }

    /// Cached color table. Empty if never refreshed.
    pub fn load_colors(&self) -> Result<ColorTable> {
        Ok(self.read(COLORS_FILE)?.unwrap_or_default())
    }

    pub fn store_colors(&self, colors: &ColorTable) -> Result<()> {
        self.write(COLORS_FILE, colors)?;
        info!("Cached {} colors", colors.len());
        Ok(())
    }

    /// Removes both catalog files.
    pub fn clear(&self) -> Result<()> {
        for name in [DEVICES_FILE, COLORS_FILE] {
            let path = self.dir.join(name);
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(HubError::storage(format!(
                        "Failed to remove {}: {e}",
                        path.display()
                    )))
                }
            }
        }
        Ok(())
    }

    /// Reads a cache file. A missing file is `None`; a corrupted one is
    /// moved aside and also read as `None`.
    fn read<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let path = self.dir.join(name);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(HubError::storage(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )))
            }
        };

        match serde_json::from_str(&content) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                let backup = path.with_extension("json.bak");
                warn!(
                    "Corrupted cache file {}: {e}. Moving it to {}",
                    path.display(),
                    backup.display()
                );
                if let Err(e) = std::fs::rename(&path, &backup) {
                    warn!("Failed to back up corrupted cache file: {e}");
                }
                Ok(None)
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.dir.join(name);
        let content = serde_json::to_string(value)
            .map_err(|e| HubError::storage(format!("Failed to serialize {name}: {e}")))?;
        std::fs::write(&path, content).map_err(|e| {
            HubError::storage(format!("Failed to write {}: {e}", path.display()))
        })
    }
}

/// Downloads the color-names document and builds a color table from it.
pub async fn fetch_color_table(url: &str, timeout: Duration) -> Result<ColorTable> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| HubError::api(format!("Failed to create HTTP client: {e}")))?;

    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(HubError::api(format!(
            "Color list request returned HTTP {}",
            response.status()
        )));
    }

    let document: BTreeMap<String, String> = response
        .json()
        .await
        .map_err(|e| HubError::api(format!("Invalid color list: {e}")))?;
    Ok(ColorTable::from_names_document(&document))
}
