//! Secret storage for hub credentials.
//!
//! Secrets live in the OS keyring. Each can be overridden from the
//! environment, which is also how headless setups provide them.

use crate::error::{HubError, Result};
use keyring::Entry;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, warn};

const SERVICE_NAME: &str = "hubquick";

/// Keyring name of the Maker API access token.
pub const API_KEY: &str = "hubitat_api_key";
/// Keyring name of the hub id used for cloud access.
pub const HUB_ID: &str = "hubitat_hub_id";
/// Keyring name of the hub's local address.
pub const HUB_IP: &str = "hubitat_hub_ip";

/// All secret names, for bulk removal.
pub const ALL_SECRETS: &[&str] = &[API_KEY, HUB_ID, HUB_IP];

/// A named secret store.
pub trait SecretStore: Send + Sync {
    /// Retrieves a secret, or `None` if it has not been set.
    fn get(&self, name: &str) -> Result<Option<String>>;

    /// Stores a secret, replacing any previous value.
    fn set(&self, name: &str, value: &str) -> Result<()>;

    /// Removes a secret. Removing a missing secret is not an error.
    fn delete(&self, name: &str) -> Result<()>;
}

/// Environment variable that overrides a secret.
pub fn env_override(name: &str) -> Option<&'static str> {
    match name {
        API_KEY => Some("HUBITAT_API_KEY"),
        HUB_ID => Some("HUBITAT_HUB_ID"),
        HUB_IP => Some("HUBITAT_HUB_IP"),
        _ => None,
    }
}

/// OS keyring backed secret store with environment overrides.
#[derive(Debug, Clone)]
pub struct KeyringSecretStore {
    keyring_available: bool,
}

impl Default for KeyringSecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyringSecretStore {
    /// Creates a new store, probing keyring availability.
    pub fn new() -> Self {
        let keyring_available = Self::probe_keyring();
        if !keyring_available {
            warn!("OS keyring unavailable; only environment variables will be read");
        }
        Self { keyring_available }
    }

    /// Probes whether the OS keyring is available.
    fn probe_keyring() -> bool {
        let test_entry = match Entry::new(SERVICE_NAME, "__probe__") {
            Ok(e) => e,
            Err(_) => return false,
        };

        match test_entry.set_password("test") {
            Ok(()) => {
                let _ = test_entry.delete_credential();
                true
            }
            Err(_) => false,
        }
    }

    fn entry(name: &str) -> Result<Entry> {
        Entry::new(SERVICE_NAME, name)
            .map_err(|e| HubError::storage(format!("Failed to access keyring: {e}")))
    }
}

impl SecretStore for KeyringSecretStore {
    fn get(&self, name: &str) -> Result<Option<String>> {
        if let Some(value) = env_override(name)
            .and_then(|var| std::env::var(var).ok())
            .filter(|v| !v.is_empty())
        {
            debug!("Using {name} from environment");
            return Ok(Some(value));
        }

        if !self.keyring_available {
            return Ok(None);
        }

        match Self::entry(name)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(HubError::storage(format!("Failed to retrieve secret: {e}"))),
        }
    }

    fn set(&self, name: &str, value: &str) -> Result<()> {
        if !self.keyring_available {
            let hint = env_override(name)
                .map(|var| format!(" Set {var} in the environment instead."))
                .unwrap_or_default();
            return Err(HubError::storage(format!("Keyring unavailable.{hint}")));
        }

        Self::entry(name)?
            .set_password(value)
            .map_err(|e| HubError::storage(format!("Failed to store secret: {e}")))
    }

    fn delete(&self, name: &str) -> Result<()> {
        if !self.keyring_available {
            return Ok(());
        }

        match Self::entry(name)?.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => {
                warn!("Failed to delete secret from keyring: {e}");
                Ok(())
            }
        }
    }
}

/// In-memory secret store.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secrets: Mutex<HashMap<String, String>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-loaded with secrets.
    pub fn with_secrets(secrets: &[(&str, &str)]) -> Self {
        let map = secrets
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            secrets: Mutex::new(map),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.secrets
            .lock()
            .map_err(|_| HubError::internal("secret store lock poisoned"))
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(name).cloned())
    }

    fn set(&self, name: &str, value: &str) -> Result<()> {
        self.lock()?.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        self.lock()?.remove(name);
        Ok(())
    }
}

/// Credentials needed to reach the hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubCredentials {
    pub api_key: String,
    pub hub_id: Option<String>,
    pub hub_ip: Option<String>,
}

impl HubCredentials {
    /// Loads credentials from the store. The API key is required.
    pub fn load(store: &dyn SecretStore) -> Result<Self> {
        let api_key = store
            .get(API_KEY)?
            .filter(|k| !k.is_empty())
            .ok_or_else(|| HubError::upstream("API Key not found. Use `hb apikey <KEY>` to set it."))?;

        Ok(Self {
            api_key,
            hub_id: store.get(HUB_ID)?.filter(|v| !v.is_empty()),
            hub_ip: store.get(HUB_IP)?.filter(|v| !v.is_empty()),
        })
    }
}

/// Masks a secret for display, showing only the last 4 characters.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        "*".repeat(chars.len())
    } else {
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("****...{tail}")
    }
}
