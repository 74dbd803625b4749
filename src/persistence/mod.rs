//! Local persistence for hubquick.
//!
//! Secrets are stored via the OS keyring with environment overrides; the
//! device and color catalogs are cached as JSON files.

pub mod cache;
pub mod secrets;

pub use cache::{fetch_color_table, CatalogCache};
pub use secrets::{
    mask_secret, HubCredentials, KeyringSecretStore, MemorySecretStore, SecretStore,
};
