//! Deferred hub connection.
//!
//! Connecting may probe the network (auto mode checks whether the hub
//! answers locally), so code that only sometimes needs hub data holds a
//! [`LazyHubClient`] and connects on first use.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::HubClient;
use crate::error::{HubError, Result};

/// Creates connected hub clients.
#[async_trait]
pub trait HubConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn HubClient>>;
}

/// A hub client connected on first use, at most once.
pub struct LazyHubClient<'a> {
    connector: Option<&'a dyn HubConnector>,
    client: OnceCell<Arc<dyn HubClient>>,
}

impl<'a> LazyHubClient<'a> {
    pub fn new(connector: &'a dyn HubConnector) -> Self {
        Self {
            connector: Some(connector),
            client: OnceCell::new(),
        }
    }

    /// Wraps a client that is already connected.
    pub fn ready(client: Arc<dyn HubClient>) -> Self {
        Self {
            connector: None,
            client: OnceCell::new_with(Some(client)),
        }
    }

    /// Returns true once a client exists.
    pub fn is_connected(&self) -> bool {
        self.client.initialized()
    }

    /// Returns the client, connecting if this is the first use.
    pub async fn get(&self) -> Result<&dyn HubClient> {
        let client = self
            .client
            .get_or_try_init(|| async {
                match self.connector {
                    Some(connector) => connector.connect().await,
                    None => Err(HubError::internal("No hub connector available")),
                }
            })
            .await?;
        Ok(client.as_ref())
    }
}
