use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::bundle::ExtensionBundle;
use crate::config::TouchConfig;
use crate::k8s::ResourceClient;
use crate::server::{self, AppState};

/// Wires the cluster client and configuration together
pub struct Application {
    client: Arc<dyn ResourceClient>,
    config: TouchConfig,
}

impl Application {
    pub fn new(client: Arc<dyn ResourceClient>, config: TouchConfig) -> Self {
        Self { client, config }
    }

    /// Resolves missing resource names and versions, then renders the bundle
    pub async fn extension(&self) -> Result<ExtensionBundle> {
        let resources = self
            .client
            .resolve_names_and_versions(self.config.resources.clone())
            .await
            .context("extension version resolution failed")?;

        let config = TouchConfig {
            resources,
            ..self.config.clone()
        };
        Ok(ExtensionBundle::new(&config)?)
    }

    pub async fn run(&self, addr: SocketAddr, debug: bool) -> Result<()> {
        let bundle = self.extension().await?;
        let state = AppState::new(Arc::clone(&self.client), bundle);
        server::run(addr, state, debug).await
    }
}
