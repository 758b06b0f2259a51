use std::sync::Arc;

use anyhow::{Context, Result};

use crate::{client::VaultClient, config::Config};

pub struct AppState {
    pub config: Config,
    pub vault: VaultClient,
}

impl AppState {
    pub fn new(config: Config) -> Result<Arc<Self>> {
        let vault = VaultClient::new(&config.vault_url, config.forward_timeout)
            .context("Failed to build vault client")?;

        Ok(Arc::new(Self { config, vault }))
    }
}
