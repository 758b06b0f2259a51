use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::{
    config::Config,
    database::{RecordStore, RedisStore},
    memory::MemoryStore,
    records::Records,
};

pub struct AppState {
    pub config: Config,
    pub records: Records,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Arc<Self>> {
        let store: Arc<dyn RecordStore> = match &config.redis_url {
            Some(url) => {
                info!("Connecting to Redis...");
                Arc::new(
                    RedisStore::connect(url)
                        .await
                        .context("Failed to connect to Redis")?,
                )
            }
            None => Arc::new(MemoryStore::new()),
        };

        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Config, store: Arc<dyn RecordStore>) -> Arc<Self> {
        Arc::new(Self {
            config,
            records: Records::new(store),
        })
    }
}
