use anyhow::Result;
use form::env::{try_load, var_or_secret};
use tracing::warn;

pub struct Config {
    pub port: u16,
    pub redis_url: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let redis_url = var_or_secret("REDIS_URL");
        if redis_url.is_none() {
            warn!("REDIS_URL not configured, records will only live in memory");
        }

        Ok(Self {
            port: try_load("RUST_PORT", "5000")?,
            redis_url,
        })
    }
}
