use std::time::Duration;

use anyhow::Result;
use form::env::try_load;

pub struct Config {
    pub port: u16,
    pub vault_url: String,
    pub forward_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        let vault_url: String = try_load("VAULT_URL", "http://127.0.0.1:5000")?;

        Ok(Self {
            port: try_load("RUST_PORT", "3000")?,
            vault_url: vault_url.trim_end_matches('/').to_string(),
            forward_timeout: Duration::from_secs(try_load("FORWARD_TIMEOUT_SECS", "10")?),
        })
    }
}
