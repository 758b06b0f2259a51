//! # Record Store
//!
//! Durable home of submitted person records.
//!
//! ## Requirements
//!
//! - Insert, lookup by mobile, replace, remove, list newest first
//! - Small dataset, one collection, no pagination
//! - `mobile` is the functional key but uniqueness is not enforced here
//!
//! ## Implementation
//!
//! - [`RecordStore`] is the seam, picked once at startup
//! - [`RedisStore`]: one Redis hash, field = record id, value = JSON document
//! - [`crate::memory::MemoryStore`]: in-process fallback when no Redis is configured
//! - Lookups by mobile scan the hash; with several records on one mobile the
//!   oldest one wins
//! - Lookup-then-write is not atomic in the store itself; callers serialize
//!   per mobile with [`crate::locks::KeyLocks`]
use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use redis::{
    AsyncCommands, Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use thiserror::Error;
use uuid::Uuid;

use crate::models::Record;

pub const RECORDS_KEY: &str = "records";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("redis: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("corrupt record: {0}")]
    Serde(#[from] serde_json::Error),
}

#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    fn backend(&self) -> &'static str;

    async fn insert(&self, record: Record) -> Result<Record, StoreError>;

    async fn find_by_mobile(&self, mobile: &str) -> Result<Option<Record>, StoreError>;

    /// Overwrites the record with the same id.
    async fn replace(&self, record: Record) -> Result<Record, StoreError>;

    /// Returns `true` if the record existed.
    async fn remove(&self, id: Uuid) -> Result<bool, StoreError>;

    /// All records, newest `created_at` first.
    async fn list(&self) -> Result<Vec<Record>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

pub struct RedisStore {
    connection: ConnectionManager,
}

pub async fn init_redis(redis_url: &str) -> Result<ConnectionManager, StoreError> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(500));

    let client = Client::open(redis_url)?;
    let connection_manager = client.get_connection_manager_with_config(config).await?;

    Ok(connection_manager)
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        Ok(Self {
            connection: init_redis(redis_url).await?,
        })
    }

    async fn all(&self) -> Result<Vec<Record>, StoreError> {
        let mut connection = self.connection.clone();
        let raw: HashMap<String, String> = connection.hgetall(RECORDS_KEY).await?;

        raw.values()
            .map(|json| serde_json::from_str(json).map_err(StoreError::from))
            .collect()
    }

    async fn write(&self, record: Record) -> Result<Record, StoreError> {
        let json = serde_json::to_string(&record)?;

        let mut connection = self.connection.clone();
        let _: () = connection
            .hset(RECORDS_KEY, record.id.to_string(), json)
            .await?;

        Ok(record)
    }
}

#[async_trait]
impl RecordStore for RedisStore {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn insert(&self, record: Record) -> Result<Record, StoreError> {
        self.write(record).await
    }

    async fn find_by_mobile(&self, mobile: &str) -> Result<Option<Record>, StoreError> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .filter(|record| record.mobile == mobile)
            .min_by_key(|record| record.created_at))
    }

    async fn replace(&self, record: Record) -> Result<Record, StoreError> {
        self.write(record).await
    }

    async fn remove(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut connection = self.connection.clone();
        let removed: usize = connection.hdel(RECORDS_KEY, id.to_string()).await?;

        Ok(removed > 0)
    }

    async fn list(&self) -> Result<Vec<Record>, StoreError> {
        let mut records = self.all().await?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(records)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let mut connection = self.connection.clone();
        let count: usize = connection.hlen(RECORDS_KEY).await?;

        Ok(count)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        let _: String = redis::cmd("PING").query_async(&mut connection).await?;

        Ok(())
    }
}
