use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::{
    database::{RecordStore, StoreError},
    locks::KeyLocks,
    models::{NewRecord, Record},
};

/// Outcome of an upsert. A missing mobile falls back to a create and says so.
#[derive(Debug, Clone, PartialEq)]
pub enum Upserted {
    Created(Record),
    Updated(Record),
}

impl Upserted {
    pub fn operation(&self) -> &'static str {
        match self {
            Upserted::Created(_) => "create",
            Upserted::Updated(_) => "update",
        }
    }

    pub fn record(&self) -> &Record {
        match self {
            Upserted::Created(record) | Upserted::Updated(record) => record,
        }
    }
}

pub struct Records {
    store: Arc<dyn RecordStore>,
    locks: KeyLocks,
}

impl Records {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            locks: KeyLocks::default(),
        }
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    pub async fn insert(&self, new: NewRecord) -> Result<Record, StoreError> {
        let _guard = self.locks.lock(&new.mobile).await;

        self.create(new).await
    }

    pub async fn upsert(&self, new: NewRecord) -> Result<Upserted, StoreError> {
        let _guard = self.locks.lock(&new.mobile).await;

        let Some(existing) = self.store.find_by_mobile(&new.mobile).await? else {
            info!("No record for {}, creating instead of updating", new.mobile);
            return Ok(Upserted::Created(self.create(new).await?));
        };

        // the mobile is the lookup key and stays as stored
        let updated = Record {
            name: new.name,
            dob: new.dob,
            age: new.age,
            action: new.action,
            processed_at: new.processed_at,
            updated_at: Utc::now(),
            ..existing
        };

        let updated = self.store.replace(updated).await?;
        info!("Updated record {} for {}", updated.id, updated.mobile);

        Ok(Upserted::Updated(updated))
    }

    /// `None` when nothing matched; the collection is left untouched.
    pub async fn delete(&self, mobile: &str) -> Result<Option<Record>, StoreError> {
        let _guard = self.locks.lock(mobile).await;

        let Some(existing) = self.store.find_by_mobile(mobile).await? else {
            return Ok(None);
        };

        if !self.store.remove(existing.id).await? {
            return Ok(None);
        }
        info!("Deleted record {} for {mobile}", existing.id);

        Ok(Some(existing))
    }

    pub async fn list(&self) -> Result<Vec<Record>, StoreError> {
        self.store.list().await
    }

    pub async fn count(&self) -> Result<usize, StoreError> {
        self.store.count().await
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }

    async fn create(&self, new: NewRecord) -> Result<Record, StoreError> {
        let now = Utc::now();
        let record = Record {
            id: Uuid::new_v4(),
            name: new.name,
            mobile: new.mobile,
            dob: new.dob,
            age: new.age,
            action: new.action,
            processed_at: new.processed_at,
            created_at: now,
            updated_at: now,
        };

        let record = self.store.insert(record).await?;
        info!("Created record {} for {}", record.id, record.mobile);

        Ok(record)
    }
}
