use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    database::{RecordStore, StoreError},
    models::Record,
};

/// Records in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, record: Record) -> Result<Record, StoreError> {
        self.records.write().await.push(record.clone());

        Ok(record)
    }

    async fn find_by_mobile(&self, mobile: &str) -> Result<Option<Record>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|record| record.mobile == mobile)
            .cloned())
    }

    async fn replace(&self, record: Record) -> Result<Record, StoreError> {
        let mut records = self.records.write().await;

        match records.iter_mut().find(|existing| existing.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }

        Ok(record)
    }

    async fn remove(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|record| record.id != id);

        Ok(records.len() < before)
    }

    async fn list(&self) -> Result<Vec<Record>, StoreError> {
        // reversed first so equal timestamps still come out newest first
        let mut records: Vec<Record> = self.records.read().await.iter().rev().cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(records)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().await.len())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, Utc};
    use form::Action;

    use super::*;

    fn record(mobile: &str, minutes_ago: i64) -> Record {
        let at = Utc::now() - Duration::minutes(minutes_ago);

        Record {
            id: Uuid::new_v4(),
            name: "Asha Rao".to_string(),
            mobile: mobile.to_string(),
            dob: NaiveDate::from_ymd_opt(1995, 1, 1).unwrap(),
            age: 29,
            action: Action::Create,
            processed_at: at,
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = MemoryStore::new();
        store.insert(record("9000000001", 10)).await.unwrap();
        store.insert(record("9000000002", 1)).await.unwrap();
        store.insert(record("9000000003", 5)).await.unwrap();

        let mobiles: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.mobile)
            .collect();

        assert_eq!(mobiles, ["9000000002", "9000000003", "9000000001"]);
    }

    #[tokio::test]
    async fn test_find_returns_oldest_match() {
        let store = MemoryStore::new();
        let first = store.insert(record("9876543210", 10)).await.unwrap();
        store.insert(record("9876543210", 1)).await.unwrap();

        let found = store.find_by_mobile("9876543210").await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
        assert!(store.find_by_mobile("6000000000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_reports_absence() {
        let store = MemoryStore::new();
        let kept = store.insert(record("9876543210", 0)).await.unwrap();

        assert!(!store.remove(Uuid::new_v4()).await.unwrap());
        assert!(store.remove(kept.id).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
