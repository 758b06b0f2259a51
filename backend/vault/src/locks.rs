use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use tokio::sync::{Mutex, MutexGuard};

pub const DEFAULT_STRIPES: usize = 64;

/// Striped lock table: one writer at a time per mobile within this process.
/// Two mobiles may share a stripe, which only costs some parallelism.
pub struct KeyLocks {
    stripes: Vec<Mutex<()>>,
}

impl KeyLocks {
    pub fn new(stripes: usize) -> Self {
        Self {
            stripes: (0..stripes.max(1)).map(|_| Mutex::new(())).collect(),
        }
    }

    pub fn stripe(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);

        (hasher.finish() % self.stripes.len() as u64) as usize
    }

    pub async fn lock(&self, key: &str) -> MutexGuard<'_, ()> {
        self.stripes[self.stripe(key)].lock().await
    }
}

impl Default for KeyLocks {
    fn default() -> Self {
        Self::new(DEFAULT_STRIPES)
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use tokio::time::timeout;

    use super::*;

    #[test]
    fn test_same_key_same_stripe() {
        let locks = KeyLocks::default();
        assert_eq!(locks.stripe("9876543210"), locks.stripe("9876543210"));
    }

    #[test]
    fn test_zero_stripes_clamped() {
        let locks = KeyLocks::new(0);
        assert_eq!(locks.stripe("9876543210"), 0);
    }

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let locks = Arc::new(KeyLocks::default());
        let guard = locks.lock("9876543210").await;

        let contender = locks.clone();
        let blocked = timeout(Duration::from_millis(50), async move {
            let _guard = contender.lock("9876543210").await;
        })
        .await;
        assert!(blocked.is_err());

        drop(guard);
        let _guard = timeout(Duration::from_millis(50), locks.lock("9876543210"))
            .await
            .unwrap();
    }
}
