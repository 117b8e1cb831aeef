//! In-memory session store for ephemeral runs and tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::domain::ports::{SessionKey, SessionStore, SessionStoreError, StoreOp, WriteBatch};

/// Session store backed by a map guarded by a single lock.
///
/// Batches are applied while holding the lock, so readers never observe a
/// half-applied batch.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    values: Mutex<BTreeMap<SessionKey, String>>,
}

impl InMemorySessionStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently holding a value, in key order.
    pub fn keys(&self) -> Result<Vec<SessionKey>, SessionStoreError> {
        Ok(self.lock()?.keys().copied().collect())
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<SessionKey, String>>, SessionStoreError> {
        self.values
            .lock()
            .map_err(|_| SessionStoreError::io("in-memory session store lock poisoned"))
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, key: SessionKey) -> Result<Option<String>, SessionStoreError> {
        Ok(self.lock()?.get(&key).cloned())
    }

    fn apply(&self, batch: WriteBatch) -> Result<(), SessionStoreError> {
        let mut values = self.lock()?;
        for op in batch.into_ops() {
            match op {
                StoreOp::Put(key, value) => {
                    values.insert(key, value);
                }
                StoreOp::Delete(key) => {
                    values.remove(&key);
                }
            }
        }
        Ok(())
    }
}
