//! In-memory token store for testing and embedding.

use std::sync::{Arc, Mutex, RwLock};

use glf_types::{timestamp::now_millis, NewToken, TokenRecord};

use crate::collection::Collection;
use crate::error::{StoreError, StoreResult};
use crate::traits::TokenStore;

/// A [`TokenStore`] that keeps everything in memory.
///
/// Data is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    current: RwLock<Arc<Collection>>,
    commit: Mutex<()>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with records already in newest-first order.
    pub fn with_records(records: Vec<TokenRecord>) -> StoreResult<Self> {
        Ok(Self {
            current: RwLock::new(Arc::new(Collection::from_records(records)?)),
            commit: Mutex::new(()),
        })
    }
}

impl TokenStore for InMemoryTokenStore {
    fn snapshot(&self) -> StoreResult<Arc<Collection>> {
        let current = self.current.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(Arc::clone(&current))
    }

    fn append(&self, token: NewToken) -> StoreResult<TokenRecord> {
        let _commit = self.commit.lock().map_err(|_| StoreError::LockPoisoned)?;
        let record = token.into_record(now_millis());
        let next = self.snapshot()?.with_prepended(record.clone())?;
        *self.current.write().map_err(|_| StoreError::LockPoisoned)? = Arc::new(next);
        Ok(record)
    }
}
