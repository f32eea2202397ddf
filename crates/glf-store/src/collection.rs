//! Immutable snapshot of the token collection.

use std::collections::HashMap;
use std::sync::Arc;

use glf_types::{TokenId, TokenRecord};

use crate::error::{StoreError, StoreResult};
use crate::ranking::rank_hashtags;

/// One consistent view of the registry.
///
/// Holds the newest-first record sequence, the by-id index over the same
/// records, and the hashtag ranking derived from them. A snapshot is never
/// mutated; an append builds the next snapshot with [`Collection::with_prepended`].
#[derive(Clone, Debug, Default)]
pub struct Collection {
    records: Vec<Arc<TokenRecord>>,
    by_id: HashMap<TokenId, Arc<TokenRecord>>,
    hashtags: Vec<String>,
}

impl Collection {
    /// An empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from records already in newest-first order.
    ///
    /// Fails with [`StoreError::Conflict`] naming the first repeated id.
    pub fn from_records(records: Vec<TokenRecord>) -> StoreResult<Self> {
        let mut by_id = HashMap::with_capacity(records.len());
        let mut ordered = Vec::with_capacity(records.len());
        for record in records {
            let record = Arc::new(record);
            if by_id.insert(record.token_id, Arc::clone(&record)).is_some() {
                return Err(StoreError::Conflict(record.token_id));
            }
            ordered.push(record);
        }
        let hashtags = rank_hashtags(ordered.iter().map(|r| r.as_ref()));
        Ok(Self {
            records: ordered,
            by_id,
            hashtags,
        })
    }

    /// The next snapshot, with `record` as the newest entry.
    pub fn with_prepended(&self, record: TokenRecord) -> StoreResult<Self> {
        if self.by_id.contains_key(&record.token_id) {
            return Err(StoreError::Conflict(record.token_id));
        }
        let record = Arc::new(record);

        let mut records = Vec::with_capacity(self.records.len() + 1);
        records.push(Arc::clone(&record));
        records.extend(self.records.iter().cloned());

        let mut by_id = self.by_id.clone();
        by_id.insert(record.token_id, record);

        let hashtags = rank_hashtags(records.iter().map(|r| r.as_ref()));
        Ok(Self {
            records,
            by_id,
            hashtags,
        })
    }

    pub fn get(&self, id: TokenId) -> Option<&TokenRecord> {
        self.by_id.get(&id).map(|r| r.as_ref())
    }

    pub fn contains(&self, id: TokenId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Records, newest first.
    pub fn records(&self) -> impl Iterator<Item = &TokenRecord> + '_ {
        self.records.iter().map(|r| r.as_ref())
    }

    /// Distinct hashtags by descending frequency.
    pub fn hashtags(&self) -> &[String] {
        &self.hashtags
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Owned copy of the records, newest first.
    pub fn to_vec(&self) -> Vec<TokenRecord> {
        self.records().cloned().collect()
    }
}
