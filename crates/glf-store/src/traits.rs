use std::sync::Arc;

use glf_types::{NewToken, TokenId, TokenRecord};

use crate::collection::Collection;
use crate::error::StoreResult;

/// Custody of the token collection.
///
/// All implementations must satisfy these invariants:
/// - `token_id` is unique; appending an existing id fails with
///   [`StoreError::Conflict`](crate::StoreError::Conflict) and changes nothing.
/// - Records are immutable once appended.
/// - The ordered sequence, id index and hashtag ranking are published
///   together; readers never observe one updated without the others.
/// - Appends are serialized against each other.
pub trait TokenStore: Send + Sync {
    /// The current published snapshot.
    fn snapshot(&self) -> StoreResult<Arc<Collection>>;

    /// Append a new record, stamping its creation time.
    ///
    /// Returns the record exactly as stored.
    fn append(&self, token: NewToken) -> StoreResult<TokenRecord>;

    /// All records (newest first) and the hashtag ranking.
    fn lookup_all(&self) -> StoreResult<(Vec<TokenRecord>, Vec<String>)> {
        let snapshot = self.snapshot()?;
        Ok((snapshot.to_vec(), snapshot.hashtags().to_vec()))
    }

    /// Look up a single record by id.
    ///
    /// Returns `Ok(None)` if no such token exists.
    fn lookup(&self, id: TokenId) -> StoreResult<Option<TokenRecord>> {
        Ok(self.snapshot()?.get(id).cloned())
    }

    /// Whether a record with this id is stored.
    fn contains(&self, id: TokenId) -> StoreResult<bool> {
        Ok(self.snapshot()?.contains(id))
    }
}
