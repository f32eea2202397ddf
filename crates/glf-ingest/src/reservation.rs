//! In-flight token id reservations.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use glf_types::TokenId;
use tracing::debug;

/// Set of token ids currently being created.
///
/// Bridges the gap between an ingestion's conflict check and its final
/// commit: while one request holds an id, any other request presenting the
/// same id is rejected immediately.
#[derive(Debug, Default)]
pub struct Reservations {
    ids: Mutex<HashSet<TokenId>>,
}

impl Reservations {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Reserve `id`, or `None` if another holder already has it.
    pub fn reserve(self: &Arc<Self>, id: TokenId) -> Option<Reservation> {
        if !self.lock().insert(id) {
            return None;
        }
        debug!(token_id = %id, "token id reserved");
        Some(Reservation {
            id,
            table: Arc::clone(self),
        })
    }

    pub fn is_reserved(&self, id: TokenId) -> bool {
        self.lock().contains(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave the set half-updated.
    fn lock(&self) -> MutexGuard<'_, HashSet<TokenId>> {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A held reservation; released on drop.
#[derive(Debug)]
pub struct Reservation {
    id: TokenId,
    table: Arc<Reservations>,
}

impl Reservation {
    pub fn id(&self) -> TokenId {
        self.id
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        self.table.lock().remove(&self.id);
        debug!(token_id = %self.id, "token id released");
    }
}
