//! JSON file backed token store.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use glf_types::{timestamp::now_millis, NewToken, TokenRecord};
use tracing::{error, info};

use crate::collection::Collection;
use crate::error::{StoreError, StoreResult};
use crate::persist::{self, DATA_FILE};
use crate::traits::TokenStore;

/// Durable [`TokenStore`] backed by `<data_dir>/data.json`.
///
/// The whole collection is rewritten atomically on every append. The new
/// snapshot is published only after the file has been replaced. If the
/// replace fails the store enters a failed state and refuses all further
/// appends, since memory and disk can no longer be assumed to agree.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    current: RwLock<Arc<Collection>>,
    commit: Mutex<()>,
    failed: AtomicBool,
}

impl FileTokenStore {
    /// Load the store from `data_dir`, seeding an empty data file if none exists.
    ///
    /// Fails with [`StoreError::Corrupt`] if the file exists but does not
    /// hold a valid collection, including one with repeated token ids.
    pub fn open(data_dir: impl AsRef<Path>) -> StoreResult<Self> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir)?;
        let path = data_dir.join(DATA_FILE);

        let collection = match persist::read_records(&path)? {
            Some(records) => Collection::from_records(records).map_err(|e| match e {
                StoreError::Conflict(id) => StoreError::Corrupt {
                    path: path.clone(),
                    reason: format!("duplicate tokenId {id}"),
                },
                other => other,
            })?,
            None => {
                let empty = Collection::new();
                persist::write_atomic(&path, &empty)?;
                info!(path = %path.display(), "seeded empty data file");
                empty
            }
        };

        info!(
            path = %path.display(),
            tokens = collection.len(),
            hashtags = collection.hashtags().len(),
            "token store loaded"
        );

        Ok(Self {
            path,
            current: RwLock::new(Arc::new(collection)),
            commit: Mutex::new(()),
            failed: AtomicBool::new(false),
        })
    }

    /// Path of the canonical data file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether an earlier persist failure has poisoned the store.
    pub fn is_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }
}

impl TokenStore for FileTokenStore {
    fn snapshot(&self) -> StoreResult<Arc<Collection>> {
        let current = self.current.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(Arc::clone(&current))
    }

    fn append(&self, token: NewToken) -> StoreResult<TokenRecord> {
        let _commit = self.commit.lock().map_err(|_| StoreError::LockPoisoned)?;
        if self.is_failed() {
            return Err(StoreError::Failed);
        }

        let record = token.into_record(now_millis());
        let next = self.snapshot()?.with_prepended(record.clone())?;

        if let Err(e) = persist::write_atomic(&self.path, &next) {
            self.failed.store(true, Ordering::Release);
            error!(
                token_id = %record.token_id,
                path = %self.path.display(),
                error = %e,
                "persist failed; store refuses further writes"
            );
            return Err(e);
        }

        let count = next.len();
        *self.current.write().map_err(|_| StoreError::LockPoisoned)? = Arc::new(next);
        info!(token_id = %record.token_id, tokens = count, "token appended");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glf_types::TokenId;

    fn token(id: u64, tags: &[&str]) -> NewToken {
        let mut new = NewToken::new(TokenId::new(id));
        new.name = Some(format!("token {id}"));
        new.artist = Some("ana".into());
        new.hashtags = tags.iter().map(|t| t.to_string()).collect();
        new.image = Some(format!("{id}.png"));
        new
    }

    #[test]
    fn open_seeds_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::open(dir.path()).unwrap();
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "[]");
        let (records, hashtags) = store.lookup_all().unwrap();
        assert!(records.is_empty());
        assert!(hashtags.is_empty());
    }

    #[test]
    fn open_creates_missing_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileTokenStore::open(&nested).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn append_then_lookup_adds_only_date() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::open(dir.path()).unwrap();
        let new = token(1, &["art"]);
        let stored = store.append(new.clone()).unwrap();

        let found = store.lookup(TokenId::new(1)).unwrap().unwrap();
        assert_eq!(found, new.into_record(stored.date_created));
    }

    #[test]
    fn appended_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileTokenStore::open(dir.path()).unwrap();
            store.append(token(1, &["sun", "art"])).unwrap();
            store.append(token(2, &["sun"])).unwrap();
        }
        let store = FileTokenStore::open(dir.path()).unwrap();
        let (records, hashtags) = store.lookup_all().unwrap();
        let ids: Vec<u64> = records.iter().map(|r| r.token_id.get()).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(hashtags, vec!["sun", "art"]);
    }

    #[test]
    fn duplicate_append_leaves_file_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::open(dir.path()).unwrap();
        store.append(token(1, &["a"])).unwrap();
        let before = fs::read(store.path()).unwrap();

        let err = store.append(token(1, &["b"])).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(id) if id == TokenId::new(1)));
        assert_eq!(fs::read(store.path()).unwrap(), before);
        assert_eq!(store.snapshot().unwrap().len(), 1);
        assert!(!store.is_failed());
    }

    #[test]
    fn corrupt_file_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DATA_FILE), "[{").unwrap();
        assert!(matches!(
            FileTokenStore::open(dir.path()),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn duplicate_ids_on_disk_fail_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let json = r#"[
            {"tokenId": 1, "hashtags": [], "dateCreated": "2024-01-01T00:00:00.000Z"},
            {"tokenId": 1, "hashtags": [], "dateCreated": "2024-01-02T00:00:00.000Z"}
        ]"#;
        fs::write(dir.path().join(DATA_FILE), json).unwrap();
        let err = FileTokenStore::open(dir.path()).unwrap_err();
        assert!(err.to_string().contains("duplicate tokenId 1"));
    }

    #[test]
    fn stray_temp_file_is_ignored_on_open() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileTokenStore::open(dir.path()).unwrap();
            store.append(token(1, &[])).unwrap();
        }
        fs::write(dir.path().join(".data.crash.tmp"), "[{\"half").unwrap();
        let store = FileTokenStore::open(dir.path()).unwrap();
        assert_eq!(store.snapshot().unwrap().len(), 1);
    }

    #[test]
    fn persist_failure_poisons_store() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let store = FileTokenStore::open(&data_dir).unwrap();
        store.append(token(1, &[])).unwrap();

        fs::remove_dir_all(&data_dir).unwrap();
        let err = store.append(token(2, &[])).unwrap_err();
        assert!(matches!(err, StoreError::Persist { .. }));
        assert!(err.is_fatal());
        assert!(store.is_failed());
        // The unpersisted record was never published.
        assert!(store.lookup(TokenId::new(2)).unwrap().is_none());

        fs::create_dir_all(&data_dir).unwrap();
        assert!(matches!(store.append(token(3, &[])), Err(StoreError::Failed)));
    }

    #[test]
    fn concurrent_appends_are_serialized() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileTokenStore::open(dir.path()).unwrap());

        let handles: Vec<_> = (0..8u64)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.append(token(i % 4, &["x"])).is_ok())
            })
            .collect();
        let ok = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(ok, 4);

        let on_disk = persist::read_records(store.path()).unwrap().unwrap();
        assert_eq!(on_disk.len(), 4);
        assert_eq!(store.snapshot().unwrap().hashtags(), ["x"]);
    }
}
