//! Atomic JSON persistence of the record collection.
//!
//! The data file is a pretty-printed JSON array of records, newest first.
//! Writes go to a uniquely named temporary file in the same directory, which
//! is flushed, fsynced and then renamed over the canonical path. Readers of
//! the canonical path only ever see a complete old or complete new file.

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use glf_types::TokenRecord;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::collection::Collection;
use crate::error::{StoreError, StoreResult};

/// Name of the data file inside the data directory.
pub const DATA_FILE: &str = "data.json";

/// A fully written temporary file waiting to replace `target`.
///
/// Dropping it without calling [`StagedWrite::commit`] removes the temporary
/// file and leaves `target` untouched.
#[derive(Debug)]
pub struct StagedWrite {
    file: NamedTempFile,
    target: PathBuf,
}

impl StagedWrite {
    /// Path of the temporary file.
    pub fn temp_path(&self) -> &Path {
        self.file.path()
    }

    /// Rename the temporary file over the target path.
    pub fn commit(self) -> StoreResult<()> {
        let target = self.target;
        self.file.persist(&target).map_err(|e| StoreError::Persist {
            path: target.clone(),
            source: e.error,
        })?;
        if let Some(parent) = target.parent() {
            sync_dir(parent);
        }
        debug!(path = %target.display(), "data file replaced");
        Ok(())
    }
}

/// Serialize `collection` into a temporary file next to `target`.
pub fn stage(target: &Path, collection: &Collection) -> StoreResult<StagedWrite> {
    let records: Vec<&TokenRecord> = collection.records().collect();
    stage_records(target, &records)
}

fn stage_records(target: &Path, records: &[&TokenRecord]) -> StoreResult<StagedWrite> {
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let persist_err = |source| StoreError::Persist {
        path: target.to_path_buf(),
        source,
    };

    let mut file = tempfile::Builder::new()
        .prefix(".data.")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(persist_err)?;

    {
        let mut writer = BufWriter::new(file.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, records)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        writer.flush().map_err(persist_err)?;
    }
    file.as_file().sync_all().map_err(persist_err)?;

    Ok(StagedWrite {
        file,
        target: target.to_path_buf(),
    })
}

/// Stage and commit in one step.
pub fn write_atomic(target: &Path, collection: &Collection) -> StoreResult<()> {
    stage(target, collection)?.commit()
}

/// Read the data file. Returns `Ok(None)` if it does not exist.
pub fn read_records(path: &Path) -> StoreResult<Option<Vec<TokenRecord>>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| StoreError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Best-effort fsync of a directory so the rename itself is durable.
fn sync_dir(dir: &Path) {
    #[cfg(unix)]
    if let Err(e) = File::open(dir).and_then(|d| d.sync_all()) {
        debug!(dir = %dir.display(), error = %e, "directory fsync skipped");
    }
    #[cfg(not(unix))]
    let _ = dir;
}
