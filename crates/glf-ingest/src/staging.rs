//! Staged asset files.
//!
//! Uploaded bytes are written to a uniquely named file in the staging
//! directory and linked to their final name on commit. The final name is
//! never overwritten: if it already exists the promotion fails and the
//! existing file is left alone.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::IngestResult;
use crate::source::ChunkSource;

/// A fully written upload waiting to be promoted to its final name.
///
/// Dropping an asset deletes the staged file.
#[derive(Debug)]
pub struct StagedAsset {
    temp: PathBuf,
    target: PathBuf,
    file_name: String,
    len: u64,
    released: bool,
}

impl StagedAsset {
    /// Stream `source` to a file in `staging` that will later become
    /// `dir/file_name`.
    ///
    /// The source is drained completely and the file flushed and fsynced
    /// before this returns.
    pub async fn write(
        staging: &Path,
        dir: &Path,
        file_name: String,
        source: &mut dyn ChunkSource,
    ) -> IngestResult<Self> {
        let mut asset = Self {
            temp: staging.join(format!("{file_name}.{}.part", Uuid::now_v7())),
            target: dir.join(&file_name),
            file_name,
            len: 0,
            released: false,
        };

        let mut file = File::create(&asset.temp).await?;
        while let Some(chunk) = source.next_chunk().await? {
            file.write_all(&chunk).await?;
            asset.len += chunk.len() as u64;
        }
        file.flush().await?;
        file.sync_all().await?;

        debug!(path = %asset.temp.display(), bytes = asset.len, "asset staged");
        Ok(asset)
    }

    /// Final file name, e.g. `12.png`.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn staged_path(&self) -> &Path {
        &self.temp
    }

    /// Number of bytes written.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Link the staged file to its final name and drop the staged copy.
    ///
    /// Fails with [`ErrorKind::AlreadyExists`] if the final name is taken;
    /// the existing file is not touched.
    pub async fn promote(mut self) -> IngestResult<PathBuf> {
        tokio::fs::hard_link(&self.temp, &self.target).await?;
        debug!(path = %self.target.display(), "asset promoted");
        match tokio::fs::remove_file(&self.temp).await {
            Ok(()) => self.released = true,
            // Drop retries the removal.
            Err(e) => warn!(path = %self.temp.display(), error = %e, "failed to remove staged asset"),
        }
        Ok(self.target.clone())
    }
}

impl Drop for StagedAsset {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        match std::fs::remove_file(&self.temp) {
            Ok(()) => debug!(path = %self.temp.display(), "staged asset discarded"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.temp.display(), error = %e, "failed to discard staged asset"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use bytes::Bytes;

    fn chunks(parts: &[&'static [u8]]) -> std::vec::IntoIter<Bytes> {
        parts.iter().copied().map(Bytes::from_static).collect::<Vec<_>>().into_iter()
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    struct Dirs {
        _root: tempfile::TempDir,
        staging: PathBuf,
        out: PathBuf,
    }

    fn dirs() -> Dirs {
        let root = tempfile::tempdir().unwrap();
        let staging = root.path().join(".staging");
        let out = root.path().join("full");
        std::fs::create_dir_all(&staging).unwrap();
        std::fs::create_dir_all(&out).unwrap();
        Dirs {
            _root: root,
            staging,
            out,
        }
    }

    #[tokio::test]
    async fn write_then_promote() {
        let d = dirs();
        let mut source = chunks(&[b"hello ", b"world"]);
        let asset = StagedAsset::write(&d.staging, &d.out, "3.png".into(), &mut source)
            .await
            .unwrap();
        assert_eq!(asset.len(), 11);
        assert!(asset.staged_path().starts_with(&d.staging));
        assert!(asset.staged_path().exists());
        assert!(!asset.target().exists());
        assert!(entries(&d.out).is_empty());

        let path = asset.promote().await.unwrap();
        assert_eq!(path, d.out.join("3.png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"hello world");
        assert_eq!(entries(&d.out), vec!["3.png"]);
        assert!(entries(&d.staging).is_empty());
    }

    #[tokio::test]
    async fn promote_never_replaces_existing_file() {
        let d = dirs();
        std::fs::write(d.out.join("5.png"), b"stored").unwrap();

        let mut source = chunks(&[b"upload"]);
        let asset = StagedAsset::write(&d.staging, &d.out, "5.png".into(), &mut source)
            .await
            .unwrap();
        let err = asset.promote().await.unwrap_err();
        assert!(matches!(err, IngestError::Io(ref e) if e.kind() == ErrorKind::AlreadyExists));

        assert_eq!(std::fs::read(d.out.join("5.png")).unwrap(), b"stored");
        assert!(entries(&d.staging).is_empty());
    }

    #[tokio::test]
    async fn drop_discards_staged_file() {
        let d = dirs();
        let mut source = chunks(&[b"data"]);
        let asset = StagedAsset::write(&d.staging, &d.out, "3.jpg".into(), &mut source)
            .await
            .unwrap();
        drop(asset);
        assert!(entries(&d.staging).is_empty());
        assert!(entries(&d.out).is_empty());
    }

    #[tokio::test]
    async fn empty_upload_is_allowed() {
        let d = dirs();
        let mut source = chunks(&[]);
        let asset = StagedAsset::write(&d.staging, &d.out, "4.jpg".into(), &mut source)
            .await
            .unwrap();
        assert!(asset.is_empty());
        asset.promote().await.unwrap();
        assert_eq!(std::fs::read(d.out.join("4.jpg")).unwrap(), b"");
    }

    #[tokio::test]
    async fn missing_directory_fails() {
        let d = dirs();
        let mut source = chunks(&[b"x"]);
        let err =
            StagedAsset::write(&d.staging.join("nope"), &d.out, "1.jpg".into(), &mut source).await;
        assert!(err.is_err());
    }
}
