//! Asset directory layout and file naming.

use std::fs;
use std::path::{Path, PathBuf};

use glf_types::TokenId;

use crate::error::{IngestError, IngestResult};

/// Directories holding full-resolution images and previews.
///
/// Uploads are written to `staging` first. It must not be publicly served
/// and must live on the same filesystem as `full` and `preview`, since
/// staged files are hard-linked into place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetDirs {
    pub full: PathBuf,
    pub preview: PathBuf,
    pub staging: PathBuf,
}

impl AssetDirs {
    pub fn new(
        full: impl Into<PathBuf>,
        preview: impl Into<PathBuf>,
        staging: impl Into<PathBuf>,
    ) -> Self {
        Self {
            full: full.into(),
            preview: preview.into(),
            staging: staging.into(),
        }
    }

    /// Create all three directories if they are missing.
    pub fn ensure(&self) -> IngestResult<()> {
        fs::create_dir_all(&self.full)?;
        fs::create_dir_all(&self.preview)?;
        fs::create_dir_all(&self.staging)?;
        Ok(())
    }
}

/// File name of a token's full image: `<id><ext>`.
///
/// `<ext>` is the uploaded file's extension including the dot, or nothing if
/// it has none. Extensions are restricted to ASCII letters and digits.
pub fn full_image_name(id: TokenId, original: Option<&str>) -> IngestResult<String> {
    let ext = original
        .map(Path::new)
        .and_then(Path::extension)
        .map(|e| e.to_string_lossy())
        .filter(|e| !e.is_empty());

    match ext {
        None => Ok(id.to_string()),
        Some(ext) if ext.chars().all(|c| c.is_ascii_alphanumeric()) => Ok(format!("{id}.{ext}")),
        Some(ext) => Err(IngestError::invalid(format!("unsupported image extension: {ext:?}"))),
    }
}

/// File name of a token's preview. Always `<id>.jpg`, whatever was uploaded.
pub fn preview_name(id: TokenId) -> String {
    format!("{id}.jpg")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_keeps_extension() {
        let id = TokenId::new(1);
        assert_eq!(full_image_name(id, Some("cat.png")).unwrap(), "1.png");
        assert_eq!(full_image_name(id, Some("archive.tar.GZ")).unwrap(), "1.GZ");
        assert_eq!(full_image_name(id, Some("../../etc/x.jpeg")).unwrap(), "1.jpeg");
    }

    #[test]
    fn full_name_without_extension() {
        let id = TokenId::new(12);
        assert_eq!(full_image_name(id, None).unwrap(), "12");
        assert_eq!(full_image_name(id, Some("README")).unwrap(), "12");
        assert_eq!(full_image_name(id, Some(".hidden")).unwrap(), "12");
    }

    #[test]
    fn odd_extension_rejected() {
        let err = full_image_name(TokenId::new(1), Some("a.p g")).unwrap_err();
        assert!(matches!(err, IngestError::InvalidInput(_)));
    }

    #[test]
    fn preview_is_always_jpg() {
        assert_eq!(preview_name(TokenId::new(5)), "5.jpg");
    }

    #[test]
    fn ensure_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let dirs = AssetDirs::new(
            dir.path().join("full"),
            dir.path().join("p/q"),
            dir.path().join(".staging"),
        );
        dirs.ensure().unwrap();
        assert!(dirs.full.is_dir());
        assert!(dirs.preview.is_dir());
        assert!(dirs.staging.is_dir());
    }
}
