use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use glf_store::TokenStore;
use glf_types::{normalize_hashtags, NewToken, TokenId, TokenRecord};
use tracing::{debug, info, warn};

use crate::assets::{full_image_name, preview_name, AssetDirs};
use crate::error::{IngestError, IngestResult};
use crate::reservation::{Reservation, Reservations};
use crate::source::ChunkSource;
use crate::staging::StagedAsset;

/// Recognized part names of a creation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartName<'a> {
    TokenId,
    Hashtags,
    Image,
    Preview,
    /// Any other field, captured verbatim as text.
    Field(&'a str),
}

impl<'a> PartName<'a> {
    pub fn parse(name: &'a str) -> Self {
        match name {
            "tokenId" => Self::TokenId,
            "hashtags" => Self::Hashtags,
            "image" => Self::Image,
            "preview" => Self::Preview,
            other => Self::Field(other),
        }
    }
}

/// Progress of one ingestion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IngestState {
    /// No token id seen yet.
    Pending,
    /// Token id parsed, unused in the store, and reserved for this request.
    TokenIdKnown(TokenId),
    /// Committed or failed; no more parts are accepted.
    Done,
}

#[derive(Clone, Copy, Debug)]
enum AssetSlot {
    Image,
    Preview,
}

/// Entry point for creation requests.
///
/// Cheap to clone; clones share the store, the asset directories and the
/// reservation table.
#[derive(Clone)]
pub struct Ingestor {
    store: Arc<dyn TokenStore>,
    dirs: Arc<AssetDirs>,
    reservations: Arc<Reservations>,
}

impl Ingestor {
    /// Create an ingestor, making sure both asset directories exist.
    pub fn new(store: Arc<dyn TokenStore>, dirs: AssetDirs) -> IngestResult<Self> {
        dirs.ensure()?;
        Ok(Self {
            store,
            dirs: Arc::new(dirs),
            reservations: Reservations::new(),
        })
    }

    /// Start processing a new request.
    pub fn begin(&self) -> Ingestion {
        Ingestion {
            store: Arc::clone(&self.store),
            dirs: Arc::clone(&self.dirs),
            reservations: Arc::clone(&self.reservations),
            state: IngestState::Pending,
            reservation: None,
            hashtags: Vec::new(),
            fields: HashMap::new(),
            image: None,
            preview: None,
        }
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    pub fn dirs(&self) -> &AssetDirs {
        &self.dirs
    }

    pub fn reservations(&self) -> &Arc<Reservations> {
        &self.reservations
    }
}

/// One creation request in progress.
///
/// Feed parts in the order they arrive with [`Ingestion::text_part`] and
/// [`Ingestion::file_part`], then call [`Ingestion::finish`]. The first error
/// moves the ingestion to [`IngestState::Done`]; staged files are discarded
/// and the reservation released when it is dropped.
pub struct Ingestion {
    store: Arc<dyn TokenStore>,
    dirs: Arc<AssetDirs>,
    reservations: Arc<Reservations>,
    state: IngestState,
    reservation: Option<Reservation>,
    hashtags: Vec<String>,
    fields: HashMap<String, String>,
    image: Option<StagedAsset>,
    preview: Option<StagedAsset>,
}

impl Ingestion {
    pub fn state(&self) -> IngestState {
        self.state
    }

    /// Consume a text part.
    pub fn text_part(&mut self, name: &str, value: String) -> IngestResult<()> {
        self.ensure_open()?;
        let result = self.apply_text(name, value);
        self.settle(result)
    }

    /// Consume a file part, streaming it to a staged file.
    ///
    /// `image` and `preview` require the token id to be known. File parts
    /// with any other name are drained and ignored.
    pub async fn file_part(
        &mut self,
        name: &str,
        filename: Option<&str>,
        source: &mut dyn ChunkSource,
    ) -> IngestResult<()> {
        self.ensure_open()?;
        let result = self.apply_file(name, filename, source).await;
        self.settle(result)
    }

    /// Commit the request: promote staged files and append the record.
    ///
    /// Promotion never replaces an existing asset; a taken file name fails
    /// the request with [`IngestError::Conflict`]. If the commit fails, only
    /// the files this ingestion created are removed again.
    pub async fn finish(mut self) -> IngestResult<TokenRecord> {
        self.ensure_open()?;
        let id = match self.state {
            IngestState::TokenIdKnown(id) => id,
            _ => {
                self.abort();
                return Err(IngestError::invalid("missing tokenId"));
            }
        };
        self.state = IngestState::Done;

        let mut token = NewToken::new(id);
        token.name = self.fields.remove("name");
        token.artist = self.fields.remove("artist");
        token.description = self.fields.remove("description");
        token.owner = self.fields.remove("owner");
        token.tx_hash = self.fields.remove("txHash");
        token.hashtags = std::mem::take(&mut self.hashtags);
        token.image = self.image.as_ref().map(|a| a.file_name().to_string());

        if !self.fields.is_empty() {
            debug!(token_id = %id, fields = ?self.fields.keys().collect::<Vec<_>>(), "ignoring unknown fields");
        }

        let mut promoted = Vec::new();
        let result = self.commit(token, &mut promoted).await;
        if result.is_err() {
            for path in promoted {
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    warn!(path = %path.display(), error = %e, "failed to remove asset of failed ingestion");
                }
            }
        }
        result
    }

    async fn commit(
        &mut self,
        token: NewToken,
        promoted: &mut Vec<PathBuf>,
    ) -> IngestResult<TokenRecord> {
        let id = token.token_id;
        for asset in [self.image.take(), self.preview.take()].into_iter().flatten() {
            match asset.promote().await {
                Ok(path) => promoted.push(path),
                Err(IngestError::Io(e)) if e.kind() == ErrorKind::AlreadyExists => {
                    warn!(token_id = %id, "asset file already exists");
                    return Err(IngestError::Conflict(id));
                }
                Err(e) => return Err(e),
            }
        }

        info!(token_id = %token.token_id, "saving token data");
        let store = Arc::clone(&self.store);
        let record = tokio::task::spawn_blocking(move || store.append(token))
            .await
            .map_err(|e| IngestError::Internal(format!("append task failed: {e}")))??;
        info!(token_id = %record.token_id, "token created");
        Ok(record)
    }

    fn apply_text(&mut self, name: &str, value: String) -> IngestResult<()> {
        debug!(field = name, "parsing multipart");
        match PartName::parse(name) {
            PartName::TokenId => self.accept_token_id(&value),
            PartName::Hashtags => {
                self.hashtags = normalize_hashtags(&value);
                Ok(())
            }
            PartName::Image | PartName::Preview => {
                Err(IngestError::invalid(format!("{name} must be a file part")))
            }
            PartName::Field(field) => {
                self.fields.insert(field.to_string(), value);
                Ok(())
            }
        }
    }

    fn accept_token_id(&mut self, raw: &str) -> IngestResult<()> {
        if self.state != IngestState::Pending {
            return Err(IngestError::invalid("duplicate tokenId"));
        }
        let id: TokenId = raw
            .parse()
            .map_err(|_| IngestError::invalid("invalid token id"))?;

        // Reserve before checking the store: an ingestion that commits in
        // between is then either still reserved or already visible.
        let reservation = self
            .reservations
            .reserve(id)
            .ok_or(IngestError::Conflict(id))?;
        if self.store.contains(id)? {
            return Err(IngestError::Conflict(id));
        }

        info!(token_id = %id, "uploading metadata");
        self.reservation = Some(reservation);
        self.state = IngestState::TokenIdKnown(id);
        Ok(())
    }

    async fn apply_file(
        &mut self,
        name: &str,
        filename: Option<&str>,
        source: &mut dyn ChunkSource,
    ) -> IngestResult<()> {
        debug!(field = name, filename = ?filename, "parsing multipart");
        let slot = match PartName::parse(name) {
            PartName::Image => AssetSlot::Image,
            PartName::Preview => AssetSlot::Preview,
            _ => {
                let mut skipped = 0usize;
                while let Some(chunk) = source.next_chunk().await? {
                    skipped += chunk.len();
                }
                debug!(field = name, bytes = skipped, "ignoring unexpected file part");
                return Ok(());
            }
        };

        let id = match self.state {
            IngestState::TokenIdKnown(id) => id,
            _ => return Err(IngestError::invalid(format!("tokenId must precede {name}"))),
        };

        let dirs = Arc::clone(&self.dirs);
        let (dir, file_name) = match slot {
            AssetSlot::Image => (&dirs.full, full_image_name(id, filename)?),
            AssetSlot::Preview => (&dirs.preview, preview_name(id)),
        };

        info!(token_id = %id, file = %file_name, "saving {name}");
        let asset = StagedAsset::write(&dirs.staging, dir, file_name, source).await?;
        info!(token_id = %id, bytes = asset.len(), "saved {name}");

        // A repeated part replaces (and discards) the earlier upload.
        match slot {
            AssetSlot::Image => self.image = Some(asset),
            AssetSlot::Preview => self.preview = Some(asset),
        }
        Ok(())
    }

    fn ensure_open(&self) -> IngestResult<()> {
        if self.state == IngestState::Done {
            return Err(IngestError::invalid("request already finished"));
        }
        Ok(())
    }

    fn settle<T>(&mut self, result: IngestResult<T>) -> IngestResult<T> {
        if result.is_err() {
            self.abort();
        }
        result
    }

    fn abort(&mut self) {
        self.state = IngestState::Done;
        self.image = None;
        self.preview = None;
        self.reservation = None;
    }
}
