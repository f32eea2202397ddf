//! Boundary operations behind the HTTP routes.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use glf_ingest::{ChunkSource, IngestError, IngestResult, Ingestor};
use glf_store::TokenStore;
use glf_types::{TokenId, TokenRecord};

use crate::error::{ServerError, ServerResult};
use crate::format::{format_token, format_token_detail, PublicUrls, TokenList, TokenView};

/// List, look up and create tokens.
#[derive(Clone)]
pub struct TokenService {
    store: Arc<dyn TokenStore>,
    ingestor: Ingestor,
    urls: PublicUrls,
}

impl TokenService {
    pub fn new(ingestor: Ingestor, urls: PublicUrls) -> Self {
        Self {
            store: Arc::clone(ingestor.store()),
            ingestor,
            urls,
        }
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    pub fn urls(&self) -> &PublicUrls {
        &self.urls
    }

    /// All tokens, newest first, plus the hashtag ranking.
    pub fn list_tokens(&self) -> ServerResult<TokenList> {
        let snapshot = self.store.snapshot()?;
        Ok(TokenList {
            tokens: snapshot.records().map(|r| format_token(r, &self.urls)).collect(),
            hashtags: snapshot.hashtags().to_vec(),
        })
    }

    /// One token with its attribute list.
    pub fn get_token(&self, raw_id: &str) -> ServerResult<TokenView> {
        let id: TokenId = raw_id
            .parse()
            .map_err(|_| ServerError::InvalidInput("invalid token id".into()))?;
        let record = self
            .store
            .lookup(id)?
            .ok_or_else(|| ServerError::NotFound("token does not exist".into()))?;
        Ok(format_token_detail(&record, &self.urls))
    }

    /// Create a token from a multipart request, consuming parts in order.
    ///
    /// Parts with a filename are streamed as files; all others are read as
    /// text. The pipeline decides whether the part name fits its kind.
    pub async fn create_token(&self, mut multipart: Multipart) -> ServerResult<TokenRecord> {
        let mut ingestion = self.ingestor.begin();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(filename) => {
                    let mut source = FieldChunks::new(field);
                    let result = ingestion
                        .file_part(&name, Some(&filename), &mut source)
                        .await;
                    if let Err(e) = result {
                        // Keep the body error so limits map to their own status.
                        return Err(source
                            .error
                            .take()
                            .map_or_else(|| e.into(), ServerError::Multipart));
                    }
                }
                None => {
                    let value = field.text().await?;
                    ingestion.text_part(&name, value)?;
                }
            }
        }
        Ok(ingestion.finish().await?)
    }
}

/// Streams one multipart field chunk by chunk.
struct FieldChunks<'a> {
    field: Field<'a>,
    error: Option<MultipartError>,
}

impl<'a> FieldChunks<'a> {
    fn new(field: Field<'a>) -> Self {
        Self { field, error: None }
    }
}

#[async_trait]
impl<'a> ChunkSource for FieldChunks<'a> {
    async fn next_chunk(&mut self) -> IngestResult<Option<Bytes>> {
        match self.field.chunk().await {
            Ok(chunk) => Ok(chunk),
            Err(e) => {
                let message = format!("failed to read upload: {}", e.body_text());
                self.error = Some(e);
                Err(IngestError::InvalidInput(message))
            }
        }
    }
}
