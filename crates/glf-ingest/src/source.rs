use async_trait::async_trait;
use bytes::Bytes;

use crate::error::IngestResult;

/// A stream of body chunks for one file part.
///
/// The pipeline pulls the next chunk only after the previous one has been
/// written, so a slow disk naturally slows down the upload.
#[async_trait]
pub trait ChunkSource: Send {
    /// Next chunk, or `Ok(None)` once the part is exhausted.
    async fn next_chunk(&mut self) -> IngestResult<Option<Bytes>>;
}

/// In-memory chunk lists, mostly useful for tests and embedding.
#[async_trait]
impl ChunkSource for std::vec::IntoIter<Bytes> {
    async fn next_chunk(&mut self) -> IngestResult<Option<Bytes>> {
        Ok(self.next())
    }
}
