//! Token ingestion pipeline.
//!
//! Turns one multi-part creation request into a committed token record.
//! Parts are consumed in arrival order by an [`Ingestion`] state machine:
//!
//! ```text
//! Pending --tokenId--> TokenIdKnown --finish()--> Done
//!    |                      |
//!    +------ any error -----+---------------------> Done
//! ```
//!
//! `image` and `preview` parts are only accepted once the token id is known.
//! Their bytes are streamed into a staging directory and linked to
//! `<id><ext>` / `<id>.jpg` only when the request is committed. An existing
//! asset is never replaced, and an ingestion that fails or is dropped leaves
//! no files behind.
//!
//! Concurrent ingestions for the same id are prevented by [`Reservations`]:
//! the first request to present an id holds it until it finishes.

pub mod assets;
pub mod error;
pub mod pipeline;
pub mod reservation;
pub mod source;
pub mod staging;

pub use assets::AssetDirs;
pub use error::{IngestError, IngestResult};
pub use pipeline::{IngestState, Ingestion, Ingestor, PartName};
pub use reservation::{Reservation, Reservations};
pub use source::ChunkSource;
pub use staging::StagedAsset;
