//! Durable token storage for the GLF token registry.
//!
//! The store owns the canonical, newest-first list of token records together
//! with two derived views: a by-id index and the hashtag ranking. All three
//! live in one immutable [`Collection`] snapshot which is rebuilt and
//! published as a unit on every append.
//!
//! # Storage Backends
//!
//! All backends implement the [`TokenStore`] trait:
//!
//! - [`FileTokenStore`] -- JSON file backend with atomic replace on every write
//! - [`InMemoryTokenStore`] -- volatile store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Records are immutable; the only write is "append a new record".
//! 2. Appends are serialized by a commit lock covering check, persist and publish.
//! 3. Readers clone the current snapshot `Arc` and never see a half-applied append.
//! 4. The data file is replaced via temp-file-then-rename, never rewritten in place.
//! 5. A failed persist poisons the store; no further appends are accepted.

pub mod collection;
pub mod error;
pub mod file;
pub mod memory;
pub mod persist;
pub mod ranking;
pub mod traits;

pub use collection::Collection;
pub use error::{StoreError, StoreResult};
pub use file::FileTokenStore;
pub use memory::InMemoryTokenStore;
pub use persist::DATA_FILE;
pub use ranking::rank_hashtags;
pub use traits::TokenStore;
