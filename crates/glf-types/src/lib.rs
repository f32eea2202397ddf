//! Foundation types for the GLF token registry.
//!
//! Every other GLF crate depends on `glf-types`. The types here describe a
//! token record as it is persisted on disk and exchanged with clients.
//!
//! # Key Types
//!
//! - [`TokenId`]: Caller-assigned, unique, non-negative token identifier
//! - [`NewToken`]: A token record before the store stamps its creation time
//! - [`TokenRecord`]: The persisted, immutable token record
//! - [`normalize_hashtags`]: Tag normalization used for ingestion and ranking

pub mod error;
pub mod hashtag;
pub mod timestamp;
pub mod token;

pub use error::TypeError;
pub use hashtag::normalize_hashtags;
pub use token::{NewToken, TokenId, TokenRecord};
