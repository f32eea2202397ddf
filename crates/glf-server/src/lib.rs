//! HTTP server for the GLF token registry.
//!
//! Routes:
//!
//! - `GET /tokens` -- all tokens, newest first, plus the hashtag ranking
//! - `GET /tokens/:token_id` -- one token with its attribute list
//! - `POST /tokens` -- multipart creation (`tokenId`, `hashtags`, `image`, `preview`, ...)
//! - `GET /health` -- liveness check
//! - image routes serving saved full images and previews
//!
//! Caller errors are answered with `422` and a plain-text message. Storage
//! failures answer `500`, halt the server state and trigger shutdown.

pub mod config;
pub mod error;
pub mod format;
pub mod handler;
pub mod router;
pub mod server;
pub mod service;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use format::{format_token, format_token_detail, Attribute, PublicUrls, TokenList, TokenView};
pub use server::GlfServer;
pub use service::TokenService;
pub use state::AppState;
