use axum::extract::{Multipart, Path, State};
use axum::response::Json;
use glf_types::TokenRecord;
use serde::Serialize;

use crate::error::ServerResult;
use crate::format::{TokenList, TokenView};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub tokens: usize,
}

/// Health check handler.
pub async fn health_handler(State(state): State<AppState>) -> ServerResult<Json<HealthResponse>> {
    state.ensure_running()?;
    let tokens = state.service().store().snapshot()?.len();
    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        tokens,
    }))
}

/// `GET /tokens`
pub async fn list_tokens(State(state): State<AppState>) -> ServerResult<Json<TokenList>> {
    state.ensure_running()?;
    let list = state.service().list_tokens().map_err(|e| state.escalate(e))?;
    Ok(Json(list))
}

/// `GET /tokens/:token_id`
pub async fn get_token(
    State(state): State<AppState>,
    Path(token_id): Path<String>,
) -> ServerResult<Json<TokenView>> {
    state.ensure_running()?;
    let view = state.service().get_token(&token_id).map_err(|e| state.escalate(e))?;
    Ok(Json(view))
}

/// `POST /tokens` (multipart)
pub async fn create_token(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ServerResult<Json<TokenRecord>> {
    state.ensure_running()?;
    let record = state
        .service()
        .create_token(multipart)
        .await
        .map_err(|e| state.escalate(e))?;
    Ok(Json(record))
}
