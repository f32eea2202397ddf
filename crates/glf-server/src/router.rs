use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::handler;
use crate::state::AppState;

/// Build the axum router with all token endpoints and image routes.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let router = Router::new()
        .route("/health", get(handler::health_handler))
        .route("/tokens", get(handler::list_tokens).post(handler::create_token))
        .route("/tokens/:token_id", get(handler::get_token))
        .nest_service(
            config.image_full_route.trim_end_matches('/'),
            ServeDir::new(&config.image_full_dir),
        )
        .nest_service(
            config.image_preview_route.trim_end_matches('/'),
            ServeDir::new(&config.image_preview_dir),
        )
        .layer(DefaultBodyLimit::max(config.max_upload_size))
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if config.allow_cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::mirror_request())
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}
