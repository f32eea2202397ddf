use std::sync::Arc;

use glf_ingest::Ingestor;
use glf_store::{FileTokenStore, TokenStore};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::service::TokenService;
use crate::state::AppState;

/// GLF token registry server.
pub struct GlfServer {
    config: ServerConfig,
    state: AppState,
}

impl GlfServer {
    /// Load the token store from `config.data_dir` and prepare the asset
    /// directories. Fails if the data file is corrupt.
    pub fn open(config: ServerConfig) -> ServerResult<Self> {
        config.validate()?;
        let store = Arc::new(FileTokenStore::open(&config.data_dir)?);
        Self::with_store(config, store)
    }

    /// Build a server around an existing store.
    pub fn with_store(config: ServerConfig, store: Arc<dyn TokenStore>) -> ServerResult<Self> {
        let ingestor = Ingestor::new(store, config.asset_dirs())?;
        let service = TokenService::new(ingestor, config.public_urls());
        Ok(Self {
            state: AppState::new(service),
            config,
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone(), &self.config)
    }

    /// Serve until `shutdown` resolves or a storage failure halts the server.
    ///
    /// Returns an error if the server stopped because of a storage failure.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> ServerResult<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        info!("GLF server listening on {}", self.config.bind_addr);

        let state = self.state.clone();
        let app = self.router();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown => info!("shutdown requested"),
                    _ = state.halted() => warn!("halting after storage failure"),
                }
            })
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        if self.state.is_halted() {
            return Err(ServerError::Unavailable);
        }
        Ok(())
    }

    /// Serve until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        self.serve_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await
    }
}
