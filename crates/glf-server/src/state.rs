use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

use crate::error::{ServerError, ServerResult};
use crate::service::TokenService;

/// Shared state handed to every request handler.
///
/// Once a storage failure has been observed the state is halted: handlers
/// refuse further requests and the server is asked to shut down.
#[derive(Clone)]
pub struct AppState {
    service: Arc<TokenService>,
    halted: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
}

impl AppState {
    pub fn new(service: TokenService) -> Self {
        Self {
            service: Arc::new(service),
            halted: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(Notify::new()),
        }
    }

    pub fn service(&self) -> &TokenService {
        &self.service
    }

    /// Fails with [`ServerError::Unavailable`] once halted.
    pub fn ensure_running(&self) -> ServerResult<()> {
        if self.is_halted() {
            return Err(ServerError::Unavailable);
        }
        Ok(())
    }

    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::Acquire)
    }

    /// Halt on fatal errors; pass the error through either way.
    pub fn escalate(&self, err: ServerError) -> ServerError {
        if err.is_fatal() && !self.halted.swap(true, Ordering::AcqRel) {
            tracing::error!(error = %err, "storage failure; refusing further requests and shutting down");
            self.shutdown.notify_one();
        }
        err
    }

    /// Resolves once a fatal error has halted the state.
    pub async fn halted(&self) {
        if self.is_halted() {
            return;
        }
        self.shutdown.notified().await;
    }
}
