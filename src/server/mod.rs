//! HTTP transport
//!
//! An axum router over the executor. Block execution runs on tokio's
//! blocking pool because handlers sleep for caller-chosen durations.

pub mod api;
pub mod capture;
pub mod catalog;
pub mod types;

use axum::{
    routing::{get, post},
    Router,
};
use parking_lot::RwLock;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Notify;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::core::block::HandlerContext;
use crate::core::manifest::{ManifestError, ManifestSet, ManifestSource};
use crate::core::metrics::ExecutionStats;
use crate::core::registry::BlockRegistry;
use crate::runtime::CommandExecutor;

use capture::CaptureState;

/// Manifests and the registry built from them, swapped together on reload.
#[derive(Debug)]
pub struct Catalog {
    pub manifests: ManifestSet,
    pub registry: Arc<BlockRegistry>,
}

impl Catalog {
    pub fn new(manifests: ManifestSet) -> Self {
        let registry = Arc::new(BlockRegistry::with_builtin_modules(&manifests));
        Self { manifests, registry }
    }
}

/// State shared by every request.
pub struct AppState {
    source: ManifestSource,
    catalog: RwLock<Arc<Catalog>>,
    ctx: HandlerContext,
    stats: Arc<ExecutionStats>,
    capture: CaptureState,
    shutdown: Notify,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Load manifests from `source` and build the first registry.
    pub fn load(source: ManifestSource, ctx: HandlerContext) -> Result<Self, ManifestError> {
        let manifests = source.load()?;
        Ok(Self::with_manifests(source, manifests, ctx))
    }

    pub fn with_manifests(source: ManifestSource, manifests: ManifestSet, ctx: HandlerContext) -> Self {
        Self {
            source,
            catalog: RwLock::new(Arc::new(Catalog::new(manifests))),
            ctx,
            stats: Arc::new(ExecutionStats::new()),
            capture: CaptureState::new(),
            shutdown: Notify::new(),
        }
    }

    /// Current catalog snapshot.
    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog.read().clone()
    }

    /// An executor bound to the current registry snapshot.
    pub fn executor(&self) -> CommandExecutor {
        CommandExecutor::new(self.catalog().registry.clone(), self.ctx.clone(), self.stats.clone())
    }

    /// Re-read manifests and swap in a fresh registry.
    ///
    /// On error the current catalog stays in place.
    pub fn reload(&self) -> Result<Arc<Catalog>, ManifestError> {
        let manifests = self.source.load()?;
        let catalog = Arc::new(Catalog::new(manifests));
        *self.catalog.write() = catalog.clone();
        info!(source = %self.source, blocks = catalog.registry.len(), "block catalog reloaded");
        Ok(catalog)
    }

    pub fn stats(&self) -> &ExecutionStats {
        &self.stats
    }

    pub fn capture(&self) -> &CaptureState {
        &self.capture
    }

    pub fn request_shutdown(&self) {
        self.shutdown.notify_one();
    }

    /// Resolves once `POST /shutdown` has been called.
    pub async fn shutdown_requested(&self) {
        self.shutdown.notified().await;
    }
}

/// Build the agent's router.
pub fn router(state: SharedState, cors: bool) -> Router {
    let mut app = Router::new()
        .route("/execute", post(api::execute))
        .route("/execute-sequence", post(api::execute_sequence))
        .route("/blocks", get(api::list_blocks))
        .route("/blocks/reload", post(api::reload_blocks))
        .route("/status", get(api::status))
        .route("/stats", get(api::stats))
        .route("/display/set-source", post(api::set_source))
        .route("/display/source", get(api::get_source))
        .route("/shutdown", post(api::shutdown))
        .fallback(api::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }
    app
}

/// Resolves once `signal` fires. If the signal listener cannot be installed
/// this never resolves, so the server keeps running.
pub async fn wait_for_signal<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(err) = signal.await {
        warn!(%err, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
