use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use macro_agent::config::AgentConfig;
use macro_agent::devices::SoftwareMixer;
use macro_agent::server::{self, AppState};
use macro_agent::HandlerContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AgentConfig::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting macro-agent v{}", macro_agent::VERSION);

    let source = config.manifest_source();
    if config.blocks_dir.is_some() && source == macro_agent::core::ManifestSource::Embedded {
        warn!("blocks directory not found, using built-in manifests");
    }
    info!(%source, "loading block manifests");

    let state = Arc::new(
        AppState::load(source, handler_context()).context("failed to load block manifests")?,
    );
    {
        let catalog = state.catalog();
        let report = catalog.registry.report();
        info!(
            categories = report.categories_loaded,
            blocks = report.blocks_loaded,
            unresolved = report.unresolved.len(),
            "blocks ready"
        );
    }

    let app = server::router(state.clone(), config.cors());
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await?;

    info!("Agent stopped");
    Ok(())
}

#[cfg(feature = "native-input")]
fn handler_context() -> HandlerContext {
    info!("using native input driver");
    HandlerContext::new(
        Arc::new(macro_agent::devices::NativeInputDriver::new()),
        Arc::new(SoftwareMixer::default()),
    )
}

#[cfg(not(feature = "native-input"))]
fn handler_context() -> HandlerContext {
    info!("using recording input driver; build with --features native-input to drive real devices");
    HandlerContext::new(
        Arc::new(macro_agent::devices::RecordingDriver::new()),
        Arc::new(SoftwareMixer::default()),
    )
}

async fn shutdown_signal(state: Arc<AppState>) {
    let ctrl_c = server::wait_for_signal(tokio::signal::ctrl_c());

    tokio::select! {
        _ = state.shutdown_requested() => info!("shutdown requested over HTTP"),
        _ = ctrl_c => info!("received Ctrl-C"),
    }
}
