use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use macro_agent::config::CatalogConfig;
use macro_agent::server::catalog::catalog_router;
use macro_agent::server::wait_for_signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CatalogConfig::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    anyhow::ensure!(
        config.root.is_dir(),
        "{} is not a directory",
        config.root.display()
    );

    let app = catalog_router(&config.root);
    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Serving {} on http://{}", config.root.display(), addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            wait_for_signal(tokio::signal::ctrl_c()).await;
            info!("Server stopped");
        })
        .await?;
    Ok(())
}
