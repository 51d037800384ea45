use tracing_subscriber::EnvFilter;

use wirehttp::config::Config;
use wirehttp::demo::DemoHandler;
use wirehttp::proxy::Upstream;
use wirehttp::server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let upstream = Upstream::new(cfg.upstream()?, cfg.upstream_timeout());

    let server = Server::serve(&cfg.listen_addr, DemoHandler::new(upstream)).await?;
    tracing::info!("Server started on {}", server.local_addr());

    shutdown_signal().await?;
    tracing::info!("Shutdown signal received");

    server.close().await?;
    tracing::info!("Server gracefully stopped");
    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() -> anyhow::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res?,
        _ = terminate.recv() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn shutdown_signal() -> anyhow::Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
