use anyhow::Result;
use monitor_service::{api, config::AppConfig, metrics_server, observability, sinks::UplinkArchive, store};
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    observability::init_tracing();

    let cfg = AppConfig::load()?;

    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    let store = store::connect(&cfg.database).await?;

    let archive = cfg.archive.enabled.then(|| UplinkArchive::new(&cfg.archive.dir));
    match &archive {
        Some(a) => tracing::info!(dir = %a.dir().display(), "archiving raw uplinks"),
        None => tracing::info!("raw uplink archive disabled"),
    }

    let state = api::ApiState {
        store,
        archive,
        poll_interval: cfg.broadcast.interval(),
    };
    let app = api::build_router(state);

    let addr: SocketAddr = cfg
        .http
        .bind_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid http.bind_addr: {e}"))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, interval = ?cfg.broadcast.interval(), "energy monitor listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("energy monitor stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    }
}
