use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use hnfeed_core::config::HnfeedConfig;
use hnfeed_hub::BroadcastHub;
use hnfeed_poller::{ChangePoller, PollerHandle, PollerSettings};
use hnfeed_store::ItemStore;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

mod app;
mod http;
mod ws;

#[derive(Debug, Parser)]
#[command(name = "hnfeed-gateway", version, about = "Paged top-items API with live update push")]
struct Cli {
    /// Path to hnfeed.toml (defaults to $HNFEED_CONFIG, then ~/.hnfeed/hnfeed.toml).
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "hnfeed_gateway=info,hnfeed_poller=info,hnfeed_store=info,tower_http=debug".into()
            }),
        )
        .init();

    let cli = Cli::parse();

    // load config: --config > HNFEED_CONFIG env > ~/.hnfeed/hnfeed.toml
    let config_path = cli.config.or_else(|| std::env::var("HNFEED_CONFIG").ok());
    let config = HnfeedConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        HnfeedConfig::default()
    });

    let store = Arc::new(ItemStore::from_config(&config.upstream)?);
    info!(base_url = %config.upstream.base_url, ttl_secs = config.upstream.cache_ttl_secs, "item store ready");

    let hub = Arc::new(BroadcastHub::new(config.hub.send_timeout()));
    let shutdown = CancellationToken::new();

    // spawn change poller in background
    let (poller_handle, poller_task) = if config.poller.enabled {
        let (poller, handle) = ChangePoller::new(
            store.clone(),
            hub.clone(),
            PollerSettings::from(&config.poller),
        );
        (handle, Some(tokio::spawn(poller.run(shutdown.clone()))))
    } else {
        info!("change poller disabled");
        (PollerHandle::detached(), None)
    };

    let addr: SocketAddr = format!("{}:{}", config.gateway.bind, config.gateway.port).parse()?;

    let state = Arc::new(app::AppState::new(
        config,
        store,
        hub.clone(),
        poller_handle,
    ));
    let router = app::build_router(state);

    info!("hnfeed gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let stop = shutdown.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            stop.cancel();
            // sends Close to every open updates socket, grouped or not
            hub.close_all().await;
        })
        .await?;

    if let Some(task) = poller_task {
        if let Err(e) = task.await {
            tracing::warn!("poller task ended abnormally: {e}");
        }
    }
    info!("hnfeed gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
