//! dex-registry server entry point.
//!
//! Restores committed state (from PostgreSQL when persistence is enabled),
//! applies genesis on first start, and serves the REST API until ctrl-c or
//! until a fatal registry error halts the node.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::EnvFilter;

use dex_registry::api;
use dex_registry::app_state::{AppState, HaltSignal};
use dex_registry::chain::ChainState;
use dex_registry::config::GatewayConfig;
use dex_registry::domain::{GenesisState, pool_counter};
use dex_registry::persistence::PostgresPersistence;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env().context("loading configuration")?;

    // Initialize tracing
    init_tracing(config.log_json);
    tracing::info!(addr = %config.listen_addr, "starting dex-registry");

    // Restore state and apply genesis
    let chain = Arc::new(open_chain(&config).await?);
    ensure_genesis(&chain, config.genesis_path.as_deref()).await?;

    // Build application state
    let state = AppState::new(chain);
    let halt = state.halt.clone();

    // Build router
    let app = api::build_app(state).layer(TimeoutLayer::new(Duration::from_secs(
        config.request_timeout_secs,
    )));

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(halt.clone()))
        .await
        .context("serving HTTP")?;

    if let Some(reason) = halt.reason() {
        bail!("node halted: {reason}");
    }
    tracing::info!("shut down cleanly");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn open_chain(config: &GatewayConfig) -> anyhow::Result<ChainState> {
    if !config.persistence_enabled {
        tracing::info!("persistence disabled, state is in-memory only");
        return Ok(ChainState::in_memory());
    }

    let persistence = PostgresPersistence::connect(config)
        .await
        .context("connecting to PostgreSQL")?;
    persistence.migrate().await.context("running migrations")?;
    let store = persistence
        .load_store()
        .await
        .context("loading committed store")?;
    let height = persistence
        .latest_commit()
        .await
        .context("reading commit log")?
        .map_or(0, |commit| commit.height);
    tracing::info!(height, keys = store.len(), "restored committed state");

    Ok(ChainState::new(store, height, Some(persistence)))
}

async fn ensure_genesis(chain: &ChainState, genesis_path: Option<&Path>) -> anyhow::Result<()> {
    let snapshot = chain.snapshot().await;
    if pool_counter::get(snapshot.store.as_ref())
        .context("reading pool counter")?
        .is_some()
    {
        if genesis_path.is_some() {
            tracing::info!("store already initialized, ignoring GENESIS_PATH");
        }
        return Ok(());
    }

    let genesis = match genesis_path {
        Some(path) => {
            let raw = tokio::fs::read(path)
                .await
                .with_context(|| format!("reading genesis file {}", path.display()))?;
            serde_json::from_slice::<GenesisState>(&raw)
                .with_context(|| format!("parsing genesis file {}", path.display()))?
        }
        None => GenesisState::default(),
    };

    chain
        .init_genesis(&genesis)
        .await
        .context("applying genesis")?;
    Ok(())
}

async fn shutdown_signal(halt: HaltSignal) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
            tracing::info!("ctrl-c received, shutting down");
        }
        () = halt.halted() => {
            tracing::error!(reason = ?halt.reason(), "halt signal received, shutting down");
        }
    }
}
