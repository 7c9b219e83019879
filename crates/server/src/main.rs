//! Sales Agent Server Entry Point

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use sales_agent_agent::{DialogueMachine, SessionStore};
use sales_agent_config::{load_settings, Settings};
use sales_agent_core::{EmbeddingProvider, InventoryStore};
use sales_agent_llm::CallRouter;
use sales_agent_rag::{InMemoryInventory, OpenAiEmbedder, RankerSettings, VectorSearch, VehicleRanker};
use sales_agent_server::{create_router, init_metrics, start_idle_reaper, AppState};
use sales_agent_tools::{FinancingCalculator, TradeInEstimator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
    let env = std::env::var("SALES_AGENT_ENV").ok();
    let config = match load_settings(env.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            // Tracing not yet initialized
            eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
            Settings::default()
        }
    };

    init_tracing(&config);

    tracing::info!("Starting Sales Agent Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        environment = ?config.environment,
        config_path = env.as_deref().unwrap_or("default"),
        "Configuration loaded"
    );

    let metrics_handle = if config.observability.metrics_enabled {
        let handle = init_metrics();
        if handle.is_some() {
            tracing::info!("Initialized Prometheus metrics at /metrics");
        }
        handle
    } else {
        None
    };

    let inventory: Arc<dyn InventoryStore> = Arc::new(load_inventory(&config)?);

    let embedder: Arc<dyn EmbeddingProvider> =
        Arc::new(OpenAiEmbedder::new(&config.embedding).context("embedding client")?);
    let search = Arc::new(VectorSearch::new(inventory.clone(), embedder, &config.ranker));
    let ranker = Arc::new(VehicleRanker::new(
        search.clone(),
        RankerSettings::from(&config.ranker),
    ));

    let router = match CallRouter::from_config(&config.llm) {
        Ok(router) => Some(Arc::new(router)),
        Err(e) => {
            tracing::warn!(error = %e, "Chat providers unavailable, open questions use fixed replies");
            None
        }
    };

    let sessions = Arc::new(SessionStore::new());
    let machine = DialogueMachine::new(
        sessions.clone(),
        inventory,
        ranker,
        router,
        FinancingCalculator::new(&config.financing),
        TradeInEstimator::new(&config.trade_in),
    );

    if search.embeddings_available() {
        let search = search.clone();
        tokio::spawn(async move {
            if let Err(e) = search.sync_embeddings().await {
                tracing::warn!(error = %e, "Startup embedding sync failed");
            }
        });
    }

    let reaper = (config.session.idle_timeout_secs > 0).then(|| {
        start_idle_reaper(
            sessions,
            Duration::from_secs(config.session.cleanup_interval_secs.max(1)),
            Duration::from_secs(config.session.idle_timeout_secs),
        )
    });

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server address")?;

    let mut state = AppState::new(config, machine, search);
    if let Some(handle) = metrics_handle {
        state = state.with_metrics(handle);
    }
    let app = create_router(state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(reaper) = reaper {
        let _ = reaper.send(true);
    }
    tracing::info!("Server shutdown complete");
    Ok(())
}

fn load_inventory(config: &Settings) -> anyhow::Result<InMemoryInventory> {
    let Some(path) = config.inventory.catalog_path.as_deref() else {
        tracing::warn!("No inventory catalogue configured, starting empty");
        return Ok(InMemoryInventory::new(Vec::new()));
    };

    InMemoryInventory::from_file(Path::new(path))
        .with_context(|| format!("failed to load inventory from {}", path))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

fn init_tracing(config: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.observability.log_level;
        format!("sales_agent={},tower_http=debug", level).into()
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    subscriber.with(fmt_layer).init();
}
