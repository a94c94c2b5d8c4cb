pub mod api;
pub mod cli;
pub mod core;
pub mod providers;
pub mod scheduler;
pub mod service;
pub mod store;

use crate::core::config::{AppConfig, RefreshConfig};
use crate::providers::ExchangeRatesApiProvider;
use crate::scheduler::RefreshScheduler;
use crate::service::CurrencyService;
use anyhow::{Context, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

pub enum AppCommand {
    Serve,
    Refresh,
    List,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("xrates starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(
        base_currency = %config.base_currency,
        refresh_secs = config.refresh.interval_secs,
        persist = config.storage.persist,
        "Loaded config"
    );

    match command {
        AppCommand::Serve => {
            let service = build_service(&config)?;
            let listener = TcpListener::bind(&config.server.address)
                .await
                .with_context(|| format!("Failed to bind {}", config.server.address))?;
            serve(listener, service, config.refresh.clone(), shutdown_signal()).await
        }
        AppCommand::Refresh => {
            let service = build_service(&config)?;
            cli::currencies::refresh(&service).await
        }
        AppCommand::List => {
            // Store only, no provider credentials needed
            let store = store::open_store(&config)?;
            cli::currencies::list(store.as_ref()).await
        }
    }
}

/// Wires the configured store and upstream provider into a service.
pub fn build_service(config: &AppConfig) -> Result<Arc<CurrencyService>> {
    let store = store::open_store(config)?;
    let provider = ExchangeRatesApiProvider::from_config(&config.provider)?;
    Ok(Arc::new(CurrencyService::new(
        store,
        Arc::new(provider),
        &config.base_currency,
    )))
}

/// Serves the API on `listener` and runs the refresh scheduler until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    service: Arc<CurrencyService>,
    refresh: RefreshConfig,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let scheduler = RefreshScheduler::new(Arc::clone(&service), refresh.interval())
        .run_on_startup(refresh.on_startup)
        .spawn();

    info!(address = %listener.local_addr()?, "Serving currency API");
    let result = axum::serve(listener, api::router(service))
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed");

    scheduler.shutdown().await;
    info!("Server stopped");
    result
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => {
            error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
