//! Carecast forecast service
//!
//! Serves next-day severity forecasts for caregiving logs over HTTP,
//! alongside health, readiness and Prometheus endpoints.

use anyhow::{Context, Result};
use forecast_api::{api, config::ServiceConfig};
use forecast_lib::{
    health::HealthRegistry,
    observability::{EngineMetrics, StructuredLogger},
    PredictionEngine,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting forecast-api");

    let config = ServiceConfig::load().context("Failed to load service configuration")?;
    let engine_config = config.to_engine_config()?;
    let strategy = engine_config.strategy;
    info!(
        strategy = %strategy,
        forest_trees = engine_config.forest.n_trees,
        "Service configured"
    );

    let health_registry = HealthRegistry::new();

    let metrics = EngineMetrics::new();
    metrics.set_strategy(strategy);

    let logger = StructuredLogger::new(&config.service_name);

    let app_state = Arc::new(api::AppState::new(
        health_registry.clone(),
        metrics,
        logger.clone(),
        PredictionEngine::new(engine_config),
    ));

    health_registry.mark_started().await;

    let address = config.address();
    logger.log_startup(SERVICE_VERSION, strategy, &address);

    api::serve(&address, app_state, shutdown_signal())
        .await
        .with_context(|| format!("API server on {} failed", address))?;

    logger.log_shutdown("SIGINT received");
    info!("Shutting down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
