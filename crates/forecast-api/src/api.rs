//! HTTP API for predictions, health checks and Prometheus metrics

use forecast_lib::{
    health::{ComponentStatus, HealthRegistry},
    observability::{EngineMetrics, StructuredLogger},
    PredictionEngine, PredictionResult, RawLog,
};
use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub health_registry: HealthRegistry,
    pub metrics: EngineMetrics,
    pub logger: StructuredLogger,
    pub engine: Arc<PredictionEngine>,
}

impl AppState {
    pub fn new(
        health_registry: HealthRegistry,
        metrics: EngineMetrics,
        logger: StructuredLogger,
        engine: PredictionEngine,
    ) -> Self {
        Self {
            health_registry,
            metrics,
            logger,
            engine: Arc::new(engine),
        }
    }
}

/// Errors surfaced by the predict endpoint
#[derive(Debug)]
pub enum ApiError {
    /// A record failed validation
    MalformedInput(String),
    /// The engine failed for any other reason
    PredictionFailed(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            ApiError::MalformedInput(details) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "malformed_input", details)
            }
            ApiError::PredictionFailed(details) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "prediction_failed", details)
            }
        };
        (status, Json(json!({ "error": error, "details": details }))).into_response()
    }
}

/// Forecast tomorrow's severity from a JSON array of daily logs
async fn predict(
    State(state): State<Arc<AppState>>,
    Json(logs): Json<Vec<RawLog>>,
) -> Result<Json<PredictionResult>, ApiError> {
    let engine = Arc::clone(&state.engine);
    let strategy = engine.strategy();
    let records = logs.len();

    let outcome = match tokio::task::spawn_blocking(move || engine.run(&logs)).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, "Prediction task failed");
            let details = e.to_string();
            state
                .health_registry
                .record_forecast_failure(details.clone())
                .await;
            return Err(ApiError::PredictionFailed(details));
        }
    };

    match outcome {
        Ok(outcome) => {
            state
                .metrics
                .observe_prediction_latency(outcome.duration_us as f64 / 1_000_000.0);

            if outcome.is_fallback() {
                state.metrics.inc_fallback();
                state.logger.log_fallback(strategy, outcome.records);
            } else {
                state
                    .metrics
                    .inc_prediction(strategy, outcome.result.risk_level);
                state.logger.log_prediction(
                    strategy,
                    outcome.records,
                    outcome.result.predicted_severity,
                    outcome.result.risk_level,
                    outcome.duration_us,
                );
                state.health_registry.record_prediction().await;
            }

            Ok(Json(outcome.result))
        }
        Err(err) if err.is_malformed() => {
            let details = err.to_string();
            state.metrics.inc_malformed_input();
            state.logger.log_malformed_input(strategy, records, &details);
            state
                .health_registry
                .record_rejected_input(details.clone())
                .await;
            Err(ApiError::MalformedInput(details))
        }
        Err(err) => {
            let details = err.to_string();
            error!(strategy = %strategy, records, error = %details, "Prediction failed");
            state
                .health_registry
                .record_forecast_failure(details.clone())
                .await;
            Err(ApiError::PredictionFailed(details))
        }
    }
}

/// Health check response - returns 503 once the forecaster is failing
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK, // Still operational
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/predict", post(predict))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .layer(cors)
        .with_state(state)
}

/// Start the API server and run until `shutdown` resolves
pub async fn serve<F>(addr: &str, state: Arc<AppState>, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);

    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
