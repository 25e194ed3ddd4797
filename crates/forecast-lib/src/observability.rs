//! Observability infrastructure for the forecasting service
//!
//! Provides:
//! - Prometheus metrics (prediction latency, outcomes per risk tier, fallbacks, rejected input)
//! - Structured JSON logging with tracing

use crate::models::RiskLevel;
use crate::predictor::StrategyKind;
use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, register_int_counter_vec,
    GaugeVec, Histogram, IntCounter, IntCounterVec,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<EngineMetricsInner> = OnceLock::new();

struct EngineMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions_total: IntCounterVec,
    fallbacks_total: IntCounter,
    malformed_inputs_total: IntCounter,
    strategy_info: GaugeVec,
}

impl EngineMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "carecast_prediction_latency_seconds",
                "Time spent validating, forecasting and classifying one log history",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_total: register_int_counter_vec!(
                "carecast_predictions_total",
                "Computed predictions by strategy and risk level",
                &["strategy", "risk_level"]
            )
            .expect("Failed to register predictions_total"),

            fallbacks_total: register_int_counter!(
                "carecast_fallbacks_total",
                "Requests answered with the insufficient-data fallback"
            )
            .expect("Failed to register fallbacks_total"),

            malformed_inputs_total: register_int_counter!(
                "carecast_malformed_inputs_total",
                "Requests rejected because a record failed validation"
            )
            .expect("Failed to register malformed_inputs_total"),

            strategy_info: register_gauge_vec!(
                "carecast_strategy_info",
                "Forecasting strategy the service was started with",
                &["strategy"]
            )
            .expect("Failed to register strategy_info"),
        }
    }
}

/// Engine metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share it.
#[derive(Clone)]
pub struct EngineMetrics {
    _private: (),
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(EngineMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &EngineMetricsInner {
        GLOBAL_METRICS.get_or_init(EngineMetricsInner::new)
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    /// Count a computed prediction
    pub fn inc_prediction(&self, strategy: StrategyKind, risk_level: RiskLevel) {
        self.inner()
            .predictions_total
            .with_label_values(&[strategy.as_str(), risk_level.as_str()])
            .inc();
    }

    pub fn inc_fallback(&self) {
        self.inner().fallbacks_total.inc();
    }

    pub fn inc_malformed_input(&self) {
        self.inner().malformed_inputs_total.inc();
    }

    /// Publish the active strategy
    pub fn set_strategy(&self, strategy: StrategyKind) {
        self.inner().strategy_info.reset();
        self.inner()
            .strategy_info
            .with_label_values(&[strategy.as_str()])
            .set(1.0);
    }

    pub fn predictions(&self, strategy: StrategyKind, risk_level: RiskLevel) -> u64 {
        self.inner()
            .predictions_total
            .with_label_values(&[strategy.as_str(), risk_level.as_str()])
            .get()
    }

    pub fn fallbacks(&self) -> u64 {
        self.inner().fallbacks_total.get()
    }

    pub fn malformed_inputs(&self) -> u64 {
        self.inner().malformed_inputs_total.get()
    }
}

/// Structured logger for service events
///
/// Every event carries an `event` field so log pipelines can filter on it.
#[derive(Clone)]
pub struct StructuredLogger {
    service_name: String,
}

impl StructuredLogger {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Log a computed prediction
    pub fn log_prediction(
        &self,
        strategy: StrategyKind,
        records: usize,
        predicted_severity: f64,
        risk_level: RiskLevel,
        duration_us: u64,
    ) {
        info!(
            event = "prediction_generated",
            service = %self.service_name,
            strategy = %strategy,
            records = records,
            predicted_severity = predicted_severity,
            risk_level = %risk_level,
            duration_us = duration_us,
            "Generated severity forecast"
        );
    }

    /// Log a request answered with the fallback result
    pub fn log_fallback(&self, strategy: StrategyKind, records: usize) {
        info!(
            event = "prediction_fallback",
            service = %self.service_name,
            strategy = %strategy,
            records = records,
            required = strategy.min_records(),
            "Not enough history, returned fallback forecast"
        );
    }

    /// Log a rejected request
    pub fn log_malformed_input(&self, strategy: StrategyKind, records: usize, details: &str) {
        warn!(
            event = "malformed_input",
            service = %self.service_name,
            strategy = %strategy,
            records = records,
            details = %details,
            "Rejected malformed log history"
        );
    }

    pub fn log_startup(&self, version: &str, strategy: StrategyKind, address: &str) {
        info!(
            event = "service_started",
            service = %self.service_name,
            version = %version,
            strategy = %strategy,
            address = %address,
            "Forecast service started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service_name,
            reason = %reason,
            "Forecast service shutting down"
        );
    }
}
