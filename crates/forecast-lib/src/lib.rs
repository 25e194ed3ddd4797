//! Caregiving severity forecasting engine
//!
//! This crate provides the core functionality for:
//! - Validation of raw daily caregiving logs into typed histories
//! - Severity forecasting (trend heuristic, tree ensemble, linear regression)
//! - Risk tier classification and recommendations
//! - Health checks and observability

pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod validator;

pub use error::{ForecastError, Result};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse, Stage,
};
pub use models::*;
pub use observability::{EngineMetrics, StructuredLogger};
pub use predictor::{
    EngineConfig, PredictionEngine, PredictionOutcome, PredictionState, StrategyKind,
};
