//! Service health driven by prediction outcomes
//!
//! Two stages are reported: the validator, which turns raw logs into a typed
//! history, and the forecaster, which fits a strategy and classifies the
//! result. A rejected history leaves the validator degraded but the service
//! still answers. A forecaster failure on a history that passed validation
//! marks the service unhealthy until a later request computes a prediction.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Status of one stage, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    /// Last request was rejected; predictions are still served
    Degraded,
    /// Last validated history could not be forecast
    Unhealthy,
}

impl ComponentStatus {
    pub fn is_operational(&self) -> bool {
        *self != ComponentStatus::Unhealthy
    }
}

/// Engine stage reported by `/healthz`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Validator,
    Forecaster,
}

impl Stage {
    pub const ALL: [Stage; 2] = [Stage::Validator, Stage::Forecaster];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Validator => "validator",
            Stage::Forecaster => "forecaster",
        }
    }
}

/// Last observed state of a stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_check_timestamp: i64,
}

impl ComponentHealth {
    fn observed(status: ComponentStatus, message: Option<String>) -> Self {
        Self {
            status,
            message,
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// Body of `/healthz`, keyed by stage name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub components: HashMap<String, ComponentHealth>,
}

/// Body of `/readyz`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug)]
struct StageBoard {
    validator: ComponentHealth,
    forecaster: ComponentHealth,
    started: bool,
}

impl StageBoard {
    fn stage_mut(&mut self, stage: Stage) -> &mut ComponentHealth {
        match stage {
            Stage::Validator => &mut self.validator,
            Stage::Forecaster => &mut self.forecaster,
        }
    }

    fn stage(&self, stage: Stage) -> &ComponentHealth {
        match stage {
            Stage::Validator => &self.validator,
            Stage::Forecaster => &self.forecaster,
        }
    }
}

/// Shared record of how the last predictions went
#[derive(Debug, Clone)]
pub struct HealthRegistry {
    board: Arc<RwLock<StageBoard>>,
}

impl Default for HealthRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthRegistry {
    /// Both stages start healthy; readiness waits for `mark_started`
    pub fn new() -> Self {
        let healthy = || ComponentHealth::observed(ComponentStatus::Healthy, None);
        Self {
            board: Arc::new(RwLock::new(StageBoard {
                validator: healthy(),
                forecaster: healthy(),
                started: false,
            })),
        }
    }

    pub async fn mark_started(&self) {
        self.board.write().await.started = true;
    }

    /// A prediction was computed from a validated history
    pub async fn record_prediction(&self) {
        let mut board = self.board.write().await;
        for stage in Stage::ALL {
            *board.stage_mut(stage) = ComponentHealth::observed(ComponentStatus::Healthy, None);
        }
    }

    /// A history was rejected before reaching a strategy
    pub async fn record_rejected_input(&self, details: impl Into<String>) {
        let mut board = self.board.write().await;
        *board.stage_mut(Stage::Validator) =
            ComponentHealth::observed(ComponentStatus::Degraded, Some(details.into()));
    }

    /// A validated history could not be forecast
    pub async fn record_forecast_failure(&self, details: impl Into<String>) {
        let mut board = self.board.write().await;
        *board.stage_mut(Stage::Forecaster) =
            ComponentHealth::observed(ComponentStatus::Unhealthy, Some(details.into()));
    }

    pub async fn stage(&self, stage: Stage) -> ComponentHealth {
        self.board.read().await.stage(stage).clone()
    }

    /// Worst stage status plus every stage's detail
    pub async fn health(&self) -> HealthResponse {
        let board = self.board.read().await;
        let status = Stage::ALL
            .iter()
            .map(|stage| board.stage(*stage).status)
            .max()
            .unwrap_or(ComponentStatus::Healthy);
        let components = Stage::ALL
            .iter()
            .map(|stage| (stage.as_str().to_string(), board.stage(*stage).clone()))
            .collect();
        HealthResponse { status, components }
    }

    /// Ready once the listener is up; a failing forecaster shows on `/healthz`
    pub async fn readiness(&self) -> ReadinessResponse {
        if self.board.read().await.started {
            ReadinessResponse {
                ready: true,
                reason: None,
            }
        } else {
            ReadinessResponse {
                ready: false,
                reason: Some("Service not yet initialized".to_string()),
            }
        }
    }
}
