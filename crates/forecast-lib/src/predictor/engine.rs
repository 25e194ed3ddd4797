//! Prediction orchestration
//!
//! Runs one stateless pass per call: minimum-data check, validation,
//! forecast, classification. Histories below the configured strategy's
//! minimum short-circuit to the fixed fallback before any field is read.

use super::{
    ClassifierConfig, EnsembleForecaster, ForecastStrategy, ForestConfig, LinearForecaster,
    RiskClassifier, Strategy, StrategyKind, TrendHeuristic,
};
use crate::error::{ForecastError, Result};
use crate::models::{PredictionResult, RawLog};
use crate::validator;
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

/// Engine configuration, fixed at start-up
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Forecasting strategy to run
    pub strategy: StrategyKind,
    /// Hyper-parameters for the ensemble strategy
    pub forest: ForestConfig,
    /// Risk tier thresholds
    pub classifier: ClassifierConfig,
}

impl EngineConfig {
    pub fn for_strategy(strategy: StrategyKind) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }
}

/// Terminal state reached by a prediction call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionState {
    /// Too few records; the fallback result was returned
    InsufficientData,
    /// Validation, forecast and classification all ran
    Computed,
}

/// Result of a prediction call together with how it was reached
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionOutcome {
    pub state: PredictionState,
    pub result: PredictionResult,
    pub records: usize,
    pub duration_us: u64,
}

impl PredictionOutcome {
    pub fn is_fallback(&self) -> bool {
        self.state == PredictionState::InsufficientData
    }
}

/// Stateless prediction engine
///
/// Holds only configuration. Models are fitted inside each call and
/// dropped before it returns, so one engine can serve concurrent calls.
#[derive(Debug, Clone)]
pub struct PredictionEngine {
    strategy: Strategy,
    classifier: RiskClassifier,
}

impl PredictionEngine {
    pub fn new(config: EngineConfig) -> Self {
        let strategy = match config.strategy {
            StrategyKind::Trend => Strategy::Trend(TrendHeuristic::new()),
            StrategyKind::Ensemble => Strategy::Ensemble(EnsembleForecaster::new(config.forest)),
            StrategyKind::Linear => Strategy::Linear(LinearForecaster::new()),
        };
        Self {
            strategy,
            classifier: RiskClassifier::with_config(config.classifier),
        }
    }

    pub fn strategy(&self) -> StrategyKind {
        self.strategy.kind()
    }

    /// Minimum records before the configured strategy is invoked
    pub fn min_records(&self) -> usize {
        self.strategy.kind().min_records()
    }

    /// Predict and return only the caller-facing result
    pub fn predict(&self, raw: &[RawLog]) -> Result<PredictionResult> {
        self.run(raw).map(|outcome| outcome.result)
    }

    /// Predict and report which terminal state was reached
    pub fn run(&self, raw: &[RawLog]) -> Result<PredictionOutcome> {
        match &self.strategy {
            Strategy::Trend(s) => self.run_with(s, raw),
            Strategy::Ensemble(s) => self.run_with(s, raw),
            Strategy::Linear(s) => self.run_with(s, raw),
        }
    }

    fn run_with<S: ForecastStrategy>(&self, strategy: &S, raw: &[RawLog]) -> Result<PredictionOutcome> {
        let start = Instant::now();

        if raw.len() < strategy.min_records() {
            debug!(
                strategy = strategy.name(),
                records = raw.len(),
                required = strategy.min_records(),
                "Insufficient data, returning fallback"
            );
            return Ok(PredictionOutcome {
                state: PredictionState::InsufficientData,
                result: PredictionResult::fallback(),
                records: raw.len(),
                duration_us: start.elapsed().as_micros() as u64,
            });
        }

        let history = validator::validate::<S::Record>(raw)?;
        let signals = strategy.forecast(&history)?;
        if !signals.predicted_severity().is_finite() {
            return Err(ForecastError::ModelFit(
                "forecast is not a finite number".to_string(),
            ));
        }
        let assessment = self.classifier.classify(&signals);

        let outcome = PredictionOutcome {
            state: PredictionState::Computed,
            result: PredictionResult {
                predicted_severity: signals.predicted_severity(),
                risk_level: assessment.risk_level,
                recommendation: assessment.recommendation,
            },
            records: history.len(),
            duration_us: start.elapsed().as_micros() as u64,
        };

        debug!(
            strategy = strategy.name(),
            records = outcome.records,
            predicted_severity = outcome.result.predicted_severity,
            risk_level = %outcome.result.risk_level,
            duration_us = outcome.duration_us,
            "Prediction completed"
        );

        Ok(outcome)
    }
}

impl Default for PredictionEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
