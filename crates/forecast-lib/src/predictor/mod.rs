//! Severity forecasting engine
//!
//! Three interchangeable strategies share one contract: a minimum record
//! count and a `forecast` over a validated history. The engine picks one at
//! configuration time, runs it, and hands its signals to the risk classifier.

mod classifier;
mod engine;
mod ensemble;
mod forest;
mod linear;
mod regression;
mod trend;

pub use classifier::{Assessment, ClassifierConfig, RiskClassifier};
pub use engine::{EngineConfig, PredictionEngine, PredictionOutcome, PredictionState};
pub use ensemble::{EnsembleForecaster, EnsembleSignals, ENSEMBLE_MIN_RECORDS};
pub use forest::{ForestConfig, RandomForestRegressor, RegressionTree};
pub use linear::{LinearForecaster, LinearSignals, LINEAR_MIN_RECORDS};
pub use regression::{mean, round_to, LinearRegression};
pub use trend::{TrendHeuristic, TrendSignals, TREND_MIN_RECORDS, TREND_WINDOW};

use crate::error::{ForecastError, Result};
use crate::validator::{LogHistory, LogRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trait for forecasting strategies
pub trait ForecastStrategy {
    /// Typed record this strategy validates its input into
    type Record: LogRecord;

    /// Stable name used in logs and metrics
    fn name(&self) -> &'static str;

    /// Histories shorter than this get the fallback result
    fn min_records(&self) -> usize;

    /// Compute the forecast and the inputs the classifier needs
    fn forecast(&self, history: &LogHistory<Self::Record>) -> Result<ForecastSignals>;

    /// Reject histories below `min_records` when called outside the engine
    fn ensure_sufficient(&self, history: &LogHistory<Self::Record>) -> Result<()> {
        if history.len() < self.min_records() {
            return Err(ForecastError::InsufficientHistory {
                strategy: self.name(),
                required: self.min_records(),
                actual: history.len(),
            });
        }
        Ok(())
    }
}

/// Strategy output forwarded to the risk classifier
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastSignals {
    Trend(TrendSignals),
    Ensemble(EnsembleSignals),
    Linear(LinearSignals),
}

impl ForecastSignals {
    pub fn predicted_severity(&self) -> f64 {
        match self {
            ForecastSignals::Trend(s) => s.prediction(),
            ForecastSignals::Ensemble(s) => s.prediction,
            ForecastSignals::Linear(s) => s.prediction,
        }
    }
}

/// Which forecasting strategy the engine runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Short-horizon extrapolation from recent day-over-day changes
    #[default]
    #[serde(alias = "heuristic")]
    Trend,
    /// Tree ensemble trained on one-step-ahead pairs
    #[serde(alias = "random_forest", alias = "forest")]
    Ensemble,
    /// Least-squares fit evaluated at the historical mean activity
    #[serde(alias = "linear_regression")]
    Linear,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [StrategyKind::Trend, StrategyKind::Ensemble, StrategyKind::Linear];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Trend => "trend",
            StrategyKind::Ensemble => "ensemble",
            StrategyKind::Linear => "linear",
        }
    }

    pub fn min_records(&self) -> usize {
        match self {
            StrategyKind::Trend => TREND_MIN_RECORDS,
            StrategyKind::Ensemble => ENSEMBLE_MIN_RECORDS,
            StrategyKind::Linear => LINEAR_MIN_RECORDS,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "trend" | "heuristic" => Ok(StrategyKind::Trend),
            "ensemble" | "random_forest" | "forest" => Ok(StrategyKind::Ensemble),
            "linear" | "linear_regression" => Ok(StrategyKind::Linear),
            _ => Err(ForecastError::UnknownStrategy(s.to_string())),
        }
    }
}

/// A configured strategy instance
#[derive(Debug, Clone)]
pub enum Strategy {
    Trend(TrendHeuristic),
    Ensemble(EnsembleForecaster),
    Linear(LinearForecaster),
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Trend(_) => StrategyKind::Trend,
            Strategy::Ensemble(_) => StrategyKind::Ensemble,
            Strategy::Linear(_) => StrategyKind::Linear,
        }
    }
}
