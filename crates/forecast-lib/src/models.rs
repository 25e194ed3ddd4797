//! Core data models for the forecasting engine

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One day's observation as received from the caller, before validation
pub type RawLog = serde_json::Value;

/// Severity returned when there is not enough history to forecast
pub const FALLBACK_SEVERITY: f64 = 5.0;

/// Recommendation returned when there is not enough history to forecast
pub const FALLBACK_RECOMMENDATION: &str = "Start logging daily to see AI insights.";

/// Discrete risk tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Forecast output returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_severity: f64,
    pub risk_level: RiskLevel,
    pub recommendation: String,
}

impl PredictionResult {
    /// Fixed, computation-free result for histories below the strategy minimum
    pub fn fallback() -> Self {
        Self {
            predicted_severity: FALLBACK_SEVERITY,
            risk_level: RiskLevel::Low,
            recommendation: FALLBACK_RECOMMENDATION.to_string(),
        }
    }
}

/// Validated record consumed by the trend heuristic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendLog {
    pub date: NaiveDate,
    pub severity_rating: f64,
    pub nap_count: u32,
    pub is_emergency: bool,
}

/// Validated record consumed by the ensemble regression forecaster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleLog {
    pub date: NaiveDate,
    pub severity_rating: f64,
    pub agitation_level: f64,
    pub mood_rating: f64,
    pub meds_taken: bool,
    pub nap_count: u32,
    pub is_emergency: bool,
}

impl EnsembleLog {
    /// Feature row: severity, agitation, mood, meds (0/1), naps
    pub fn features(&self) -> Vec<f64> {
        vec![
            self.severity_rating,
            self.agitation_level,
            self.mood_rating,
            if self.meds_taken { 1.0 } else { 0.0 },
            self.nap_count as f64,
        ]
    }
}

/// Validated record consumed by the averaged-feature linear forecaster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearLog {
    pub date: NaiveDate,
    pub severity_rating: f64,
    pub nap_count: u32,
    pub exercise_mins: f64,
    pub meal_count: u32,
    pub is_emergency: bool,
}

impl LinearLog {
    /// Feature row: naps, exercise minutes, meals
    pub fn features(&self) -> Vec<f64> {
        vec![
            self.nap_count as f64,
            self.exercise_mins,
            self.meal_count as f64,
        ]
    }
}
