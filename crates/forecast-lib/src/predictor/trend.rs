//! Rule-based trend heuristic
//!
//! Extrapolates the latest severity by the mean of the most recent
//! day-over-day changes.

use super::regression::mean;
use super::{ForecastSignals, ForecastStrategy};
use crate::error::Result;
use crate::models::TrendLog;
use crate::validator::LogHistory;

/// Minimum records before a trend can be extrapolated
pub const TREND_MIN_RECORDS: usize = 2;

/// Number of trailing day-over-day changes averaged into the trend
pub const TREND_WINDOW: usize = 3;

/// Classifier inputs produced by the trend heuristic
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSignals {
    pub latest: f64,
    pub trend: f64,
    pub avg_naps: f64,
    pub any_emergency: bool,
}

impl TrendSignals {
    /// Forecast is the latest severity plus one step of trend
    pub fn prediction(&self) -> f64 {
        self.latest + self.trend
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrendHeuristic;

impl TrendHeuristic {
    pub fn new() -> Self {
        Self
    }
}

impl ForecastStrategy for TrendHeuristic {
    type Record = TrendLog;

    fn name(&self) -> &'static str {
        "trend"
    }

    fn min_records(&self) -> usize {
        TREND_MIN_RECORDS
    }

    fn forecast(&self, history: &LogHistory<TrendLog>) -> Result<ForecastSignals> {
        self.ensure_sufficient(history)?;

        let severities = history.severities();
        let naps: Vec<f64> = history.records().iter().map(|r| r.nap_count as f64).collect();

        Ok(ForecastSignals::Trend(TrendSignals {
            latest: history.latest().severity_rating,
            trend: recent_trend(&severities, TREND_WINDOW),
            avg_naps: mean(&naps),
            any_emergency: history.any_emergency(),
        }))
    }
}

/// Mean of the last `window` day-over-day differences; 0 when there are none
pub fn recent_trend(values: &[f64], window: usize) -> f64 {
    let diffs: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    let tail = &diffs[diffs.len().saturating_sub(window)..];
    let trend = mean(tail);
    if trend.is_nan() {
        0.0
    } else {
        trend
    }
}
