//! Ensemble regression forecaster
//!
//! Trains a fresh random forest on every call. Each day's features are paired
//! with the following day's severity; the latest day is held out and used as
//! the prediction input. The model is dropped once the forecast is made.

use super::forest::{ForestConfig, RandomForestRegressor};
use super::regression::round_to;
use super::{ForecastSignals, ForecastStrategy};
use crate::error::Result;
use crate::models::EnsembleLog;
use crate::validator::LogHistory;
use tracing::debug;

/// Minimum records: two one-step-ahead pairs plus the held-out day
pub const ENSEMBLE_MIN_RECORDS: usize = 3;

/// Classifier inputs produced by the ensemble forecaster
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleSignals {
    /// Forecast rounded to one decimal place
    pub prediction: f64,
    pub latest_severity: f64,
    /// `prediction - latest_severity`
    pub diff: f64,
}

#[derive(Debug, Clone, Default)]
pub struct EnsembleForecaster {
    config: ForestConfig,
}

impl EnsembleForecaster {
    pub fn new(config: ForestConfig) -> Self {
        Self { config }
    }
}

/// One-step-ahead training pairs: features of day `i`, severity of day `i + 1`
pub fn training_pairs(records: &[EnsembleLog]) -> (Vec<Vec<f64>>, Vec<f64>) {
    records
        .windows(2)
        .map(|w| (w[0].features(), w[1].severity_rating))
        .unzip()
}

impl ForecastStrategy for EnsembleForecaster {
    type Record = EnsembleLog;

    fn name(&self) -> &'static str {
        "ensemble"
    }

    fn min_records(&self) -> usize {
        ENSEMBLE_MIN_RECORDS
    }

    fn forecast(&self, history: &LogHistory<EnsembleLog>) -> Result<ForecastSignals> {
        self.ensure_sufficient(history)?;

        let (features, targets) = training_pairs(history.records());
        let latest = history.latest();

        let prediction = {
            let model = RandomForestRegressor::fit(&features, &targets, &self.config)?;
            round_to(model.predict(&latest.features()), 1)
        };

        debug!(
            training_pairs = targets.len(),
            trees = self.config.n_trees,
            prediction,
            "Ensemble forecast computed"
        );

        Ok(ForecastSignals::Ensemble(EnsembleSignals {
            prediction,
            latest_severity: latest.severity_rating,
            diff: prediction - latest.severity_rating,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn log(day: u32, severity: f64, agitation: f64) -> EnsembleLog {
        EnsembleLog {
            date: NaiveDate::from_ymd_opt(2024, 2, day).unwrap(),
            severity_rating: severity,
            agitation_level: agitation,
            mood_rating: 5.0,
            meds_taken: true,
            nap_count: 1,
            is_emergency: false,
        }
    }

    fn signals(records: Vec<EnsembleLog>) -> EnsembleSignals {
        let history = LogHistory::from_records(records).unwrap();
        match EnsembleForecaster::default().forecast(&history).unwrap() {
            ForecastSignals::Ensemble(s) => s,
            other => panic!("unexpected signals: {:?}", other),
        }
    }

    #[test]
    fn test_training_pairs_hold_out_last_day() {
        let records = vec![log(1, 2.0, 1.0), log(2, 4.0, 2.0), log(3, 6.0, 3.0)];
        let (features, targets) = training_pairs(&records);
        assert_eq!(features.len(), 2);
        assert_eq!(targets, vec![4.0, 6.0]);
        assert_eq!(features[0][0], 2.0);
        assert_eq!(features[1][1], 2.0);
    }

    #[test]
    fn test_constant_history_forecasts_same_severity() {
        let s = signals(vec![log(1, 4.0, 2.0), log(2, 4.0, 2.0), log(3, 4.0, 2.0), log(4, 4.0, 2.0)]);
        assert_eq!(s.prediction, 4.0);
        assert_eq!(s.diff, 0.0);
    }

    #[test]
    fn test_prediction_is_rounded_and_bounded_by_targets() {
        let s = signals(vec![
            log(1, 2.0, 1.0),
            log(2, 3.0, 2.0),
            log(3, 5.0, 4.0),
            log(4, 6.0, 5.0),
            log(5, 8.0, 7.0),
        ]);
        assert_eq!(s.prediction, round_to(s.prediction, 1));
        assert!((3.0..=8.0).contains(&s.prediction));
        assert_eq!(s.latest_severity, 8.0);
        assert!((s.diff - (s.prediction - 8.0)).abs() < 1e-12);
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let records = vec![log(1, 2.0, 1.0), log(2, 7.0, 6.0), log(3, 3.0, 2.0), log(4, 6.0, 5.0)];
        let a = signals(records.clone());
        let b = signals(records);
        assert_eq!(a, b);
    }

    #[test]
    fn test_two_records_are_insufficient() {
        let history = LogHistory::from_records(vec![log(1, 2.0, 1.0), log(2, 3.0, 1.0)]).unwrap();
        assert!(EnsembleForecaster::default().forecast(&history).is_err());
    }
}
