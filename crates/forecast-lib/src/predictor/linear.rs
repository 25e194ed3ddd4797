//! Averaged-feature linear forecaster
//!
//! Fits severity against naps, exercise and meals over the whole history,
//! then evaluates the fit at the mean of each feature rather than at the
//! latest day. Because a least-squares plane with an intercept passes
//! through the centroid of its training data, the forecast equals the
//! historical mean severity and does not react to the most recent day.

use super::regression::{column_means, LinearRegression};
use super::{ForecastSignals, ForecastStrategy};
use crate::error::Result;
use crate::models::LinearLog;
use crate::validator::LogHistory;
use tracing::debug;

pub const LINEAR_MIN_RECORDS: usize = 3;

/// Classifier inputs produced by the linear forecaster
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSignals {
    pub prediction: f64,
    pub any_emergency: bool,
}

#[derive(Debug, Clone, Default)]
pub struct LinearForecaster;

impl LinearForecaster {
    pub fn new() -> Self {
        Self
    }
}

impl ForecastStrategy for LinearForecaster {
    type Record = LinearLog;

    fn name(&self) -> &'static str {
        "linear"
    }

    fn min_records(&self) -> usize {
        LINEAR_MIN_RECORDS
    }

    fn forecast(&self, history: &LogHistory<LinearLog>) -> Result<ForecastSignals> {
        self.ensure_sufficient(history)?;

        let features: Vec<Vec<f64>> = history.records().iter().map(LinearLog::features).collect();
        let targets = history.severities();

        let model = LinearRegression::fit(&features, &targets)?;
        let operating_point = column_means(&features);
        let prediction = model.predict(&operating_point);

        debug!(
            intercept = model.intercept,
            coefficients = ?model.coefficients,
            prediction,
            "Linear forecast computed"
        );

        Ok(ForecastSignals::Linear(LinearSignals {
            prediction,
            any_emergency: history.any_emergency(),
        }))
    }
}
