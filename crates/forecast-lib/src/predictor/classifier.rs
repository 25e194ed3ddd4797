//! Risk classification and recommendations
//!
//! Maps strategy signals to a risk tier and caregiver-facing text. Each
//! strategy has its own threshold table.

use super::{EnsembleSignals, ForecastSignals, LinearSignals, TrendSignals};
use crate::models::RiskLevel;

/// Severity above which a forecast is high risk
pub const HIGH_SEVERITY: f64 = 7.0;

/// Severity above which a model forecast is moderate risk
pub const MODERATE_SEVERITY: f64 = 4.0;

/// Average day-over-day rise above which the trend is moderate risk
pub const MODERATE_TREND: f64 = 0.5;

/// Forecast jump over the latest severity considered high risk
pub const HIGH_JUMP: f64 = 1.5;

/// Forecast jump over the latest severity considered moderate risk
pub const MODERATE_JUMP: f64 = 0.5;

/// Average daily naps above which the sundowning note is appended
pub const NAPPING_NOTE_THRESHOLD: f64 = 2.0;

const TREND_LOW: &str = "Status is stable. Keep up the routine.";
const TREND_MODERATE: &str =
    "Symptoms show a slight upward trend. Check for changes in medication or environment.";
const TREND_HIGH: &str =
    "High severity detected. Ensure caregiver support is available and review recent notes.";
const NAPPING_NOTE: &str =
    " Excessive daytime napping detected, which can correlate with sundowning.";

const ENSEMBLE_LOW: &str = "Tomorrow's severity is expected to stay level. Keep up the routine.";
const ENSEMBLE_MODERATE: &str = "Severity is expected to rise slightly. Watch for agitation and keep medication on schedule.";
const ENSEMBLE_HIGH: &str = "A sharp rise in severity is expected. Arrange extra caregiver support and review recent notes.";

const LINEAR_LOW: &str = "Daily activity is consistent with stable symptoms. Keep up the routine.";
const LINEAR_MODERATE: &str = "Daily activity is consistent with moderate symptoms. Review naps, exercise and meals for changes.";
const LINEAR_HIGH: &str = "Daily activity is consistent with high severity. Ensure caregiver support is available.";

/// Threshold configuration for the risk classifier
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    pub high_severity: f64,
    pub moderate_severity: f64,
    pub moderate_trend: f64,
    pub high_jump: f64,
    pub moderate_jump: f64,
    pub napping_note_threshold: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            high_severity: HIGH_SEVERITY,
            moderate_severity: MODERATE_SEVERITY,
            moderate_trend: MODERATE_TREND,
            high_jump: HIGH_JUMP,
            moderate_jump: MODERATE_JUMP,
            napping_note_threshold: NAPPING_NOTE_THRESHOLD,
        }
    }
}

/// Risk tier plus recommendation text
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub risk_level: RiskLevel,
    pub recommendation: String,
}

impl Assessment {
    fn new(risk_level: RiskLevel, recommendation: impl Into<String>) -> Self {
        Self {
            risk_level,
            recommendation: recommendation.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RiskClassifier {
    config: ClassifierConfig,
}

impl RiskClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn classify(&self, signals: &ForecastSignals) -> Assessment {
        match signals {
            ForecastSignals::Trend(s) => self.classify_trend(s),
            ForecastSignals::Ensemble(s) => self.classify_ensemble(s),
            ForecastSignals::Linear(s) => self.classify_linear(s),
        }
    }

    fn classify_trend(&self, s: &TrendSignals) -> Assessment {
        let c = &self.config;
        let mut assessment = if s.latest > c.high_severity || s.any_emergency {
            Assessment::new(RiskLevel::High, TREND_HIGH)
        } else if s.trend > c.moderate_trend {
            Assessment::new(RiskLevel::Moderate, TREND_MODERATE)
        } else {
            Assessment::new(RiskLevel::Low, TREND_LOW)
        };

        if s.avg_naps > c.napping_note_threshold {
            assessment.recommendation.push_str(NAPPING_NOTE);
        }
        assessment
    }

    fn classify_ensemble(&self, s: &EnsembleSignals) -> Assessment {
        let c = &self.config;
        if s.prediction > c.high_severity || s.diff > c.high_jump {
            Assessment::new(RiskLevel::High, ENSEMBLE_HIGH)
        } else if s.prediction > c.moderate_severity || s.diff > c.moderate_jump {
            Assessment::new(RiskLevel::Moderate, ENSEMBLE_MODERATE)
        } else {
            Assessment::new(RiskLevel::Low, ENSEMBLE_LOW)
        }
    }

    fn classify_linear(&self, s: &LinearSignals) -> Assessment {
        let c = &self.config;
        if s.prediction > c.high_severity || s.any_emergency {
            Assessment::new(RiskLevel::High, LINEAR_HIGH)
        } else if s.prediction > c.moderate_severity {
            Assessment::new(RiskLevel::Moderate, LINEAR_MODERATE)
        } else {
            Assessment::new(RiskLevel::Low, LINEAR_LOW)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trend(latest: f64, trend: f64, avg_naps: f64, any_emergency: bool) -> ForecastSignals {
        ForecastSignals::Trend(TrendSignals {
            latest,
            trend,
            avg_naps,
            any_emergency,
        })
    }

    fn ensemble(prediction: f64, latest_severity: f64) -> ForecastSignals {
        ForecastSignals::Ensemble(EnsembleSignals {
            prediction,
            latest_severity,
            diff: prediction - latest_severity,
        })
    }

    fn linear(prediction: f64, any_emergency: bool) -> ForecastSignals {
        ForecastSignals::Linear(LinearSignals {
            prediction,
            any_emergency,
        })
    }

    #[test]
    fn test_trend_tiers() {
        let classifier = RiskClassifier::new();
        assert_eq!(classifier.classify(&trend(3.0, 0.0, 1.0, false)).risk_level, RiskLevel::Low);
        assert_eq!(classifier.classify(&trend(3.0, 0.5, 1.0, false)).risk_level, RiskLevel::Low);
        assert_eq!(classifier.classify(&trend(3.0, 0.6, 1.0, false)).risk_level, RiskLevel::Moderate);
        assert_eq!(classifier.classify(&trend(7.5, -1.0, 1.0, false)).risk_level, RiskLevel::High);
        assert_eq!(classifier.classify(&trend(7.0, 0.0, 1.0, false)).risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_trend_emergency_overrides_everything() {
        let a = RiskClassifier::new().classify(&trend(1.0, -2.0, 0.0, true));
        assert_eq!(a.risk_level, RiskLevel::High);
        assert_eq!(a.recommendation, TREND_HIGH);
    }

    #[test]
    fn test_napping_note_appended_for_any_tier() {
        let classifier = RiskClassifier::new();
        let low = classifier.classify(&trend(3.0, 0.0, 2.5, false));
        assert_eq!(
            low.recommendation,
            "Status is stable. Keep up the routine. Excessive daytime napping detected, which can correlate with sundowning."
        );
        let high = classifier.classify(&trend(9.0, 0.0, 3.0, false));
        assert!(high.recommendation.starts_with(TREND_HIGH));
        assert!(high.recommendation.ends_with("sundowning."));

        let at_threshold = classifier.classify(&trend(3.0, 0.0, 2.0, false));
        assert_eq!(at_threshold.recommendation, TREND_LOW);
    }

    #[test]
    fn test_ensemble_tiers() {
        let classifier = RiskClassifier::new();
        assert_eq!(classifier.classify(&ensemble(3.0, 3.0)).risk_level, RiskLevel::Low);
        assert_eq!(classifier.classify(&ensemble(4.5, 4.5)).risk_level, RiskLevel::Moderate);
        assert_eq!(classifier.classify(&ensemble(3.0, 2.0)).risk_level, RiskLevel::Moderate);
        assert_eq!(classifier.classify(&ensemble(7.1, 7.5)).risk_level, RiskLevel::High);
        assert_eq!(classifier.classify(&ensemble(4.0, 2.0)).risk_level, RiskLevel::High);
    }

    #[test]
    fn test_ensemble_falling_forecast_is_low() {
        let a = RiskClassifier::new().classify(&ensemble(2.0, 6.0));
        assert_eq!(a.risk_level, RiskLevel::Low);
        assert_eq!(a.recommendation, ENSEMBLE_LOW);
    }

    #[test]
    fn test_linear_tiers() {
        let classifier = RiskClassifier::new();
        assert_eq!(classifier.classify(&linear(4.0, false)).risk_level, RiskLevel::Low);
        assert_eq!(classifier.classify(&linear(4.1, false)).risk_level, RiskLevel::Moderate);
        assert_eq!(classifier.classify(&linear(7.1, false)).risk_level, RiskLevel::High);
        assert_eq!(classifier.classify(&linear(1.0, true)).risk_level, RiskLevel::High);
    }

    #[test]
    fn test_custom_thresholds() {
        let classifier = RiskClassifier::with_config(ClassifierConfig {
            high_severity: 5.0,
            ..ClassifierConfig::default()
        });
        assert_eq!(classifier.classify(&linear(6.0, false)).risk_level, RiskLevel::High);
    }
}
