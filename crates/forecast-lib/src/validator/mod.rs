//! Log validation
//!
//! Turns a raw sequence of daily observations into a typed `LogHistory`
//! sorted ascending by date. Each forecasting strategy declares its own
//! record type, so only the fields that strategy reads are required.

mod coerce;


pub use coerce::{FieldReader, DATE_FIELDS};

use crate::error::{ForecastError, Result};
use crate::models::{EnsembleLog, LinearLog, RawLog, TrendLog};
use chrono::NaiveDate;
use tracing::debug;

/// A typed daily record that can be built from a raw log
pub trait LogRecord: Sized {
    /// Parse one raw record, failing on missing or non-coercible fields
    fn from_raw(fields: &FieldReader<'_>) -> Result<Self>;

    fn date(&self) -> NaiveDate;

    fn severity(&self) -> f64;

    fn is_emergency(&self) -> bool;
}

impl LogRecord for TrendLog {
    fn from_raw(fields: &FieldReader<'_>) -> Result<Self> {
        Ok(Self {
            date: fields.date()?,
            severity_rating: fields.number("severity_rating")?,
            nap_count: fields.count("nap_count")?,
            is_emergency: fields.flag("is_emergency")?,
        })
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn severity(&self) -> f64 {
        self.severity_rating
    }

    fn is_emergency(&self) -> bool {
        self.is_emergency
    }
}

impl LogRecord for EnsembleLog {
    fn from_raw(fields: &FieldReader<'_>) -> Result<Self> {
        Ok(Self {
            date: fields.date()?,
            severity_rating: fields.number("severity_rating")?,
            agitation_level: fields.number("agitation_level")?,
            mood_rating: fields.number("mood_rating")?,
            meds_taken: fields.flag("meds_taken")?,
            nap_count: fields.count("nap_count")?,
            is_emergency: fields.optional_flag("is_emergency")?,
        })
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn severity(&self) -> f64 {
        self.severity_rating
    }

    fn is_emergency(&self) -> bool {
        self.is_emergency
    }
}

impl LogRecord for LinearLog {
    fn from_raw(fields: &FieldReader<'_>) -> Result<Self> {
        Ok(Self {
            date: fields.date()?,
            severity_rating: fields.number("severity_rating")?,
            nap_count: fields.count("nap_count")?,
            exercise_mins: fields.non_negative("exercise_mins")?,
            meal_count: fields.count("meal_count")?,
            is_emergency: fields.flag("is_emergency")?,
        })
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn severity(&self) -> f64 {
        self.severity_rating
    }

    fn is_emergency(&self) -> bool {
        self.is_emergency
    }
}

/// Chronologically ordered, validated records for one call
#[derive(Debug, Clone, PartialEq)]
pub struct LogHistory<R> {
    records: Vec<R>,
}

impl<R: LogRecord> LogHistory<R> {
    /// Build a history from already typed records, sorting them by date.
    /// Records that share a date keep their relative order.
    pub fn from_records(mut records: Vec<R>) -> Result<Self> {
        if records.is_empty() {
            return Err(ForecastError::MalformedInput(
                "log history contains no records".to_string(),
            ));
        }
        records.sort_by_key(|r| r.date());
        Ok(Self { records })
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent record
    pub fn latest(&self) -> &R {
        // from_records rejects empty input
        &self.records[self.records.len() - 1]
    }

    pub fn severities(&self) -> Vec<f64> {
        self.records.iter().map(LogRecord::severity).collect()
    }

    /// True when any day was flagged as an emergency
    pub fn any_emergency(&self) -> bool {
        self.records.iter().any(LogRecord::is_emergency)
    }
}

/// Validate raw logs into a typed history sorted by date
pub fn validate<R: LogRecord>(raw: &[RawLog]) -> Result<LogHistory<R>> {
    let records = raw
        .iter()
        .enumerate()
        .map(|(index, value)| FieldReader::new(index, value).and_then(|f| R::from_raw(&f)))
        .collect::<Result<Vec<R>>>()?;

    let history = LogHistory::from_records(records)?;
    debug!(records = history.len(), "Validated log history");
    Ok(history)
}
