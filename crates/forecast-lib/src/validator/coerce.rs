//! Field coercion for raw log records
//!
//! Values arrive loosely typed. Numbers may be sent as JSON numbers or as
//! numeric strings, flags as booleans, 0/1 or words. Anything that cannot be
//! coerced is reported as `MalformedInput` naming the record and field.

use crate::error::{ForecastError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

/// Accepted names for the observation date, in lookup order
pub const DATE_FIELDS: &[&str] = &["checkin_date", "date"];

/// Largest magnitude accepted for a rating or duration
pub const MAX_MAGNITUDE: f64 = 1_000_000.0;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Typed accessor over one raw record
pub struct FieldReader<'a> {
    index: usize,
    fields: &'a Map<String, Value>,
}

impl<'a> FieldReader<'a> {
    pub fn new(index: usize, raw: &'a Value) -> Result<Self> {
        let fields = raw.as_object().ok_or_else(|| {
            ForecastError::MalformedInput(format!("record {index}: expected an object"))
        })?;
        Ok(Self { index, fields })
    }

    fn get(&self, field: &str) -> Option<&'a Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    fn require(&self, field: &str) -> Result<&'a Value> {
        self.get(field)
            .ok_or_else(|| ForecastError::malformed_field(self.index, field, "is missing"))
    }

    fn invalid(&self, field: &str, expected: &str, value: &Value) -> ForecastError {
        ForecastError::malformed_field(self.index, field, format!("expected {expected}, got {value}"))
    }

    pub fn date(&self) -> Result<NaiveDate> {
        let (field, value) = DATE_FIELDS
            .iter()
            .find_map(|name| self.get(name).map(|v| (*name, v)))
            .ok_or_else(|| ForecastError::malformed_field(self.index, DATE_FIELDS[0], "is missing"))?;

        value
            .as_str()
            .and_then(parse_date)
            .ok_or_else(|| self.invalid(field, "a calendar date", value))
    }

    /// A rating within `MAX_MAGNITUDE` of zero
    pub fn number(&self, field: &str) -> Result<f64> {
        let value = self.require(field)?;
        parse_number(value)
            .filter(|n| n.abs() <= MAX_MAGNITUDE)
            .ok_or_else(|| self.invalid(field, "a number between -1000000 and 1000000", value))
    }

    pub fn non_negative(&self, field: &str) -> Result<f64> {
        let value = self.require(field)?;
        parse_number(value)
            .filter(|n| (0.0..=MAX_MAGNITUDE).contains(n))
            .ok_or_else(|| self.invalid(field, "a number between 0 and 1000000", value))
    }

    pub fn count(&self, field: &str) -> Result<u32> {
        let value = self.require(field)?;
        parse_number(value)
            .filter(|n| *n >= 0.0 && n.fract() == 0.0 && *n <= u32::MAX as f64)
            .map(|n| n as u32)
            .ok_or_else(|| self.invalid(field, "a non-negative whole number", value))
    }

    pub fn flag(&self, field: &str) -> Result<bool> {
        let value = self.require(field)?;
        parse_flag(value).ok_or_else(|| self.invalid(field, "a boolean", value))
    }

    /// Like `flag`, but an absent field reads as `false`
    pub fn optional_flag(&self, field: &str) -> Result<bool> {
        match self.get(field) {
            Some(value) => parse_flag(value).ok_or_else(|| self.invalid(field, "a boolean", value)),
            None => Ok(false),
        }
    }
}

fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn parse_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64()? {
            x if x == 0.0 => Some(false),
            x if x == 1.0 => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.date())
}
