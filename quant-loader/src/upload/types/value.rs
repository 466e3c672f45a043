//! Cell value representation for uploads

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Timestamp format used for display and text parsing
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single cell in a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// Missing value, written as NULL
    Null,
    /// Text value
    Text(String),
    /// Whole number
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Date and time (warehouse DATETIME carries no offset)
    Timestamp(NaiveDateTime),
    /// Boolean (stored as BIT)
    Bool(bool),
}

impl Value {
    /// Check if this value is missing.
    ///
    /// NaN floats count as missing, they come out of spreadsheet formulas
    /// and have no warehouse representation.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Collapse every missing representation into `Value::Null`
    pub fn normalized(self) -> Self {
        if self.is_null() { Value::Null } else { self }
    }

    /// Parse a raw text cell (CSV field, ISO date cell) into the narrowest value
    pub fn parse_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }

        match trimmed.to_lowercase().as_str() {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            _ => {}
        }

        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return Value::Float(f);
            }
        }
        if let Some(ts) = parse_timestamp(trimmed) {
            return Value::Timestamp(ts);
        }

        Value::Text(raw.to_string())
    }

    /// Convert to JSON value for output
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Int(i) => serde_json::json!(*i),
            Value::Float(f) if f.is_nan() => serde_json::Value::Null,
            Value::Float(f) => serde_json::json!(*f),
            Value::Timestamp(ts) => {
                serde_json::Value::String(ts.format(TIMESTAMP_FORMAT).to_string())
            }
            Value::Bool(b) => serde_json::Value::Bool(*b),
        }
    }
}

/// Parse the timestamp layouts seen in spreadsheets and CSV exports
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    const LAYOUTS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    for layout in LAYOUTS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, layout) {
            return Some(ts);
        }
    }

    // Bare dates become midnight
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "(null)"),
            Value::Text(s) => write!(f, "{}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Timestamp(ts) => write!(f, "{}", ts.format(TIMESTAMP_FORMAT)),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(ts: NaiveDateTime) -> Self {
        Value::Timestamp(ts)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
