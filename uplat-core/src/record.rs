use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::MalformedRecord;

/// `time_local` layout written by nginx, e.g. `01/Nov/2025:03:35:52 +0800`.
pub const TIME_LOCAL_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// One JSON access-log line. Only the fields uplat charts are decoded;
/// everything else in the object is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct LogRecord {
    #[serde(default)]
    pub time_local: Option<String>,
    #[serde(default)]
    pub upstream_response_time: Option<ResponseTimeField>,
}

/// `upstream_response_time` as logged: usually a string, sometimes a bare number.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ResponseTimeField {
    Text(String),
    Number(f64),
}

/// A paired data point: when the request was logged and how long the
/// upstream took, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: DateTime<FixedOffset>,
    pub response_time: f64,
}

impl LogRecord {
    /// Decode a single log line. Only a JSON object is a record; arrays and
    /// scalars are rejected before field decoding.
    pub fn from_line(line: &str) -> Result<Self, MalformedRecord> {
        match serde_json::from_str::<serde_json::Value>(line)? {
            value @ serde_json::Value::Object(_) => Ok(serde_json::from_value(value)?),
            _ => Err(MalformedRecord::NotAnObject),
        }
    }

    /// `time_local` if present and non-empty.
    pub fn time_local(&self) -> Option<&str> {
        self.time_local.as_deref().filter(|s| !s.is_empty())
    }
}

impl ResponseTimeField {
    /// Seconds spent upstream. For retried requests the value is a
    /// comma-separated list and the last attempt wins.
    pub fn seconds(&self) -> Result<f64, MalformedRecord> {
        match self {
            ResponseTimeField::Number(n) => Ok(*n),
            ResponseTimeField::Text(s) => parse_response_time(s),
        }
    }
}

/// Parse a `time_local` value.
pub fn parse_time_local(value: &str) -> Result<DateTime<FixedOffset>, MalformedRecord> {
    DateTime::parse_from_str(value, TIME_LOCAL_FORMAT).map_err(|source| {
        MalformedRecord::Timestamp {
            value: value.to_string(),
            source,
        }
    })
}

/// Parse an `upstream_response_time` string: `"0.120"` or `"0.000, 0.000, 5.374"`.
pub fn parse_response_time(value: &str) -> Result<f64, MalformedRecord> {
    let last = match value.rsplit_once(',') {
        Some((_, tail)) => tail,
        None => value,
    };
    last.trim()
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite())
        .ok_or_else(|| MalformedRecord::ResponseTime {
            value: value.to_string(),
        })
}
