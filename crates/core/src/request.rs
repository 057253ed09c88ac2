//! Request ingestion.
//!
//! The raw request is parsed into [`SimulationRequest`] exactly once; every
//! shape problem surfaces here as a [`RequestError`] and nothing downstream
//! re-checks request shape. Malformed `variables` entries are dropped, not
//! errors — only an empty surviving set is fatal.

use chrono::{DateTime, Datelike, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

/// Fatal request-shape errors. Any of these aborts the run before a single
/// calculation is attempted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Input was valid JSON but not an object
    #[error("input must be a JSON object")]
    NotAnObject,
    /// `payload` missing or not an object
    #[error("`payload` field must be a JSON object")]
    InvalidPayload,
    /// `variables` missing, not an array, or empty after dropping
    /// non-string/blank entries
    #[error("`variables` field must be a non-empty array of strings")]
    NoVariables,
}

/// A validated simulation request.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRequest {
    /// Arbitrary nested engine input, handed to the simulation build and
    /// scanned for explicit period keys
    pub payload: Map<String, Value>,
    /// Requested variables: trimmed, deduplicated, first occurrence wins
    pub variables: Vec<String>,
    /// `YYYY-MM` default period for month-resolved variables
    pub current_month: String,
    /// `YYYY` default period for year-resolved variables
    pub current_year: String,
}

impl SimulationRequest {
    /// Parse a raw request value.
    ///
    /// `now` supplies the defaults for `currentMonth`/`currentYear` when the
    /// request omits them or sends empty strings; injecting it keeps parsing
    /// deterministic under test.
    pub fn from_value(raw: Value, now: DateTime<Utc>) -> Result<Self, RequestError> {
        let mut fields = match raw {
            Value::Object(map) => map,
            _ => return Err(RequestError::NotAnObject),
        };

        let payload = match fields.remove("payload") {
            Some(Value::Object(map)) => map,
            _ => return Err(RequestError::InvalidPayload),
        };

        let variables = normalize_variables(fields.get("variables"));
        if variables.is_empty() {
            return Err(RequestError::NoVariables);
        }

        let current_month = non_empty_string(fields.get("currentMonth"))
            .unwrap_or_else(|| format!("{}-{:02}", now.year(), now.month()));
        let current_year =
            non_empty_string(fields.get("currentYear")).unwrap_or_else(|| now.year().to_string());

        Ok(Self {
            payload,
            variables,
            current_month,
            current_year,
        })
    }
}

/// Keep string entries with non-blank content, trimmed, first occurrence
/// only. Everything else is silently dropped.
fn normalize_variables(raw: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(entries)) = raw else {
        return Vec::new();
    };

    let mut variables: Vec<String> = Vec::new();
    for entry in entries {
        let Some(name) = entry.as_str() else { continue };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        if !variables.iter().any(|v| v == name) {
            variables.push(name.to_string());
        }
    }
    variables
}

fn non_empty_string(raw: Option<&Value>) -> Option<String> {
    match raw {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
