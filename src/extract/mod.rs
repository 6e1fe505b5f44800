//! Value extraction from the response body.
//!
//! Two strategies, tried in order:
//!
//! 1. **JSON**: `serde_json` parses the body and the [`KeyPath`] is walked.
//! 2. **Fallback**: a bounded text scan for the leaf key, only for bodies
//!    `serde_json` rejects (truncated or otherwise not valid JSON).
//!
//! A document that parses but lacks a numeric value at the path never
//! reaches the scan. Any failure on a non-empty body is fatal: the endpoint
//! or key is wrong and re-polling will not fix it.

pub mod fallback;
pub mod key_path;

use log::{debug, warn};
use serde_json::Value;

use crate::error::ExtractError;
use key_path::KeyPath;

/// Which strategy produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractSource {
    Json,
    Fallback,
}

/// The value the gauge displays.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedValue {
    /// Value text as found in the payload.
    pub raw: String,
    pub numeric: f64,
    /// `false` whenever the last extraction failed or never ran.
    pub present: bool,
    pub source: Option<ExtractSource>,
}

impl ExtractedValue {
    pub fn absent() -> Self {
        Self {
            raw: String::new(),
            numeric: 0.0,
            present: false,
            source: None,
        }
    }
}

impl Default for ExtractedValue {
    fn default() -> Self {
        Self::absent()
    }
}

/// Extract the value at `path` from `body`.
pub fn extract(body: &[u8], path: &KeyPath) -> Result<ExtractedValue, ExtractError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ExtractError::EmptyBody);
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(doc) => from_json(&doc, path),
        Err(e) => {
            warn!("extract: body is not valid JSON ({}), falling back to text scan", e);
            from_text(body, path)
        }
    }
}

/// Primary strategy: walk the parsed document and render the scalar as text.
fn from_json(doc: &Value, path: &KeyPath) -> Result<ExtractedValue, ExtractError> {
    let raw = match path.lookup(doc) {
        None => {
            debug!("extract: path '{}' not present in document", path);
            return Err(ExtractError::KeyNotFound);
        }
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => {
            debug!("extract: value at '{}' is not a scalar: {}", path, other);
            return Err(ExtractError::NotNumeric);
        }
    };
    match raw.parse::<f64>() {
        Ok(numeric) if numeric.is_finite() => Ok(ExtractedValue {
            raw,
            numeric,
            present: true,
            source: Some(ExtractSource::Json),
        }),
        _ => {
            debug!("extract: JSON value {:?} at '{}' is not numeric", raw, path);
            Err(ExtractError::NotNumeric)
        }
    }
}

/// Fallback strategy for bodies `serde_json` rejected.
fn from_text(body: &[u8], path: &KeyPath) -> Result<ExtractedValue, ExtractError> {
    let text = String::from_utf8_lossy(body);
    let scanned = fallback::scan(&text, path.leaf_key())?;
    let numeric = fallback::parse_number(&scanned)?;
    Ok(ExtractedValue {
        raw: scanned.as_str().to_owned(),
        numeric,
        present: true,
        source: Some(ExtractSource::Fallback),
    })
}
