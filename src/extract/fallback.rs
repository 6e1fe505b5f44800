//! Last-resort text scan for payloads `serde_json` refuses.
//!
//! This is not a JSON parser. It recognises exactly one shape:
//!
//! ```text
//! ..."<key>":<value>,...
//!     ^key  ^ key + len + 2
//! ```
//!
//! and reads at most [`MAX_VALUE_CHARS`] characters of `<value>`.

use log::debug;

use crate::error::ExtractError;

/// Hard cap on the scanned value. Running past it without a comma is a failure.
pub const MAX_VALUE_CHARS: usize = 20;

/// Characters stripped from both ends of the scanned text.
fn is_wrapper(c: char) -> bool {
    c == '"' || c == '}' || c == ']' || c.is_whitespace()
}

/// Scan `body` for `key` and return the raw text of its value.
pub fn scan(body: &str, key: &str) -> Result<heapless::String<MAX_VALUE_CHARS>, ExtractError> {
    if key.is_empty() {
        return Err(ExtractError::KeyNotFound);
    }
    let index = body.find(key).ok_or(ExtractError::KeyNotFound)?;
    let start = index + key.len() + 2;
    let tail = body.get(start..).unwrap_or_default();

    let mut acc: heapless::String<MAX_VALUE_CHARS> = heapless::String::new();
    for c in tail.chars() {
        if c == ',' {
            break;
        }
        acc.push(c).map_err(|_| ExtractError::ValueTooLong)?;
    }
    debug!("fallback: key '{}' at {}, scanned {:?}", key, index, acc.as_str());

    let trimmed = acc.trim_matches(is_wrapper);
    let mut out = heapless::String::new();
    // `trimmed` is a sub-slice of `acc`, so it always fits.
    let _ = out.push_str(trimmed);
    Ok(out)
}

/// Parse scanned text as a number.
///
/// A result of exactly zero is only believed when the text is literally `0`;
/// anything else that lands on zero is treated as garbage.
#[allow(clippy::float_cmp)]
pub fn parse_number(text: &str) -> Result<f64, ExtractError> {
    let n: f64 = text.parse().map_err(|_| ExtractError::NotNumeric)?;
    if !n.is_finite() {
        return Err(ExtractError::NotNumeric);
    }
    if n == 0.0 && text != "0" {
        return Err(ExtractError::NotNumeric);
    }
    Ok(n)
}
