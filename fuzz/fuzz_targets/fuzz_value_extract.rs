//! Fuzz target: `extract::extract`
//!
//! Throws arbitrary payloads at both extraction strategies. Whatever comes
//! back must be finite, and a fallback read must respect the 20-char cap.
//!
//! cargo fuzz run fuzz_value_extract

#![no_main]

use gaugearm::extract::fallback::MAX_VALUE_CHARS;
use gaugearm::extract::key_path::KeyPath;
use gaugearm::extract::{self, ExtractSource};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // First byte picks the path so nested walks get exercised too.
    let path = match data.first().map(|b| b % 3) {
        Some(0) => "dataSetCount",
        Some(1) => "data.0.Temperature",
        _ => "a[2].b",
    };
    let Some(path) = KeyPath::parse(path) else {
        return;
    };

    if let Ok(value) = extract::extract(data, &path) {
        assert!(value.present);
        assert!(value.numeric.is_finite());
        if value.source == Some(ExtractSource::Fallback) {
            assert!(value.raw.chars().count() <= MAX_VALUE_CHARS);
        }
    }
});
