//! Human-readable rendering of decoded values.

use crate::error::PresentError;
use crate::options::DecodeOptions;
use crate::parse;
use crate::value::Value;

/// Converts a decoded value into a JSON tree.
///
/// Byte strings that are valid UTF-8 become JSON strings; others become an
/// array of byte values. Non-UTF-8 dictionary keys become `0x`-prefixed hex,
/// and a key that would then clash with another is an error.
pub fn to_json(value: &Value) -> Result<serde_json::Value, serde_json::Error> {
    serde_json::to_value(value)
}

/// Decodes a single bencoded value given as command-line text and renders it
/// as JSON.
pub fn decode_bencoded_value(
    encoded: &str,
    options: &DecodeOptions,
) -> Result<serde_json::Value, PresentError> {
    let value = parse::decode_with(encoded.as_bytes(), options)?;
    Ok(to_json(&value)?)
}
