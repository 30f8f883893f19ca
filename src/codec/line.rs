//! Single-line encoding and decoding of [`LogLine`] records.

use super::CodecError;
use crate::model::LogLine;
use serde::ser::Error as _;
use serde_json::{Map, Number, Value};

/// Largest magnitude below which every integer is exactly representable as an `f64`.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Decodes one line of text as a single JSON object.
///
/// Every number in the result is an `f64`. Errors report the record as line 1; use
/// [`CollectionReader`](super::CollectionReader) to get positions within a file.
pub fn decode_line(raw: &str) -> Result<LogLine, CodecError> {
    decode_line_at(raw.as_bytes(), 1)
}

/// Decodes raw line bytes. Bytes that are not UTF-8 are a malformed record like any other
/// invalid JSON.
pub(crate) fn decode_line_at(raw: &[u8], line: usize) -> Result<LogLine, CodecError> {
    let mut map: Map<String, Value> = serde_json::from_slice(raw)
        .map_err(|source| CodecError::MalformedRecord { line, source })?;
    for value in map.values_mut() {
        numbers_to_float(value);
    }
    Ok(LogLine::from(map))
}

/// Encodes a record as one line of JSON, without the trailing newline.
///
/// Floats holding an integral value are written without a fractional part, so `1.0`
/// becomes `1`, the same shape existing collection files use. `-0.0` keeps its sign.
///
/// Fails with [`CodecError::EncodeFailure`] if a field was inserted with a value JSON cannot
/// hold, e.g. NaN.
pub fn encode_line(line: &LogLine) -> Result<String, CodecError> {
    if let Some((key, reason)) = line.unencodable_field() {
        return Err(CodecError::EncodeFailure(serde_json::Error::custom(format!(
            "field `{key}`: {reason}"
        ))));
    }
    let mut value = Value::Object(line.as_map().clone());
    integral_floats_to_int(&mut value);
    serde_json::to_string(&value).map_err(CodecError::EncodeFailure)
}

fn numbers_to_float(value: &mut Value) {
    match value {
        Value::Number(n) => {
            if let Some(float) = n.as_f64().and_then(Number::from_f64) {
                *n = float;
            }
        }
        Value::Array(items) => items.iter_mut().for_each(numbers_to_float),
        Value::Object(map) => map.values_mut().for_each(numbers_to_float),
        _ => {}
    }
}

fn integral_floats_to_int(value: &mut Value) {
    match value {
        Value::Number(n) if n.is_f64() => {
            if let Some(f) = n.as_f64() {
                let negative_zero = f == 0.0 && f.is_sign_negative();
                if f.fract() == 0.0 && f.abs() <= MAX_EXACT_INTEGER && !negative_zero {
                    *n = Number::from(f as i64);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(integral_floats_to_int),
        Value::Object(map) => map.values_mut().for_each(integral_floats_to_int),
        _ => {}
    }
}
