//! Shape algebra shared by the combinators: union, zip and sequence accumulation.

use serde_json::{Map, Value};
use tracing::warn;

use crate::errors::{Result, ScrapeError};

/// Union of two mappings; keys of `right` win on conflict.
///
/// `Null` (an extractor's absent default) behaves as the empty mapping.
pub fn union(left: &Value, right: &Value) -> Result<Value> {
    let mut out = as_mapping(left, "left")?.cloned().unwrap_or_default();
    if let Some(r) = as_mapping(right, "right")? {
        for (k, v) in r {
            out.insert(k.clone(), v.clone());
        }
    }
    Ok(Value::Object(out))
}

fn as_mapping<'v>(value: &'v Value, side: &str) -> Result<Option<&'v Map<String, Value>>> {
    match value {
        Value::Object(m) => Ok(Some(m)),
        Value::Null => Ok(None),
        other => Err(ScrapeError::ShapeMismatch(format!(
            "{side} operand of a merge must be a mapping, got {}",
            shape_name(other)
        ))),
    }
}

/// Merge two partial results.
///
/// Mapping with mapping is a union; a mapping against a sequence is unioned into
/// every element; two sequences are zipped positionally and truncated to the
/// shorter one.
pub fn zip(left: &Value, right: &Value) -> Result<Value> {
    match (left, right) {
        (Value::Array(l), Value::Array(r)) => {
            if l.len() != r.len() {
                warn!(
                    left = l.len(),
                    right = r.len(),
                    "zipping sequences of unequal length, dropping the tail"
                );
            }
            l.iter()
                .zip(r)
                .map(|(a, b)| union(a, b))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
        (Value::Array(l), m) => l
            .iter()
            .map(|e| union(e, m))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        (m, Value::Array(r)) => r
            .iter()
            .map(|e| union(m, e))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        (l, r) => union(l, r),
    }
}

/// Fold one iteration's result into an accumulating sequence: sequences are
/// concatenated, anything else is appended as a single element.
pub fn accumulate(acc: &mut Vec<Value>, value: Value) {
    match value {
        Value::Array(items) => acc.extend(items),
        other => acc.push(other),
    }
}

pub fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
