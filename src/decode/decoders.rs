//! JSON decoder with record path extraction

use super::types::RecordDecoder;
use crate::error::{Error, Result};
use serde_json::Value;

/// Pulls the record array found at a dot-notation path
///
/// A missing path, or anything other than an array at it, is an error
/// rather than an empty page.
#[derive(Debug, Clone)]
pub struct JsonDecoder {
    record_path: String,
}

impl JsonDecoder {
    /// Decoder for the array at `path` (an optional `$.` prefix is ignored)
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            record_path: path.into(),
        }
    }
}

impl RecordDecoder for JsonDecoder {
    fn extract(&self, value: &Value) -> Result<Vec<Value>> {
        let path = self.record_path.as_str();
        match extract_simple_path(value, path) {
            Some(Value::Array(arr)) => Ok(arr.clone()),
            Some(other) => Err(Error::record_extraction(
                path,
                format!("expected an array, found {}", json_type_name(other)),
            )),
            None => Err(Error::record_extraction(path, "path not present in response")),
        }
    }
}

fn extract_simple_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() || path == "$" {
        return Some(value);
    }

    path.split('.').try_fold(value, |current, part| current.get(part))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
