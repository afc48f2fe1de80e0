//! Decoder trait
//!
//! A decoder turns a parsed response body into the rows a stream emits.

use crate::error::Result;
use serde_json::Value;

/// Trait for pulling records out of a response body
pub trait RecordDecoder: Send + Sync {
    /// Extract records from an already parsed response body
    fn extract(&self, value: &Value) -> Result<Vec<Value>>;
}
