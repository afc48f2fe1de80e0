//! State types for tracking sync progress
//!
//! These types are serialized to JSON and persisted between runs.

use crate::pagination::{day_floor, SyncCursor};
use crate::types::parse_utc_timestamp;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Complete state for the tap
///
/// Singer-style `bookmarks` is accepted as an alias for `streams` on input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Per-stream state
    #[serde(default, alias = "bookmarks")]
    pub streams: HashMap<String, StreamState>,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get state for a stream
    pub fn get_stream(&self, stream: &str) -> Option<&StreamState> {
        self.streams.get(stream)
    }

    /// Get mutable state for a stream, creating if needed
    pub fn get_stream_mut(&mut self, stream: &str) -> &mut StreamState {
        self.streams.entry(stream.to_string()).or_default()
    }

    /// Get the pager cursor for a stream
    pub fn get_cursor(&self, stream: &str) -> Option<&SyncCursor> {
        self.streams.get(stream)?.cursor.as_ref()
    }

    /// Set the pager cursor for a stream
    pub fn set_cursor(&mut self, stream: &str, cursor: SyncCursor) {
        self.get_stream_mut(stream).cursor = Some(cursor);
    }

    /// Where a stream should resume, if state says anything about it
    pub fn resume_cursor(&self, stream: &str) -> Option<SyncCursor> {
        self.get_stream(stream)?.resume_cursor()
    }
}

/// State for a single stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamState {
    /// Field the watermark tracks (e.g. `CreationTime`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,

    /// Highest replication key value seen so far
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key_value: Option<String>,

    /// Exact pager position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<SyncCursor>,
}

impl StreamState {
    /// Create a new empty stream state
    pub fn new() -> Self {
        Self::default()
    }

    /// Parsed watermark, if present and readable
    pub fn watermark(&self) -> Option<DateTime<Utc>> {
        self.replication_key_value
            .as_deref()
            .and_then(parse_utc_timestamp)
    }

    /// Raise the watermark to `candidate` if it is newer
    ///
    /// Returns true when the stored value changed.
    pub fn advance_watermark(&mut self, key: &str, candidate: DateTime<Utc>) -> bool {
        if self.watermark().is_some_and(|current| current >= candidate) {
            return false;
        }
        self.replication_key = Some(key.to_string());
        self.replication_key_value = Some(candidate.to_rfc3339_opts(SecondsFormat::AutoSi, true));
        true
    }

    /// Persisted cursor, else the watermark's day with no token
    pub fn resume_cursor(&self) -> Option<SyncCursor> {
        self.cursor
            .clone()
            .or_else(|| self.watermark().map(|ts| SyncCursor::fresh(day_floor(ts))))
    }
}
