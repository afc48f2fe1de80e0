//! Stream definitions and catalog
//!
//! The tap exposes a single stream, `ActivityEvents`. Its definition carries
//! everything the sync engine needs: where to fetch, how to page, which field
//! is the watermark, and the static schema.

use crate::error::{Error, Result};
use crate::pagination::DayWindowPaginator;
use crate::schema::{activity_event_schema, JsonSchema};
use crate::types::ReplicationMethod;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the activity events stream
pub const ACTIVITY_EVENTS: &str = "ActivityEvents";

/// Static description of a stream
#[derive(Debug, Clone, PartialEq)]
pub struct StreamDefinition {
    /// Unique stream name
    pub name: String,
    /// API endpoint path, relative to the API base URL
    pub path: String,
    /// Primary key fields
    pub primary_keys: Vec<String>,
    /// Watermark field
    pub replication_key: String,
    /// Replication method advertised in the catalog
    pub replication_method: ReplicationMethod,
    /// Field of the response holding the rows
    pub record_path: String,
    /// Field of the response holding the continuation token
    pub token_field: String,
    schema: &'static JsonSchema,
}

impl StreamDefinition {
    /// The `ActivityEvents` stream
    pub fn activity_events() -> Self {
        Self {
            name: ACTIVITY_EVENTS.to_string(),
            path: "/admin/activityevents".to_string(),
            primary_keys: vec!["Id".to_string()],
            replication_key: "CreationTime".to_string(),
            replication_method: ReplicationMethod::Incremental,
            record_path: "activityEventEntities".to_string(),
            token_field: "continuationToken".to_string(),
            schema: activity_event_schema(),
        }
    }

    /// JSON schema of the stream's records
    pub fn schema(&self) -> &'static JsonSchema {
        self.schema
    }

    /// Pager for this stream
    pub fn paginator(&self) -> DayWindowPaginator {
        DayWindowPaginator::new(&self.path, &self.record_path).with_token_field(&self.token_field)
    }

    /// Catalog entry describing this stream
    pub fn catalog_entry(&self) -> CatalogStream {
        CatalogStream {
            tap_stream_id: self.name.clone(),
            stream: self.name.clone(),
            schema: self.schema.to_json(),
            key_properties: self.primary_keys.clone(),
            replication_key: Some(self.replication_key.clone()),
            replication_method: self.replication_method,
        }
    }
}

/// All streams this tap knows about
pub fn all_streams() -> Vec<StreamDefinition> {
    vec![StreamDefinition::activity_events()]
}

/// Look up a stream by name
pub fn find_stream(name: &str) -> Result<StreamDefinition> {
    all_streams()
        .into_iter()
        .find(|s| s.name == name)
        .ok_or_else(|| Error::StreamNotFound {
            stream: name.to_string(),
        })
}

/// Resolve a selection; an empty selection means every stream
pub fn select_streams(names: &[String]) -> Result<Vec<StreamDefinition>> {
    if names.is_empty() {
        return Ok(all_streams());
    }
    names.iter().map(|name| find_stream(name)).collect()
}

// ============================================================================
// Catalog Types
// ============================================================================

/// Discovered catalog (available streams)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Available streams
    pub streams: Vec<CatalogStream>,
}

impl Catalog {
    /// Catalog of every stream
    pub fn discover() -> Self {
        Self {
            streams: all_streams().iter().map(StreamDefinition::catalog_entry).collect(),
        }
    }

    /// Get a stream entry by name
    pub fn get(&self, name: &str) -> Option<&CatalogStream> {
        self.streams.iter().find(|s| s.tap_stream_id == name)
    }
}

/// Stream in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogStream {
    /// Stable stream identifier
    pub tap_stream_id: String,
    /// Stream name
    pub stream: String,
    /// JSON schema for the stream
    pub schema: Value,
    /// Primary key fields
    #[serde(default)]
    pub key_properties: Vec<String>,
    /// Watermark field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,
    /// Replication method
    #[serde(default)]
    pub replication_method: ReplicationMethod,
}
