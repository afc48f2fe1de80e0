//! Stream schemas
//!
//! JSON Schema document types plus the static schema of activity events.

mod activity_events;
mod types;

pub use activity_events::{activity_event_schema, ACTIVITY_EVENT_SCHEMA};
pub use types::{FieldType, JsonSchema, JsonType, SchemaProperty};
