//! Schema types
//!
//! Just enough JSON Schema (draft-07) to describe activity events for
//! `discover` and the `SCHEMA` message.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

/// JSON Schema primitive type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
}

impl JsonType {
    /// Keyword used in the schema document
    pub fn as_str(self) -> &'static str {
        match self {
            JsonType::String => "string",
            JsonType::Number => "number",
            JsonType::Integer => "integer",
            JsonType::Boolean => "boolean",
            JsonType::Object => "object",
            JsonType::Array => "array",
            JsonType::Null => "null",
        }
    }
}

impl std::fmt::Display for JsonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `type` keyword of a property: one type, optionally paired with `null`
///
/// Serializes as `"string"` or `["string", "null"]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldType {
    /// The non-null type
    pub primary: JsonType,
    /// Whether `null` is also accepted
    pub nullable: bool,
}

impl FieldType {
    /// Non-null type
    pub fn required(primary: JsonType) -> Self {
        Self {
            primary,
            nullable: false,
        }
    }

    /// Type that also accepts `null`
    pub fn nullable(primary: JsonType) -> Self {
        Self {
            primary,
            nullable: primary != JsonType::Null,
        }
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.nullable {
            [self.primary, JsonType::Null].serialize(serializer)
        } else {
            self.primary.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            One(JsonType),
            Many(Vec<JsonType>),
        }

        match Raw::deserialize(deserializer)? {
            Raw::One(primary) => Ok(Self::required(primary)),
            Raw::Many(types) => {
                let nullable = types.contains(&JsonType::Null);
                let primary = types
                    .into_iter()
                    .find(|t| *t != JsonType::Null)
                    .unwrap_or(JsonType::Null);
                Ok(Self { primary, nullable })
            }
        }
    }
}

/// One property of a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaProperty {
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Format hint (e.g., "date-time")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Nested properties (objects)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, SchemaProperty>>,

    /// Unknown nested keys tolerated (objects)
    #[serde(
        rename = "additionalProperties",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<bool>,

    /// Element schema (arrays)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaProperty>>,
}

impl SchemaProperty {
    fn of(field_type: FieldType) -> Self {
        Self {
            field_type,
            format: None,
            properties: None,
            additional_properties: None,
            items: None,
        }
    }

    /// Non-null property
    pub fn new(json_type: JsonType) -> Self {
        Self::of(FieldType::required(json_type))
    }

    /// Property that may be `null`
    pub fn nullable(json_type: JsonType) -> Self {
        Self::of(FieldType::nullable(json_type))
    }

    /// Object with nested properties; extra keys allowed
    pub fn object(properties: BTreeMap<String, SchemaProperty>) -> Self {
        Self {
            properties: Some(properties),
            additional_properties: Some(true),
            ..Self::new(JsonType::Object)
        }
    }

    /// Array of `items`
    pub fn array(items: SchemaProperty) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::new(JsonType::Array)
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    /// Same shape, but `null` is accepted too
    #[must_use]
    pub fn into_nullable(mut self) -> Self {
        self.field_type = FieldType::nullable(self.field_type.primary);
        self
    }

    pub fn is_nullable(&self) -> bool {
        self.field_type.nullable
    }

    /// The non-null type
    pub fn primary_type(&self) -> JsonType {
        self.field_type.primary
    }
}

/// Top-level record schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchema {
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(rename = "type")]
    pub json_type: JsonType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub properties: BTreeMap<String, SchemaProperty>,

    /// Fields every record must carry, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(rename = "additionalProperties", default = "default_true")]
    pub additional_properties: bool,
}

fn default_true() -> bool {
    true
}

impl Default for JsonSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonSchema {
    /// Empty draft-07 object schema
    pub fn new() -> Self {
        Self {
            schema: Some(DRAFT_07.to_string()),
            json_type: JsonType::Object,
            title: None,
            description: None,
            properties: BTreeMap::new(),
            required: Vec::new(),
            additional_properties: true,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn add_property(&mut self, name: &str, property: SchemaProperty) {
        self.properties.insert(name.to_string(), property);
    }

    /// Mark a field as required (idempotent)
    pub fn add_required(&mut self, name: &str) {
        if !self.is_required(name) {
            self.required.push(name.to_string());
        }
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|n| n == name)
    }

    pub fn get_property(&self, name: &str) -> Option<&SchemaProperty> {
        self.properties.get(name)
    }

    /// Schema as a JSON value
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
