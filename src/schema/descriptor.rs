use crate::error::{EngineError, Result};
use crate::types::JsonType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Caller-declared schema: per-field types plus required field names.
///
/// Only `properties.*.type` and `required` are recognized; any other keyword is
/// ignored. Type names must be one of the six JSON type names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    #[serde(default)]
    pub properties: BTreeMap<String, PropertySpec>,

    /// Repeated names collapse to one entry
    #[serde(default)]
    pub required: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySpec {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub json_type: Option<JsonType>,
}

impl SchemaDescriptor {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| EngineError::InvalidSchema(e.to_string()))
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| EngineError::InvalidSchema(e.to_string()))
    }

    /// Read a descriptor document from disk
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Builder-style helper: declare a field type
    pub fn property(mut self, field: impl Into<String>, json_type: JsonType) -> Self {
        self.properties.insert(
            field.into(),
            PropertySpec {
                json_type: Some(json_type),
            },
        );
        self
    }

    /// Builder-style helper: mark a field required
    pub fn require(mut self, field: impl Into<String>) -> Self {
        self.required.insert(field.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_descriptor() {
        let schema = SchemaDescriptor::from_value(json!({
            "properties": {"id": {"type": "number"}, "tags": {"type": "array"}, "note": {}},
            "required": ["id"],
            "additionalProperties": false
        }))
        .unwrap();

        assert_eq!(schema.properties["id"].json_type, Some(JsonType::Number));
        assert_eq!(schema.properties["note"].json_type, None);
        assert!(schema.required.contains("id"));
        assert_eq!(schema.required.len(), 1);
    }

    #[test]
    fn test_repeated_required_names_collapse() {
        let schema = SchemaDescriptor::from_json(r#"{"required": ["id", "name", "id"]}"#).unwrap();
        assert_eq!(schema.required.len(), 2);
        let schema = schema.require("name");
        assert_eq!(schema.required.len(), 2);
    }

    #[test]
    fn test_required_is_optional() {
        let schema =
            SchemaDescriptor::from_json(r#"{"properties": {"a": {"type": "string"}}}"#).unwrap();
        assert!(schema.required.is_empty());
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let err = SchemaDescriptor::from_json(r#"{"properties": {"a": {"type": "integer"}}}"#)
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidSchema");
    }

    #[test]
    fn test_builder_helpers() {
        let schema = SchemaDescriptor::default()
            .property("name", JsonType::String)
            .require("name");
        assert_eq!(schema.properties.len(), 1);
        assert!(schema.required.contains("name"));
    }
}
