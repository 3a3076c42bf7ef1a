//! Per-record schema inference
//!
//! Infers a flat field → type mapping from a single record. Two records share a
//! schema when they have the same field names with the same types, regardless of
//! field order.

use crate::types::JsonType;
use serde_json::Value;
use std::collections::BTreeMap;

/// Field name → type of one record, keyed in sorted order
pub type InferredSchema = BTreeMap<String, JsonType>;

/// Infer the schema of one record. Non-object records have no fields.
pub fn infer_record_schema(record: &Value) -> InferredSchema {
    match record {
        Value::Object(obj) => obj
            .iter()
            .map(|(key, value)| (key.clone(), JsonType::from_value(value)))
            .collect(),
        _ => InferredSchema::new(),
    }
}

/// Canonical serialization used as the grouping key for schema distribution
pub fn canonical_key(schema: &InferredSchema) -> String {
    let mut key = String::from("{");
    for (i, (field, json_type)) in schema.iter().enumerate() {
        if i > 0 {
            key.push(',');
        }
        // Field names go through the JSON string encoder so quotes and commas can't collide
        key.push_str(&Value::String(field.clone()).to_string());
        key.push(':');
        key.push_str(json_type.as_str());
    }
    key.push('}');
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_simple_object() {
        let record = json!({"name": "Alice", "age": 30, "tags": [], "x": null});
        let schema = infer_record_schema(&record);
        assert_eq!(schema.get("name"), Some(&JsonType::String));
        assert_eq!(schema.get("age"), Some(&JsonType::Number));
        assert_eq!(schema.get("tags"), Some(&JsonType::Array));
        assert_eq!(schema.get("x"), Some(&JsonType::Null));
    }

    #[test]
    fn test_scalar_record_has_no_fields() {
        assert!(infer_record_schema(&json!([1, 2, 3])).is_empty());
        assert!(infer_record_schema(&json!("text")).is_empty());
    }

    #[test]
    fn test_key_ignores_field_order() {
        let a = infer_record_schema(&json!({"a": 1, "b": "x"}));
        let b = infer_record_schema(&json!({"b": "y", "a": 2.5}));
        assert_eq!(canonical_key(&a), canonical_key(&b));
        assert_eq!(canonical_key(&a), r#"{"a":number,"b":string}"#);
    }

    #[test]
    fn test_key_distinguishes_types() {
        let a = infer_record_schema(&json!({"a": 1}));
        let b = infer_record_schema(&json!({"a": "1"}));
        assert_ne!(canonical_key(&a), canonical_key(&b));
    }
}
