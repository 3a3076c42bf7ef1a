//! Structural validation of records against a [`SchemaDescriptor`]
//!
//! Only top-level presence and type names are checked; nested values are not
//! descended into. Validation never fails, it only produces findings.

use crate::schema::descriptor::SchemaDescriptor;
use crate::types::{JsonType, Record};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Finding {
    MissingRequiredField {
        record_index: usize,
        line_number: usize,
        field: String,
    },
    TypeMismatch {
        record_index: usize,
        line_number: usize,
        field: String,
        expected: JsonType,
        actual: JsonType,
    },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::MissingRequiredField {
                record_index, field, ..
            } => write!(f, "Record {}: Missing required field '{}'", record_index, field),
            Finding::TypeMismatch {
                record_index,
                field,
                expected,
                actual,
                ..
            } => write!(
                f,
                "Record {}: Field '{}' expected {}, got {}",
                record_index, field, expected, actual
            ),
        }
    }
}

/// Findings for a whole record sequence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaValidation {
    pub valid: bool,
    pub findings: Vec<Finding>,
}

/// Check one record; `index` is its 0-based position among decoded records
pub fn validate_record(index: usize, record: &Record, schema: &SchemaDescriptor) -> Vec<Finding> {
    let mut findings = Vec::new();
    let fields = record.fields();

    for field in &schema.required {
        let present = fields.is_some_and(|obj| obj.contains_key(field));
        if !present {
            findings.push(Finding::MissingRequiredField {
                record_index: index,
                line_number: record.line_number,
                field: field.clone(),
            });
        }
    }

    let Some(obj) = fields else {
        return findings;
    };

    for (field, spec) in &schema.properties {
        let (Some(expected), Some(value)) = (spec.json_type, obj.get(field)) else {
            continue;
        };
        let actual = JsonType::from_value(value);
        if actual != expected {
            findings.push(Finding::TypeMismatch {
                record_index: index,
                line_number: record.line_number,
                field: field.clone(),
                expected,
                actual,
            });
        }
    }

    findings
}

pub fn validate_records(records: &[Record], schema: &SchemaDescriptor) -> SchemaValidation {
    let findings: Vec<Finding> = records
        .iter()
        .enumerate()
        .flat_map(|(index, record)| validate_record(index, record, schema))
        .collect();

    SchemaValidation {
        valid: findings.is_empty(),
        findings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> SchemaDescriptor {
        SchemaDescriptor::default()
            .property("id", JsonType::Number)
            .property("name", JsonType::String)
            .require("id")
            .require("name")
    }

    #[test]
    fn test_valid_records() {
        let records = vec![
            Record::new(1, json!({"id": 1, "name": "a", "extra": true})),
            Record::new(2, json!({"id": 2.5, "name": "b"})),
        ];
        let result = validate_records(&records, &schema());
        assert!(result.valid);
        assert!(result.findings.is_empty());
    }

    #[test]
    fn test_missing_required_field() {
        let records = vec![Record::new(1, json!({"id": 1})), Record::new(3, json!({"id": 2}))];
        let result = validate_records(&records, &schema());
        assert!(!result.valid);
        assert_eq!(
            result.findings[1],
            Finding::MissingRequiredField {
                record_index: 1,
                line_number: 3,
                field: "name".to_string()
            }
        );
        assert_eq!(result.findings[0].to_string(), "Record 0: Missing required field 'name'");
    }

    #[test]
    fn test_type_mismatch() {
        let records = vec![Record::new(1, json!({"id": "7", "name": null}))];
        let result = validate_records(&records, &schema());
        assert_eq!(result.findings.len(), 2);
        assert_eq!(
            result.findings[0],
            Finding::TypeMismatch {
                record_index: 0,
                line_number: 1,
                field: "id".to_string(),
                expected: JsonType::Number,
                actual: JsonType::String,
            }
        );
        assert_eq!(
            result.findings[1].to_string(),
            "Record 0: Field 'name' expected string, got null"
        );
    }

    #[test]
    fn test_non_object_misses_every_required_field() {
        let records = vec![Record::new(1, json!([1, 2]))];
        let result = validate_records(&records, &schema());
        assert_eq!(result.findings.len(), 2);
    }

    #[test]
    fn test_required_outside_properties() {
        let schema = SchemaDescriptor::default().require("ts");
        let findings = validate_record(0, &Record::new(1, json!({"a": 1})), &schema);
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_repeated_required_name_reports_once() {
        let schema = SchemaDescriptor::from_value(json!({"required": ["id", "id"]})).unwrap();
        let findings = validate_record(0, &Record::new(1, json!({"name": "a"})), &schema);
        assert_eq!(
            findings,
            vec![Finding::MissingRequiredField {
                record_index: 0,
                line_number: 1,
                field: "id".to_string()
            }]
        );
    }

    #[test]
    fn test_finding_serializes_with_kind_tag() {
        let finding = Finding::MissingRequiredField {
            record_index: 0,
            line_number: 1,
            field: "id".to_string(),
        };
        let value = serde_json::to_value(&finding).unwrap();
        assert_eq!(value["kind"], "MissingRequiredField");
        assert_eq!(value["field"], "id");
    }
}
