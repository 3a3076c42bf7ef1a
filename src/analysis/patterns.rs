//! Field patterns
//!
//! Both maps list fields in the order they were first seen across the records.

use crate::types::{JsonType, Record};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternReport {
    /// Field name → number of records carrying it
    pub common_fields: Map<String, Value>,

    /// Field name → type name seen on the last record carrying it
    pub data_types: Map<String, Value>,
}

pub fn analyze_patterns(records: &[Record]) -> PatternReport {
    let mut report = PatternReport::default();

    for obj in records.iter().filter_map(Record::fields) {
        for (key, value) in obj {
            bump(&mut report.common_fields, key);
            // last write wins, not a majority vote
            report
                .data_types
                .insert(key.clone(), Value::from(JsonType::from_value(value).as_str()));
        }
    }

    report
}

/// Field name → number of records carrying it, in first-seen order
pub fn field_frequency(records: &[Record]) -> Map<String, Value> {
    let mut frequency = Map::new();
    for name in records.iter().flat_map(Record::field_names) {
        bump(&mut frequency, name);
    }
    frequency
}

fn bump(counts: &mut Map<String, Value>, key: &str) {
    let count = counts.entry(key).or_insert(Value::from(0u64));
    *count = Value::from(count.as_u64().unwrap_or(0) + 1);
}
