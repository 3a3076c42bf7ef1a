use crate::schema::inference::{canonical_key, infer_record_schema, InferredSchema};
use crate::types::Record;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaCount {
    pub schema: InferredSchema,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureReport {
    pub unique_schemas: usize,
    pub schema_distribution: Vec<SchemaCount>,
}

/// Bucket records by inferred schema, buckets in first-seen order
pub fn analyze_structure(records: &[Record]) -> StructureReport {
    let mut distribution: Vec<SchemaCount> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for record in records {
        let schema = infer_record_schema(&record.value);
        let key = canonical_key(&schema);
        match positions.get(&key) {
            Some(&index) => distribution[index].count += 1,
            None => {
                positions.insert(key, distribution.len());
                distribution.push(SchemaCount { schema, count: 1 });
            }
        }
    }

    StructureReport {
        unique_schemas: distribution.len(),
        schema_distribution: distribution,
    }
}
