//! Frequency-based anomaly detection
//!
//! A field is common when more than half of the records carry it, and rare when
//! at most a tenth do (the 10% boundary is inclusive). A record is anomalous if it
//! lacks a common field or carries a rare one.

use crate::analysis::patterns::field_frequency;
use crate::types::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of anomalous records listed in full
pub const MAX_LISTED: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anomaly {
    pub record_index: usize,
    pub line_number: usize,
    pub missing_fields: Vec<String>,
    pub extra_fields: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyReport {
    /// All anomalous records, including those not listed
    pub anomaly_count: usize,
    pub anomalies: Vec<Anomaly>,
}

fn is_common(count: u64, total: u64) -> bool {
    count * 2 > total
}

fn is_rare(count: u64, total: u64) -> bool {
    count * 10 <= total
}

pub fn analyze_anomalies(records: &[Record]) -> AnomalyReport {
    let total = records.len() as u64;
    let frequency = field_frequency(records);
    let count_of = |field: &str| frequency.get(field).and_then(Value::as_u64).unwrap_or(0);
    // first-seen order
    let common: Vec<&String> = frequency
        .keys()
        .filter(|field| is_common(count_of(field), total))
        .collect();

    let mut report = AnomalyReport::default();

    for (index, record) in records.iter().enumerate() {
        let fields = record.fields();
        let missing_fields: Vec<String> = common
            .iter()
            .filter(|field| !fields.is_some_and(|obj| obj.contains_key(field.as_str())))
            .map(|field| field.to_string())
            .collect();
        let extra_fields: Vec<String> = record
            .field_names()
            .filter(|name| is_rare(count_of(name), total))
            .map(str::to_string)
            .collect();

        if missing_fields.is_empty() && extra_fields.is_empty() {
            continue;
        }

        report.anomaly_count += 1;
        if report.anomalies.len() < MAX_LISTED {
            report.anomalies.push(Anomaly {
                record_index: index,
                line_number: record.line_number,
                missing_fields,
                extra_fields,
            });
        }
    }

    report
}
