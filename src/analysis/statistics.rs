use crate::analysis::patterns::field_frequency;
use crate::types::Record;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Compact serialized sizes in bytes; every field is null for an empty input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SizeDistribution {
    pub min: Option<usize>,
    pub max: Option<usize>,
    pub average: Option<f64>,
    /// Upper median: element `n / 2` of the sorted sizes
    pub median: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub total_records: usize,
    /// Mean number of fields per record, null when there are no records
    pub average_fields: Option<f64>,
    pub size_distribution: SizeDistribution,
    /// Field name → number of records carrying it, in first-seen order
    pub field_frequency: Map<String, Value>,
}

pub fn analyze_statistics(records: &[Record]) -> StatisticsReport {
    let total = records.len();
    let average_fields = mean(records.iter().map(Record::field_count), total);

    let sizes: Vec<usize> = records
        .iter()
        .map(|record| serde_json::to_string(&record.value).map_or(0, |s| s.len()))
        .collect();

    StatisticsReport {
        total_records: total,
        average_fields,
        size_distribution: size_distribution(sizes),
        field_frequency: field_frequency(records),
    }
}

pub fn size_distribution(mut sizes: Vec<usize>) -> SizeDistribution {
    sizes.sort_unstable();
    SizeDistribution {
        min: sizes.first().copied(),
        max: sizes.last().copied(),
        average: mean(sizes.iter().copied(), sizes.len()),
        median: sizes.get(sizes.len() / 2).copied(),
    }
}

fn mean(values: impl Iterator<Item = usize>, count: usize) -> Option<f64> {
    if count == 0 {
        return None;
    }
    Some(values.sum::<usize>() as f64 / count as f64)
}
