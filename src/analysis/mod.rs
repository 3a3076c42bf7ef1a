//! Analyzer
//!
//! Structural analyses over a fully materialized record sequence:
//! schema distribution, field patterns, size statistics and anomalies.

pub mod anomalies;
pub mod patterns;
pub mod statistics;
pub mod structure;

pub use anomalies::{analyze_anomalies, Anomaly, AnomalyReport};
pub use patterns::{analyze_patterns, field_frequency, PatternReport};
pub use statistics::{analyze_statistics, SizeDistribution, StatisticsReport};
pub use structure::{analyze_structure, SchemaCount, StructureReport};

use crate::error::EngineError;
use crate::types::Record;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisKind {
    Structure,
    Patterns,
    Statistics,
    Anomalies,
}

impl AnalysisKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisKind::Structure => "structure",
            AnalysisKind::Patterns => "patterns",
            AnalysisKind::Statistics => "statistics",
            AnalysisKind::Anomalies => "anomalies",
        }
    }
}

impl FromStr for AnalysisKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "structure" => Ok(AnalysisKind::Structure),
            "patterns" => Ok(AnalysisKind::Patterns),
            "statistics" => Ok(AnalysisKind::Statistics),
            "anomalies" => Ok(AnalysisKind::Anomalies),
            other => Err(EngineError::UnknownAnalysis(other.to_string())),
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One analysis report, tagged with its kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "analysis_type", rename_all = "snake_case")]
pub enum AnalysisResult {
    Structure(StructureReport),
    Patterns(PatternReport),
    Statistics(StatisticsReport),
    Anomalies(AnomalyReport),
}

impl AnalysisResult {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisResult::Structure(_) => AnalysisKind::Structure,
            AnalysisResult::Patterns(_) => AnalysisKind::Patterns,
            AnalysisResult::Statistics(_) => AnalysisKind::Statistics,
            AnalysisResult::Anomalies(_) => AnalysisKind::Anomalies,
        }
    }
}

pub fn analyze_records(kind: AnalysisKind, records: &[Record]) -> AnalysisResult {
    match kind {
        AnalysisKind::Structure => AnalysisResult::Structure(analyze_structure(records)),
        AnalysisKind::Patterns => AnalysisResult::Patterns(analyze_patterns(records)),
        AnalysisKind::Statistics => AnalysisResult::Statistics(analyze_statistics(records)),
        AnalysisKind::Anomalies => AnalysisResult::Anomalies(analyze_anomalies(records)),
    }
}
