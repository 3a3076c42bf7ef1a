//! Result assembly
//!
//! Shapes engine outcomes into the caller-visible results and wraps every call in
//! a [`Response`] envelope with an explicit `success` flag.

use crate::analysis::AnalysisResult;
use crate::config::ProcessOptions;
use crate::error::{EngineError, Result};
use crate::parser::ParseOutcome;
use crate::schema::SchemaValidation;
use crate::types::{ParseError, Record};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Instant;

/// Either the full items or just how many there are
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Items(Vec<T>),
    Count(usize),
}

impl<T> Listing<T> {
    pub fn new(items: Vec<T>, include: bool) -> Self {
        if include {
            Listing::Items(items)
        } else {
            Listing::Count(items.len())
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Listing::Items(items) => items.len(),
            Listing::Count(n) => *n,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn items(&self) -> Option<&[T]> {
        match self {
            Listing::Items(items) => Some(items),
            Listing::Count(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingResult {
    pub records: Listing<Record>,
    pub total_lines: usize,
    pub valid_count: usize,
    pub error_count: usize,
    pub errors: Listing<ParseError>,
    pub success_rate: f64,
}

impl ProcessingResult {
    pub fn from_outcome(outcome: ParseOutcome, options: &ProcessOptions) -> Self {
        let success_rate = outcome.success_rate();
        ProcessingResult {
            total_lines: outcome.total_lines,
            valid_count: outcome.valid_count(),
            error_count: outcome.error_count(),
            success_rate,
            records: Listing::new(outcome.records, options.include_records),
            errors: Listing::new(outcome.errors, options.include_errors),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    /// No malformed lines and, when a schema was given, no findings
    pub valid: bool,
    pub total_lines: usize,
    pub total_records: usize,
    pub error_count: usize,
    pub errors: Listing<ParseError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_validation: Option<SchemaValidation>,
}

impl ValidationReport {
    pub fn new(
        outcome: ParseOutcome,
        schema_validation: Option<SchemaValidation>,
        options: &ProcessOptions,
    ) -> Self {
        let schema_valid = schema_validation.as_ref().map_or(true, |v| v.valid);
        ValidationReport {
            valid: outcome.errors.is_empty() && schema_valid,
            total_lines: outcome.total_lines,
            total_records: outcome.valid_count(),
            error_count: outcome.error_count(),
            errors: Listing::new(outcome.errors, options.include_errors),
            schema_validation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformSummary {
    pub transform_type: String,
    pub input_records: usize,
    pub output_records: usize,
    pub error_count: usize,
    pub domain_tagging: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub records_analyzed: usize,
    pub error_count: usize,
    #[serde(flatten)]
    pub result: AnalysisResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub kind: String,
    pub message: String,
}

impl From<&EngineError> for ErrorReport {
    fn from(err: &EngineError) -> Self {
        ErrorReport {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Definite success-or-failure outcome of one call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
    pub elapsed_ms: u64,
    /// Caller-supplied metadata, copied verbatim
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub annotations: Map<String, Value>,
}

/// Builds [`Response`]s, stamping each with the caller's annotations
#[derive(Debug, Clone, Default)]
pub struct Assembler {
    annotations: Map<String, Value>,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_annotations(annotations: Map<String, Value>) -> Self {
        Assembler { annotations }
    }

    pub fn annotate(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    pub fn assemble<T>(&self, outcome: Result<T>, started: Instant) -> Response<T> {
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match outcome {
            Ok(result) => Response {
                success: true,
                result: Some(result),
                error: None,
                elapsed_ms,
                annotations: self.annotations.clone(),
            },
            Err(err) => Response {
                success: false,
                result: None,
                error: Some(ErrorReport::from(&err)),
                elapsed_ms,
                annotations: self.annotations.clone(),
            },
        }
    }

    /// Time and assemble a call in one step
    pub fn run<T>(&self, call: impl FnOnce() -> Result<T>) -> Response<T> {
        let started = Instant::now();
        self.assemble(call(), started)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn outcome() -> ParseOutcome {
        ParseOutcome {
            records: vec![Record::new(1, json!({"a": 1}))],
            errors: vec![ParseError::new(2, "bad", "Expected value at column 1")],
            total_lines: 2,
        }
    }

    #[test]
    fn test_counts_only_by_default() {
        let result = ProcessingResult::from_outcome(outcome(), &ProcessOptions::default());
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["records"], 1);
        assert_eq!(value["errors"][0]["line_number"], 2);
        assert_eq!(value["success_rate"], 0.5);
    }

    #[test]
    fn test_full_records_on_request() {
        let options = ProcessOptions {
            include_records: true,
            include_errors: false,
            ..ProcessOptions::default()
        };
        let result = ProcessingResult::from_outcome(outcome(), &options);
        assert_eq!(result.records.items().map(<[Record]>::len), Some(1));
        assert_eq!(result.errors, Listing::Count(1));
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["records"][0]["record"], json!({"a": 1}));
    }

    #[test]
    fn test_validation_requires_clean_parse() {
        let report = ValidationReport::new(outcome(), None, &ProcessOptions::default());
        assert!(!report.valid);
        let clean = ParseOutcome {
            errors: vec![],
            ..outcome()
        };
        assert!(ValidationReport::new(clean, None, &ProcessOptions::default()).valid);
    }

    #[test]
    fn test_failure_envelope() {
        let assembler = Assembler::new().annotate("framework", "ndjson");
        let response: Response<()> =
            assembler.run(|| Err(EngineError::UnknownAnalysis("x".into())));
        assert!(!response.success);
        assert!(response.result.is_none());
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["error"]["kind"], "UnknownAnalysis");
        assert_eq!(value["annotations"]["framework"], "ndjson");
    }

    #[test]
    fn test_success_envelope() {
        let response = Assembler::new().run(|| Ok(3));
        assert!(response.success);
        assert_eq!(response.result, Some(3));
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("annotations").is_none());
        assert!(value.get("error").is_none());
    }
}
