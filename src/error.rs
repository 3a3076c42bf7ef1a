use std::path::PathBuf;
use thiserror::Error;

/// Failures that end an invocation.
///
/// Per-line decode problems are not represented here unless the caller asked for
/// fail-fast mode; otherwise they are collected as [`crate::ParseError`] data.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Source unavailable: {path}: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Decode error on line {line_number}: {message}")]
    Decode { line_number: usize, message: String },

    #[error("Unknown transform: {0}")]
    UnknownTransform(String),

    #[error("Unknown analysis: {0}")]
    UnknownAnalysis(String),

    #[error("Invalid schema descriptor: {0}")]
    InvalidSchema(String),

    #[error("Transform '{kind}' requires a {expected} operation")]
    OperationMismatch {
        kind: String,
        expected: &'static str,
    },

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl EngineError {
    /// Stable name of the error category, used in failure envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::SourceUnavailable { .. } => "SourceUnavailable",
            EngineError::Decode { .. } => "DecodeError",
            EngineError::UnknownTransform(_) => "UnknownTransform",
            EngineError::UnknownAnalysis(_) => "UnknownAnalysis",
            EngineError::InvalidSchema(_) => "InvalidSchema",
            EngineError::OperationMismatch { .. } => "OperationMismatch",
            EngineError::Output(_) => "OutputError",
            EngineError::Serialize(_) => "SerializeError",
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
