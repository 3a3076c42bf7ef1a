//! # ndjson-engine - Streaming NDJSON Processing
//!
//! Parses newline-delimited JSON streams, validates records against a declared
//! schema, runs transform pipelines, and produces structural analyses.
//!
//! ## Modules
//!
//! - **reader** / **parser**: stream lines and decode them, collecting per-line errors
//! - **schema**: schema descriptors, per-record inference and validation
//! - **transform**: filter, map, reduce and aggregate over decoded records
//! - **analysis**: schema distribution, field patterns, statistics, anomalies
//! - **report**: result shapes and the success/failure envelope
//!
//! ## Quick Start
//!
//! ### Parsing
//!
//! ```rust
//! use ndjson_engine::{parse, ProcessOptions, Source};
//!
//! # fn main() -> anyhow::Result<()> {
//! let source = Source::text("{\"a\":1}\nbad\n{\"b\":2}");
//! let result = parse(&source, &ProcessOptions::default())?;
//!
//! assert_eq!(result.valid_count, 2);
//! assert_eq!(result.error_count, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ### Transforming
//!
//! ```rust
//! use ndjson_engine::transform::{Expr, Operation};
//! use ndjson_engine::{transform, ProcessOptions, Source};
//!
//! # fn main() -> anyhow::Result<()> {
//! let source = Source::text("{\"g\":\"x\"}\n{\"g\":\"y\"}\n{\"g\":\"x\"}");
//! let mut out: Vec<u8> = Vec::new();
//! let op = Operation::from(Expr::field("g"));
//! let summary = transform(&source, &mut out, "aggregate", &op, &ProcessOptions::default())?;
//!
//! assert_eq!(summary.output_records, 2);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod parser;
pub mod reader;
pub mod report;
pub mod schema;
pub mod transform;
pub mod translate;
pub mod types;

// Re-export commonly used types for convenience
pub use analysis::{AnalysisKind, AnalysisResult};
pub use config::ProcessOptions;
pub use engine::{analyze, parse, transform, transform_with_picker, validate};
pub use error::{EngineError, Result};
pub use reader::Source;
pub use report::{
    AnalysisReport, Assembler, ProcessingResult, Response, TransformSummary, ValidationReport,
};
pub use schema::SchemaDescriptor;
pub use types::{JsonType, ParseError, Record};
