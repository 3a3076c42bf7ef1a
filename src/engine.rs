//! Entry points
//!
//! Each call reads its source exactly once, builds its own record sequence and
//! error list, and drops both when it returns.

use crate::analysis::{analyze_records, AnalysisKind};
use crate::config::ProcessOptions;
use crate::error::Result;
use crate::parser::parse_source;
use crate::reader::Source;
use crate::report::{AnalysisReport, ProcessingResult, TransformSummary, ValidationReport};
use crate::schema::{validate_records, SchemaDescriptor};
use crate::transform::{
    apply, LabelPicker, NdjsonWriter, Operation, RandomPicker, TransformKind, TransformOutput,
};
use crate::translate;
use std::io::Write;
use tracing::info;

/// Decode every line of `source`
pub fn parse(source: &Source, options: &ProcessOptions) -> Result<ProcessingResult> {
    let outcome = parse_source(source, options.fail_fast, options.framework_translation)?;
    info!(
        source = %source.describe(),
        total_lines = outcome.total_lines,
        valid = outcome.valid_count(),
        errors = outcome.error_count(),
        "Parsed stream"
    );
    Ok(ProcessingResult::from_outcome(outcome, options))
}

/// Check well-formedness and, when a schema is given, record structure
pub fn validate(
    source: &Source,
    schema: Option<&SchemaDescriptor>,
    options: &ProcessOptions,
) -> Result<ValidationReport> {
    let outcome = parse_source(source, options.fail_fast, options.framework_translation)?;
    let schema_validation = schema.map(|schema| validate_records(&outcome.records, schema));

    info!(
        source = %source.describe(),
        records = outcome.valid_count(),
        errors = outcome.error_count(),
        findings = schema_validation.as_ref().map_or(0, |v| v.findings.len()),
        "Validated stream"
    );
    Ok(ValidationReport::new(outcome, schema_validation, options))
}

/// Transform `source` and write the result to `destination`.
///
/// Domain tagging, when enabled, draws labels from the thread RNG.
pub fn transform<W: Write>(
    source: &Source,
    destination: W,
    kind: &str,
    operation: &Operation,
    options: &ProcessOptions,
) -> Result<TransformSummary> {
    transform_with_picker(
        source,
        destination,
        kind,
        operation,
        options,
        &mut RandomPicker::new(),
    )
}

/// [`transform`] with an explicit label source for domain tagging
pub fn transform_with_picker<W: Write>(
    source: &Source,
    destination: W,
    kind: &str,
    operation: &Operation,
    options: &ProcessOptions,
    picker: &mut dyn LabelPicker,
) -> Result<TransformSummary> {
    let kind: TransformKind = kind.parse()?;
    let outcome = parse_source(source, options.fail_fast, options.framework_translation)?;
    let error_count = outcome.error_count();
    let values: Vec<_> = outcome.records.into_iter().map(|r| r.value).collect();
    let input_records = values.len();

    let mut output = apply(kind, operation, values)?;
    if options.domain_tagging {
        output = output.tag_domains(picker);
    }

    let mut writer = NdjsonWriter::new(destination);
    match &output {
        TransformOutput::Sequence(values) => writer.write_sequence(values)?,
        TransformOutput::Document(value) => writer.write_document(value, options.pretty)?,
    }
    writer.flush()?;

    info!(
        source = %source.describe(),
        transform = %kind,
        input = input_records,
        output = output.len(),
        "Transformed stream"
    );
    Ok(TransformSummary {
        transform_type: kind.to_string(),
        input_records,
        output_records: output.len(),
        error_count,
        domain_tagging: options.domain_tagging,
    })
}

/// Run one analysis over every decoded record of `source`
pub fn analyze(source: &Source, kind: &str, options: &ProcessOptions) -> Result<AnalysisReport> {
    let kind: AnalysisKind = kind.parse()?;
    let outcome = parse_source(source, options.fail_fast, false)?;
    let result = analyze_records(kind, &outcome.records);

    let translated_summary = if options.framework_translation {
        Some(translate::framework_translation(&serde_json::to_string(&result)?))
    } else {
        None
    };

    info!(
        source = %source.describe(),
        analysis = %kind,
        records = outcome.valid_count(),
        "Analyzed stream"
    );
    Ok(AnalysisReport {
        records_analyzed: outcome.valid_count(),
        error_count: outcome.error_count(),
        result,
        translated_summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisResult;
    use crate::transform::{Expr, SequencePicker};
    use serde_json::{json, Value};

    const SAMPLE: &str =
        "{\"g\":\"x\",\"v\":1}\n{\"g\":\"y\",\"v\":2}\nbad\n\n{\"g\":\"x\",\"v\":3}\n";

    #[test]
    fn test_parse_counts() {
        let result = parse(&Source::text(SAMPLE), &ProcessOptions::default()).unwrap();
        assert_eq!(result.total_lines, 5);
        assert_eq!(result.valid_count, 3);
        assert_eq!(result.error_count, 1);
        assert!(result.valid_count + result.error_count <= result.total_lines);
    }

    #[test]
    fn test_validate_with_schema() {
        let schema = SchemaDescriptor::from_value(json!({
            "properties": {"v": {"type": "string"}},
            "required": ["g"]
        }))
        .unwrap();
        let source = Source::text("{\"g\":1,\"v\":\"a\"}\n{\"v\":2}");
        let report = validate(&source, Some(&schema), &ProcessOptions::default()).unwrap();
        assert!(!report.valid);
        let findings = report.schema_validation.unwrap().findings;
        assert_eq!(findings.len(), 2);
    }

    #[test]
    fn test_transform_aggregate_with_tags() {
        let options = ProcessOptions {
            domain_tagging: true,
            ..ProcessOptions::default()
        };
        let mut out: Vec<u8> = Vec::new();
        let summary = transform_with_picker(
            &Source::text(SAMPLE),
            &mut out,
            "aggregate",
            &Operation::from(Expr::field("g")),
            &options,
            &mut SequencePicker::new(vec![0]),
        )
        .unwrap();

        assert_eq!(summary.input_records, 3);
        assert_eq!(summary.output_records, 2);
        assert_eq!(summary.error_count, 1);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(lines[0]["group"], "x");
        assert_eq!(lines[0]["count"], 2);
        assert_eq!(lines[0]["_domain"], "music");
        assert_eq!(lines[1]["group"], "y");
    }

    #[test]
    fn test_unknown_transform_writes_nothing() {
        let mut out: Vec<u8> = Vec::new();
        let err = transform(
            &Source::text(SAMPLE),
            &mut out,
            "explode",
            &Operation::from(Expr::Record),
            &ProcessOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), "UnknownTransform");
        assert!(out.is_empty());
    }

    #[test]
    fn test_analyze_with_translation() {
        let options = ProcessOptions {
            framework_translation: true,
            ..ProcessOptions::default()
        };
        let source = Source::text("{\"error\":1}\n{\"error\":2}");
        let report = analyze(&source, "patterns", &options).unwrap();
        assert!(matches!(report.result, AnalysisResult::Patterns(_)));
        let summary = report.translated_summary.unwrap();
        assert!(summary.contains("issue detected"));
        assert!(!summary.contains("error"));
    }

    #[test]
    fn test_unknown_analysis() {
        let err = analyze(&Source::text(SAMPLE), "vibes", &ProcessOptions::default()).unwrap_err();
        assert_eq!(err.kind(), "UnknownAnalysis");
    }
}
