//! ndjson: parse, validate, transform and analyze newline-delimited JSON
//!
//! Usage:
//!   # Count records and list malformed lines
//!   ndjson parse events.jsonl
//!
//!   # Validate against a schema descriptor
//!   ndjson validate events.jsonl --schema schema.json
//!
//!   # Keep matching records, reading from stdin
//!   cat events.jsonl | ndjson transform --kind filter --expr '{"eq":[{"field":"level"},{"literal":"warn"}]}'
//!
//!   # Group by a field and write the groups to a file
//!   ndjson transform events.jsonl --kind aggregate --expr '{"field":"user"}' -o groups.jsonl
//!
//!   # Detect records with unusual fields
//!   ndjson analyze events.jsonl --kind anomalies

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use ndjson_engine::transform::{Expr, FoldExpr, Operation};
use ndjson_engine::{
    Assembler, ProcessOptions, Response, SchemaDescriptor, Source, TransformSummary,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::{stdin, stdout, Read, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ndjson")]
#[command(
    about = "Streaming NDJSON parsing, validation, transforms and analysis",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Compact output (no pretty-printing); overrides `pretty` from --options
    #[arg(long, global = true)]
    compact: bool,

    /// Log per-line diagnostics to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// JSON options file (failFast, includeRecords, ...); flags override it
    #[arg(long, global = true, value_name = "FILE")]
    options: Option<String>,

    /// Annotation copied into the result envelope, as KEY=VALUE (repeatable)
    #[arg(long = "annotate", global = true, value_name = "KEY=VALUE")]
    annotations: Vec<String>,
}

#[derive(Args, Debug)]
struct Common {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Stop at the first malformed line
    #[arg(long)]
    fail_fast: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode every line and report counts and errors
    Parse {
        #[command(flatten)]
        common: Common,

        /// Include decoded records in the result
        #[arg(long)]
        records: bool,

        /// Report only the number of malformed lines
        #[arg(long)]
        no_errors: bool,
    },

    /// Check well-formedness, and structure against a schema descriptor
    Validate {
        #[command(flatten)]
        common: Common,

        /// Schema descriptor (JSON with `properties` and `required`)
        #[arg(long, short = 's')]
        schema: Option<String>,

        /// Rewrite error messages with the framework vocabulary
        #[arg(long)]
        translate: bool,
    },

    /// Filter, map, reduce or aggregate records
    Transform {
        #[command(flatten)]
        common: Common,

        /// filter | map | reduce | aggregate
        #[arg(long, short = 'k')]
        kind: String,

        /// Operation expression as JSON (filter, map, aggregate)
        #[arg(long, conflicts_with = "fold")]
        expr: Option<String>,

        /// Built-in fold for reduce: count | merge | sum:FIELD
        #[arg(long)]
        fold: Option<String>,

        /// Output file (use stdout if omitted)
        #[arg(long, short = 'o')]
        output: Option<String>,

        /// Attach a random `_domain` label to each output record
        #[arg(long)]
        domain_tagging: bool,
    },

    /// Run a structural analysis
    Analyze {
        #[command(flatten)]
        common: Common,

        /// structure | patterns | statistics | anomalies
        #[arg(long, short = 'k')]
        kind: String,

        /// Add a summary rewritten with the framework vocabulary
        #[arg(long)]
        translate: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut options = load_options(cli.options.as_deref(), cli.compact)?;
    let compact = !options.pretty;

    let assembler = Assembler::with_annotations(parse_annotations(&cli.annotations)?);

    let success = match cli.command {
        Command::Parse {
            common,
            records,
            no_errors,
        } => {
            options.fail_fast |= common.fail_fast;
            options.include_records |= records;
            options.include_errors &= !no_errors;
            let source = open_source(common.input.as_deref())?;
            emit(&assembler.run(|| ndjson_engine::parse(&source, &options)), compact)?
        }
        Command::Validate {
            common,
            schema,
            translate,
        } => {
            options.fail_fast |= common.fail_fast;
            options.framework_translation |= translate;
            let source = open_source(common.input.as_deref())?;
            emit(
                &assembler.run(|| {
                    let schema = schema.as_deref().map(SchemaDescriptor::from_path).transpose()?;
                    ndjson_engine::validate(&source, schema.as_ref(), &options)
                }),
                compact,
            )?
        }
        Command::Transform {
            common,
            kind,
            expr,
            fold,
            output,
            domain_tagging,
        } => {
            options.fail_fast |= common.fail_fast;
            options.domain_tagging |= domain_tagging;
            let source = open_source(common.input.as_deref())?;
            let operation = build_operation(expr.as_deref(), fold.as_deref())?;

            let response = match output {
                Some(path) => transform_to_file(
                    &assembler,
                    &source,
                    Path::new(&path),
                    &kind,
                    &operation,
                    &options,
                )?,
                None => {
                    let out = stdout();
                    let response = assembler.run(|| {
                        ndjson_engine::transform(&source, out.lock(), &kind, &operation, &options)
                    });
                    if response.success {
                        println!();
                    }
                    response
                }
            };

            // Summary goes to stderr so stdout carries only transformed records
            let rendered = render(&response, compact)?;
            eprintln!("{}", rendered);
            response.success
        }
        Command::Analyze {
            common,
            kind,
            translate,
        } => {
            options.fail_fast |= common.fail_fast;
            options.framework_translation |= translate;
            let source = open_source(common.input.as_deref())?;
            emit(&assembler.run(|| ndjson_engine::analyze(&source, &kind, &options)), compact)?
        }
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "ndjson_engine=debug" } else { "ndjson_engine=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// The CLI pretty-prints unless an options file or `--compact` says otherwise
fn load_options(path: Option<&str>, compact: bool) -> Result<ProcessOptions> {
    let mut options = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read options file: {}", path))?;
            ProcessOptions::from_json(&text).context("Failed to parse options file")?
        }
        None => ProcessOptions {
            pretty: true,
            ..ProcessOptions::default()
        },
    };
    if compact {
        options.pretty = false;
    }
    Ok(options)
}

/// Files are streamed; stdin is buffered into memory first
fn open_source(input: Option<&str>) -> Result<Source> {
    match input {
        Some(path) => Ok(Source::path(path)),
        None => read_source(stdin().lock()),
    }
}

/// Raw bytes, so an invalid UTF-8 line stays a per-line error
fn read_source(mut reader: impl Read) -> Result<Source> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).context("Failed to read stdin")?;
    Ok(Source::bytes(bytes))
}

/// Transform into memory and replace `path` only when the call succeeds
fn transform_to_file(
    assembler: &Assembler,
    source: &Source,
    path: &Path,
    kind: &str,
    operation: &Operation,
    options: &ProcessOptions,
) -> Result<Response<TransformSummary>> {
    let mut buffer: Vec<u8> = Vec::new();
    let response = assembler.run(|| {
        ndjson_engine::transform(source, &mut buffer, kind, operation, options)
    });
    if response.success {
        std::fs::write(path, &buffer)
            .with_context(|| format!("Failed to write output file: {}", path.display()))?;
    }
    Ok(response)
}

fn build_operation(expr: Option<&str>, fold: Option<&str>) -> Result<Operation> {
    match (expr, fold) {
        (Some(text), _) => {
            let expr: Expr = serde_json::from_str(text).context("Failed to parse --expr")?;
            Ok(Operation::from(expr))
        }
        (None, Some(spec)) => Ok(Operation::from(parse_fold(spec)?)),
        (None, None) => bail!("Either --expr or --fold is required"),
    }
}

fn parse_fold(spec: &str) -> Result<FoldExpr> {
    match spec.split_once(':') {
        Some(("sum", field)) if !field.is_empty() => Ok(FoldExpr::Sum(field.to_string())),
        None if spec == "count" => Ok(FoldExpr::Count),
        None if spec == "merge" => Ok(FoldExpr::Merge),
        _ => bail!("Unknown fold '{}': expected count, merge or sum:FIELD", spec),
    }
}

/// KEY=VALUE pairs; values that parse as JSON are kept as JSON
fn parse_annotations(pairs: &[String]) -> Result<Map<String, Value>> {
    let mut annotations = Map::new();
    for pair in pairs {
        let Some((key, raw)) = pair.split_once('=') else {
            bail!("Annotation must be KEY=VALUE: {}", pair);
        };
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        annotations.insert(key.to_string(), value);
    }
    Ok(annotations)
}

fn render<T: Serialize>(response: &Response<T>, compact: bool) -> Result<String> {
    let text = if compact {
        serde_json::to_string(response)?
    } else {
        serde_json::to_string_pretty(response)?
    };
    Ok(text)
}

fn emit<T: Serialize>(response: &Response<T>, compact: bool) -> Result<bool> {
    let rendered = render(response, compact)?;
    let mut out = stdout().lock();
    writeln!(out, "{}", rendered)?;
    out.flush()?;
    Ok(response.success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_failed_transform_keeps_existing_output() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.jsonl");
        std::fs::write(&out, "PRECIOUS\n").unwrap();

        let source = Source::text("{\"a\":1}");
        let options = ProcessOptions::default();
        let op = Operation::from(Expr::Record);

        let assembler = Assembler::new();
        let response =
            transform_to_file(&assembler, &source, &out, "explode", &op, &options).unwrap();
        assert!(!response.success);
        assert_eq!(response.error.unwrap().kind, "UnknownTransform");
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "PRECIOUS\n");

        let missing = Source::path(dir.path().join("absent.jsonl"));
        let response = transform_to_file(&assembler, &missing, &out, "map", &op, &options).unwrap();
        assert_eq!(response.error.unwrap().kind, "SourceUnavailable");
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "PRECIOUS\n");

        let response = transform_to_file(&assembler, &source, &out, "map", &op, &options).unwrap();
        assert!(response.success);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn test_invalid_utf8_on_stdin_is_a_line_error() {
        let stdin = Cursor::new(b"{\"a\":1}\n\xff\xfe\n{\"b\":2}\n".to_vec());
        let source = read_source(stdin).unwrap();
        let result = ndjson_engine::parse(&source, &ProcessOptions::default()).unwrap();

        assert_eq!(result.valid_count, 2);
        assert_eq!(result.error_count, 1);
        let errors = result.errors.items().unwrap();
        assert_eq!(errors[0].line_number, 2);
        assert_eq!(errors[0].message, "Invalid UTF-8 in line");
    }

    #[test]
    fn test_compact_flag_only_overrides_when_given() {
        assert!(load_options(None, false).unwrap().pretty);
        assert!(!load_options(None, true).unwrap().pretty);

        let dir = tempdir().unwrap();
        let path = dir.path().join("options.json");
        std::fs::write(&path, r#"{"pretty": false, "failFast": true}"#).unwrap();
        let options = load_options(path.to_str(), false).unwrap();
        assert!(!options.pretty);
        assert!(options.fail_fast);

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"pretty": true}"#).unwrap();
        file.flush().unwrap();
        let path = file.path().to_str().unwrap();
        assert!(load_options(Some(path), false).unwrap().pretty);
        assert!(!load_options(Some(path), true).unwrap().pretty);
    }
}
