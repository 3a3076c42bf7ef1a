//! Record parser
//!
//! Decodes each non-blank line as strict JSON. Malformed lines become
//! [`ParseError`] entries and parsing carries on, unless fail-fast was requested.

use crate::error::{EngineError, Result};
use crate::reader::{LineReader, RawLine, Source};
use crate::translate;
use crate::types::{ParseError, Record};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::io::BufRead;
use tracing::{debug, warn};

static LOCATION_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+at line \d+ column \d+$").unwrap());

/// Outcome of decoding a single line
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    Record(Record),
    Error(ParseError),
}

/// Streaming decoder over a [`LineReader`]; blank lines are skipped silently
pub struct RecordParser<R: BufRead> {
    lines: LineReader<R>,
    translate_errors: bool,
}

impl<R: BufRead> RecordParser<R> {
    pub fn new(lines: LineReader<R>) -> Self {
        RecordParser {
            lines,
            translate_errors: false,
        }
    }

    /// Rewrite error messages with the error vocabulary
    pub fn with_error_vocabulary(mut self, enabled: bool) -> Self {
        self.translate_errors = enabled;
        self
    }

    /// Lines consumed so far, blank ones included
    pub fn total_lines(&self) -> usize {
        self.lines.lines_read()
    }

    fn decode(&self, line: RawLine) -> ParsedLine {
        let error = if !line.valid_utf8 {
            ParseError::new(line.number, &line.content, "Invalid UTF-8 in line")
        } else {
            match serde_json::from_str::<Value>(&line.content) {
                Ok(value) => return ParsedLine::Record(Record::new(line.number, value)),
                Err(e) => ParseError::new(line.number, &line.content, normalize_message(&e)),
            }
        };

        let error = if self.translate_errors {
            ParseError {
                message: translate::error_vocabulary(&error.message),
                ..error
            }
        } else {
            error
        };
        debug!(line = error.line_number, message = %error.message, "Skipping malformed line");
        ParsedLine::Error(error)
    }
}

impl<R: BufRead> Iterator for RecordParser<R> {
    type Item = Result<ParsedLine>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            };
            if line.is_blank() {
                continue;
            }
            return Some(Ok(self.decode(line)));
        }
    }
}

/// Turn a decoder message into the form shown to users:
/// capitalized, with the column instead of the (always 1) line position.
pub fn normalize_message(err: &serde_json::Error) -> String {
    let raw = err.to_string();
    let stripped = LOCATION_SUFFIX.replace(&raw, "");
    let mut chars = stripped.chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::from("Malformed JSON"),
    };
    format!("{} at column {}", capitalized, err.column())
}

/// Decoded records and accumulated errors of one pass over a source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    pub records: Vec<Record>,
    pub errors: Vec<ParseError>,
    pub total_lines: usize,
}

impl ParseOutcome {
    pub fn valid_count(&self) -> usize {
        self.records.len()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// `valid / (valid + errors)`, or 1.0 when nothing was decoded
    pub fn success_rate(&self) -> f64 {
        let attempted = self.valid_count() + self.error_count();
        if attempted == 0 {
            1.0
        } else {
            self.valid_count() as f64 / attempted as f64
        }
    }

    /// Record values in stream order
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.records.iter().map(|r| &r.value)
    }
}

/// Parse a whole source into memory.
///
/// With `fail_fast`, the first malformed line aborts with [`EngineError::Decode`].
pub fn parse_source(
    source: &Source,
    fail_fast: bool,
    translate_errors: bool,
) -> Result<ParseOutcome> {
    let mut parser = RecordParser::new(source.lines()?).with_error_vocabulary(translate_errors);
    let mut outcome = ParseOutcome::default();

    for parsed in parser.by_ref() {
        match parsed? {
            ParsedLine::Record(record) => outcome.records.push(record),
            ParsedLine::Error(error) if fail_fast => {
                warn!(
                    source = %source.describe(),
                    line = error.line_number,
                    "Aborting on first malformed line"
                );
                return Err(EngineError::Decode {
                    line_number: error.line_number,
                    message: error.message,
                });
            }
            ParsedLine::Error(error) => outcome.errors.push(error),
        }
    }

    outcome.total_lines = parser.total_lines();
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_well_formed_stream() {
        let source = Source::text("{\"a\":1}\n{\"b\":2}\n[1,2]\n");
        let outcome = parse_source(&source, false, false).unwrap();
        assert_eq!(outcome.valid_count(), 3);
        assert_eq!(outcome.error_count(), 0);
        assert_eq!(outcome.total_lines, 3);
        assert_eq!(outcome.records[2].value, json!([1, 2]));
    }

    #[test]
    fn test_malformed_line_is_recorded() {
        let source = Source::text("{\"a\":1}\nbad\n{\"b\":2}");
        let outcome = parse_source(&source, false, false).unwrap();
        assert_eq!(outcome.valid_count(), 2);
        assert_eq!(outcome.error_count(), 1);
        assert_eq!(outcome.errors[0].line_number, 2);
        assert_eq!(outcome.errors[0].raw_content, "bad");
        assert_eq!(outcome.errors[0].message, "Expected value at column 1");
        assert_eq!(outcome.records[1].line_number, 3);
    }

    #[test]
    fn test_blank_lines_are_not_counted() {
        let outcome = parse_source(&Source::text("\n   \n{\"a\":1}\n\t\n"), false, false).unwrap();
        assert_eq!(outcome.total_lines, 4);
        assert_eq!(outcome.valid_count() + outcome.error_count(), 1);
        assert_eq!(outcome.records[0].line_number, 3);
    }

    #[test]
    fn test_error_line_numbers_increase() {
        let outcome = parse_source(&Source::text("x\n{}\ny\n\nz"), false, false).unwrap();
        let numbers: Vec<usize> = outcome.errors.iter().map(|e| e.line_number).collect();
        assert_eq!(numbers, vec![1, 3, 5]);
    }

    #[test]
    fn test_strict_json_only() {
        let source = Source::text("{\"a\":1,}\n// note\n{'a':1}");
        let outcome = parse_source(&source, false, false).unwrap();
        assert_eq!(outcome.error_count(), 3);
    }

    #[test]
    fn test_fail_fast_stops_at_first_error() {
        let err = parse_source(&Source::text("{}\nnope\nalso bad"), true, false).unwrap_err();
        match err {
            EngineError::Decode { line_number, .. } => assert_eq!(line_number, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_error_vocabulary() {
        let outcome = parse_source(&Source::text(r#"{"a":"\q"}"#), false, true).unwrap();
        let message = &outcome.errors[0].message;
        assert!(message.starts_with("INCORRECT escape"), "{message}");
    }

    #[test]
    fn test_success_rate() {
        assert_eq!(ParseOutcome::default().success_rate(), 1.0);
        let outcome = parse_source(&Source::text("{}\nbad\n{}\n{}"), false, false).unwrap();
        assert_eq!(outcome.success_rate(), 0.75);
    }

    #[test]
    fn test_reparse_is_structurally_equal() {
        let source = Source::text(r#"{"a":[1,2.5,{"b":null}],"c":"é"}"#);
        let outcome = parse_source(&source, false, false).unwrap();
        let original = &outcome.records[0].value;
        let text = serde_json::to_string(original).unwrap();
        let again: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(&again, original);
    }
}
