use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Maximum number of characters of a malformed line kept in a [`ParseError`]
pub const PREVIEW_CHARS: usize = 50;

/// One decoded line of the stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// 1-based position of the line in the source
    pub line_number: usize,

    /// The decoded JSON value
    #[serde(rename = "record")]
    pub value: Value,
}

impl Record {
    pub fn new(line_number: usize, value: Value) -> Self {
        Record { line_number, value }
    }

    /// Field map of the record, if it is a JSON object
    pub fn fields(&self) -> Option<&Map<String, Value>> {
        self.value.as_object()
    }

    /// Field names in record order; non-object records have none
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields()
            .into_iter()
            .flat_map(|obj| obj.keys().map(String::as_str))
    }

    pub fn field_count(&self) -> usize {
        self.fields().map_or(0, Map::len)
    }
}

/// A line that could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    pub line_number: usize,

    /// Preview of the original line, truncated for display
    pub raw_content: String,

    pub message: String,
}

impl ParseError {
    pub fn new(line_number: usize, raw: &str, message: impl Into<String>) -> Self {
        ParseError {
            line_number,
            raw_content: preview(raw),
            message: message.into(),
        }
    }
}

/// Truncate a line to [`PREVIEW_CHARS`] characters, marking the cut with `...`
pub fn preview(raw: &str) -> String {
    match raw.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &raw[..cut]),
        None => raw.to_string(),
    }
}

/// Type identifier for JSON values.
///
/// Integers and floats are both `number`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    String,
    Number,
    Boolean,
    Object,
    Array,
    Null,
}

impl JsonType {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => JsonType::Null,
            Value::Bool(_) => JsonType::Boolean,
            Value::Number(_) => JsonType::Number,
            Value::String(_) => JsonType::String,
            Value::Array(_) => JsonType::Array,
            Value::Object(_) => JsonType::Object,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JsonType::String => "string",
            JsonType::Number => "number",
            JsonType::Boolean => "boolean",
            JsonType::Object => "object",
            JsonType::Array => "array",
            JsonType::Null => "null",
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
