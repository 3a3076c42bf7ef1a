use serde::{Deserialize, Serialize};

/// Options recognized by every entry point.
///
/// Deserializes from the collaborator options object (`failFast`, `includeRecords`, ...).
/// Missing keys take their defaults and unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessOptions {
    /// Stop at the first malformed line and report it as the only outcome
    pub fail_fast: bool,

    /// Return decoded records instead of just their count
    pub include_records: bool,

    /// Return the per-line error list instead of just its length
    pub include_errors: bool,

    /// Attach a random `_domain` label to transform output
    pub domain_tagging: bool,

    /// Apply the vocabulary rewrite to error messages and analysis summaries
    pub framework_translation: bool,

    /// Pretty-print single JSON documents (reduce output)
    pub pretty: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        ProcessOptions {
            fail_fast: false,
            include_records: false,
            include_errors: true,
            domain_tagging: false,
            framework_translation: false,
            pretty: false,
        }
    }
}

impl ProcessOptions {
    /// Parse options from a JSON document, as collaborators send them
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ProcessOptions::default();
        assert!(!options.fail_fast);
        assert!(!options.include_records);
        assert!(options.include_errors);
    }

    #[test]
    fn test_camel_case_keys() {
        let options =
            ProcessOptions::from_json(r#"{"failFast": true, "includeRecords": true, "other": 1}"#)
                .unwrap();
        assert!(options.fail_fast);
        assert!(options.include_records);
        assert!(options.include_errors);
        assert!(!options.domain_tagging);
    }
}
