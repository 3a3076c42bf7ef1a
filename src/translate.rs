//! Vocabulary rewrites
//!
//! Purely cosmetic word substitution applied to already-rendered text. Nothing in
//! the parser or analyzer depends on it.

use once_cell::sync::Lazy;
use regex::Regex;

/// Ordered (pattern, replacement) pairs; patterns match case-insensitively
pub struct Vocabulary {
    rules: Vec<(Regex, &'static str)>,
}

impl Vocabulary {
    fn new(pairs: &[(&str, &'static str)]) -> Self {
        let rules = pairs
            .iter()
            .map(|(word, replacement)| {
                let pattern = format!("(?i){}", regex::escape(word));
                (Regex::new(&pattern).unwrap(), *replacement)
            })
            .collect();
        Vocabulary { rules }
    }

    pub fn rewrite(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_string(), |acc, (pattern, replacement)| {
                pattern.replace_all(&acc, *replacement).into_owned()
            })
    }
}

/// Terms used for analysis summaries
pub static FRAMEWORK_TERMS: Lazy<Vocabulary> = Lazy::new(|| {
    Vocabulary::new(&[
        ("error", "issue detected"),
        ("warning", "attention required"),
        ("successful", "completed"),
        ("failed", "blocked"),
    ])
});

/// Terms used for per-line parse error messages
pub static ERROR_TERMS: Lazy<Vocabulary> = Lazy::new(|| {
    Vocabulary::new(&[
        ("error", "ISSUE"),
        ("failed", "BLOCKED"),
        ("invalid", "INCORRECT"),
        ("cannot", "UNABLE"),
    ])
});

pub fn framework_translation(text: &str) -> String {
    FRAMEWORK_TERMS.rewrite(text)
}

pub fn error_vocabulary(text: &str) -> String {
    ERROR_TERMS.rewrite(text)
}
