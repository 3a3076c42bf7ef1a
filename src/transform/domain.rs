//! Domain tagging
//!
//! Attaches a cosmetic `_domain` label to transform output. The label choice goes
//! through [`LabelPicker`] so callers can swap the thread RNG for a fixed sequence.

use rand::rngs::ThreadRng;
use rand::Rng;
use serde_json::Value;

pub const DOMAIN_FIELD: &str = "_domain";

pub const DOMAINS: [&str; 9] = [
    "music",
    "science",
    "philosophy",
    "art",
    "technology",
    "history",
    "psychology",
    "literature",
    "mathematics",
];

/// Chooses an index in `0..len`; out-of-range picks wrap around
pub trait LabelPicker {
    fn pick(&mut self, len: usize) -> usize;
}

/// Uniform picks from any `rand` generator; unseeded by default
pub struct RandomPicker<R: Rng = ThreadRng> {
    rng: R,
}

impl RandomPicker<ThreadRng> {
    pub fn new() -> Self {
        RandomPicker {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for RandomPicker<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RandomPicker<R> {
    pub fn with_rng(rng: R) -> Self {
        RandomPicker { rng }
    }
}

impl<R: Rng> LabelPicker for RandomPicker<R> {
    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Replays a fixed list of picks, cycling when exhausted
#[derive(Debug, Clone)]
pub struct SequencePicker {
    picks: Vec<usize>,
    position: usize,
}

impl SequencePicker {
    pub fn new(picks: Vec<usize>) -> Self {
        SequencePicker { picks, position: 0 }
    }
}

impl LabelPicker for SequencePicker {
    fn pick(&mut self, len: usize) -> usize {
        if self.picks.is_empty() {
            return 0;
        }
        let pick = self.picks[self.position % self.picks.len()];
        self.position += 1;
        pick % len
    }
}

/// Label one value. Only objects are tagged; other values pass through.
pub fn tag_value(value: Value, picker: &mut dyn LabelPicker) -> Value {
    match value {
        Value::Object(mut obj) => {
            let label = DOMAINS[picker.pick(DOMAINS.len()) % DOMAINS.len()];
            obj.insert(DOMAIN_FIELD.to_string(), Value::String(label.to_string()));
            Value::Object(obj)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    #[test]
    fn test_fixed_sequence() {
        let mut picker = SequencePicker::new(vec![0, 2]);
        assert_eq!(tag_value(json!({"a": 1}), &mut picker), json!({"a": 1, "_domain": "music"}));
        assert_eq!(tag_value(json!({}), &mut picker), json!({"_domain": "philosophy"}));
        assert_eq!(tag_value(json!({}), &mut picker), json!({"_domain": "music"}));
    }

    #[test]
    fn test_non_objects_pass_through() {
        let mut picker = SequencePicker::new(vec![1]);
        assert_eq!(tag_value(json!(42), &mut picker), json!(42));
        assert_eq!(tag_value(json!([1]), &mut picker), json!([1]));
    }

    struct Overshoot;

    impl LabelPicker for Overshoot {
        fn pick(&mut self, len: usize) -> usize {
            len + 2
        }
    }

    #[test]
    fn test_out_of_range_pick_wraps() {
        assert_eq!(tag_value(json!({}), &mut Overshoot), json!({"_domain": "philosophy"}));
    }

    #[test]
    fn test_random_labels_are_known() {
        let mut picker = RandomPicker::with_rng(StdRng::seed_from_u64(7));
        for _ in 0..50 {
            let tagged = tag_value(json!({}), &mut picker);
            let label = tagged[DOMAIN_FIELD].as_str().unwrap();
            assert!(DOMAINS.contains(&label));
        }
    }
}
