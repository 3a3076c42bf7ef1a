//! Transform engine
//!
//! Applies filter, map, reduce or aggregate over a decoded record sequence.
//! Operations are either closed [`Expr`]/[`FoldExpr`] data or caller closures;
//! the engine never evaluates caller text as code.

pub mod domain;
pub mod expr;
pub mod writer;

pub use domain::{tag_value, LabelPicker, RandomPicker, SequencePicker, DOMAINS, DOMAIN_FIELD};
pub use expr::{truthy, Expr, FoldExpr};
pub use writer::NdjsonWriter;

use crate::error::{EngineError, Result};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKind {
    Filter,
    Map,
    Reduce,
    Aggregate,
}

impl TransformKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransformKind::Filter => "filter",
            TransformKind::Map => "map",
            TransformKind::Reduce => "reduce",
            TransformKind::Aggregate => "aggregate",
        }
    }
}

impl FromStr for TransformKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "filter" => Ok(TransformKind::Filter),
            "map" => Ok(TransformKind::Map),
            "reduce" => Ok(TransformKind::Reduce),
            "aggregate" => Ok(TransformKind::Aggregate),
            other => Err(EngineError::UnknownTransform(other.to_string())),
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type UnaryFn = Box<dyn Fn(&Value) -> Value>;
type FoldFn = Box<dyn Fn(Value, &Value) -> Value>;

/// The caller-supplied callable of a transform.
///
/// filter, map and aggregate take a unary operation (predicate, mapping, key);
/// reduce takes a fold.
pub enum Operation {
    Expr(Expr),
    Fold(FoldExpr),
    Func(UnaryFn),
    FoldFunc(FoldFn),
}

impl Operation {
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Value + 'static,
    {
        Operation::Func(Box::new(f))
    }

    pub fn fold_func<F>(f: F) -> Self
    where
        F: Fn(Value, &Value) -> Value + 'static,
    {
        Operation::FoldFunc(Box::new(f))
    }

    fn is_fold(&self) -> bool {
        matches!(self, Operation::Fold(_) | Operation::FoldFunc(_))
    }

    fn check(&self, kind: TransformKind) -> Result<()> {
        let wants_fold = kind == TransformKind::Reduce;
        if wants_fold == self.is_fold() {
            return Ok(());
        }
        Err(EngineError::OperationMismatch {
            kind: kind.to_string(),
            expected: if wants_fold { "fold" } else { "unary" },
        })
    }

    fn call(&self, record: &Value) -> Value {
        match self {
            Operation::Expr(expr) => expr.eval(record),
            Operation::Func(f) => f(record),
            Operation::Fold(_) | Operation::FoldFunc(_) => Value::Null,
        }
    }

    fn step(&self, acc: Value, record: &Value) -> Value {
        match self {
            Operation::Fold(fold) => fold.step(acc, record),
            Operation::FoldFunc(f) => f(acc, record),
            Operation::Expr(_) | Operation::Func(_) => acc,
        }
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Expr(expr) => f.debug_tuple("Expr").field(expr).finish(),
            Operation::Fold(fold) => f.debug_tuple("Fold").field(fold).finish(),
            Operation::Func(_) => f.write_str("Func(..)"),
            Operation::FoldFunc(_) => f.write_str("FoldFunc(..)"),
        }
    }
}

impl From<Expr> for Operation {
    fn from(expr: Expr) -> Self {
        Operation::Expr(expr)
    }
}

impl From<FoldExpr> for Operation {
    fn from(fold: FoldExpr) -> Self {
        Operation::Fold(fold)
    }
}

/// Result of a transform: a record sequence, or one document for reduce
#[derive(Debug, Clone, PartialEq)]
pub enum TransformOutput {
    Sequence(Vec<Value>),
    Document(Value),
}

impl TransformOutput {
    pub fn len(&self) -> usize {
        match self {
            TransformOutput::Sequence(values) => values.len(),
            TransformOutput::Document(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attach a domain label to every object in the output
    pub fn tag_domains(self, picker: &mut dyn LabelPicker) -> Self {
        match self {
            TransformOutput::Sequence(values) => TransformOutput::Sequence(
                values.into_iter().map(|v| tag_value(v, picker)).collect(),
            ),
            TransformOutput::Document(value) => TransformOutput::Document(tag_value(value, picker)),
        }
    }
}

/// Apply a transform over the full record sequence
pub fn apply(
    kind: TransformKind,
    operation: &Operation,
    records: Vec<Value>,
) -> Result<TransformOutput> {
    operation.check(kind)?;

    let output = match kind {
        TransformKind::Filter => TransformOutput::Sequence(
            records
                .into_iter()
                .filter(|record| truthy(&operation.call(record)))
                .collect(),
        ),
        TransformKind::Map => TransformOutput::Sequence(
            records
                .iter()
                .map(|record| operation.call(record))
                .collect(),
        ),
        TransformKind::Reduce => TransformOutput::Document(
            records
                .iter()
                .fold(Value::Object(Map::new()), |acc, record| operation.step(acc, record)),
        ),
        TransformKind::Aggregate => TransformOutput::Sequence(aggregate(operation, records)),
    };

    Ok(output)
}

/// Group by key, emitting `{group, count, records}` in first-seen key order
fn aggregate(operation: &Operation, records: Vec<Value>) -> Vec<Value> {
    let mut groups: Vec<(String, Vec<Value>)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for record in records {
        let key = group_key(&operation.call(&record));
        match positions.get(&key) {
            Some(&index) => groups[index].1.push(record),
            None => {
                positions.insert(key.clone(), groups.len());
                groups.push((key, vec![record]));
            }
        }
    }

    groups
        .into_iter()
        .map(|(group, members)| {
            json!({
                "group": group,
                "count": members.len(),
                "records": members,
            })
        })
        .collect()
}

/// Strings group verbatim; any other key by its compact JSON text
fn group_key(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
