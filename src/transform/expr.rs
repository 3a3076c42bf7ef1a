//! Closed expression language for transform operations
//!
//! Expressions are plain data (deserializable from JSON) and are interpreted
//! here; nothing a caller sends is ever executed as code.
//!
//! ```text
//! {"eq": [{"field": "user.role"}, {"literal": "admin"}]}
//! {"and": [{"exists": "ts"}, {"gt": [{"field": "size"}, {"literal": 10}]}]}
//! {"pick": ["id", "name"]}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::cmp::Ordering;

/// A unary expression evaluated against one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    /// The whole record
    Record,
    /// Value at a dotted path (`a.b.0`), null when absent
    Field(String),
    Literal(Value),
    Eq(Box<Expr>, Box<Expr>),
    Ne(Box<Expr>, Box<Expr>),
    Gt(Box<Expr>, Box<Expr>),
    Lt(Box<Expr>, Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
    /// True when the dotted path resolves to a value
    Exists(String),
    /// Object holding only the listed top-level fields that are present
    Pick(Vec<String>),
}

impl Expr {
    pub fn field(path: impl Into<String>) -> Self {
        Expr::Field(path.into())
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn equals(left: Expr, right: Expr) -> Self {
        Expr::Eq(Box::new(left), Box::new(right))
    }

    pub fn eval(&self, record: &Value) -> Value {
        match self {
            Expr::Record => record.clone(),
            Expr::Field(path) => lookup(record, path).cloned().unwrap_or(Value::Null),
            Expr::Literal(value) => value.clone(),
            Expr::Eq(a, b) => Value::Bool(loose_eq(&a.eval(record), &b.eval(record))),
            Expr::Ne(a, b) => Value::Bool(!loose_eq(&a.eval(record), &b.eval(record))),
            Expr::Gt(a, b) => {
                Value::Bool(compare(&a.eval(record), &b.eval(record)) == Some(Ordering::Greater))
            }
            Expr::Lt(a, b) => {
                Value::Bool(compare(&a.eval(record), &b.eval(record)) == Some(Ordering::Less))
            }
            Expr::And(items) => Value::Bool(items.iter().all(|e| truthy(&e.eval(record)))),
            Expr::Or(items) => Value::Bool(items.iter().any(|e| truthy(&e.eval(record)))),
            Expr::Not(inner) => Value::Bool(!truthy(&inner.eval(record))),
            Expr::Exists(path) => Value::Bool(lookup(record, path).is_some()),
            Expr::Pick(fields) => {
                let mut picked = Map::new();
                if let Value::Object(obj) = record {
                    for field in fields {
                        if let Some(value) = obj.get(field) {
                            picked.insert(field.clone(), value.clone());
                        }
                    }
                }
                Value::Object(picked)
            }
        }
    }
}

/// Built-in folds for `reduce`, starting from an empty object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoldExpr {
    /// `{"count": n}`
    Count,
    /// `{"sum": s}` over the numeric values at a dotted path
    Sum(String),
    /// Shallow-merge each record's fields, later records winning
    Merge,
}

impl FoldExpr {
    pub fn step(&self, acc: Value, record: &Value) -> Value {
        let mut acc = match acc {
            Value::Object(obj) => obj,
            _ => Map::new(),
        };

        match self {
            FoldExpr::Count => {
                let count = acc.get("count").and_then(Value::as_u64).unwrap_or(0);
                acc.insert("count".to_string(), Value::from(count + 1));
            }
            FoldExpr::Sum(path) => {
                let current = match acc.get("sum") {
                    Some(Value::Number(n)) => n.clone(),
                    _ => Number::from(0),
                };
                let total = match lookup(record, path) {
                    Some(Value::Number(n)) => add_numbers(&current, n),
                    _ => current,
                };
                acc.insert("sum".to_string(), Value::Number(total));
            }
            FoldExpr::Merge => {
                if let Value::Object(obj) = record {
                    for (key, value) in obj {
                        acc.insert(key.clone(), value.clone());
                    }
                }
            }
        }

        Value::Object(acc)
    }
}

/// Resolve a dotted path; numeric segments index into arrays
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(obj) => obj.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// false, null, 0, NaN and "" are falsy; everything else is truthy
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Structural equality where `1` and `1.0` are the same number
fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Ordering for numbers and strings; other pairs are unordered
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn add_numbers(a: &Number, b: &Number) -> Number {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        if let Some(sum) = x.checked_add(y) {
            return Number::from(sum);
        }
    }
    let sum = a.as_f64().unwrap_or(0.0) + b.as_f64().unwrap_or(0.0);
    Number::from_f64(sum).unwrap_or_else(|| a.clone())
}
