//! The weakly-typed value model shared by node metadata, attributes, and the
//! custom-data side channel.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Accepts two `f64` expressions and returns whether they're equal. This
/// accounts for NaN such that `number_eq!(f64::NAN, f64::NAN)` is `true`.
macro_rules! number_eq {
    ($a:expr, $b:expr) => {
        float_cmp::approx_eq!(f64, $a, $b) || $a.is_nan() && $b.is_nan()
    };
}

/// Any value that can be attached to a node: a metadata entry, an attribute's
/// current value, or an entry in the custom-data channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    String(String),
    Number(f64),
    Bool(bool),

    /// A fixed-arity tuple of numbers, like a translation or a color.
    Vector(Vec<f64>),

    List(Vec<Value>),
    Map(BTreeMap<String, Value>),

    /// A value that arrived without a schema registration. This is a
    /// transport artifact: it must be unwrapped before being stored or
    /// compared and is never a terminal value.
    Unregistered(Box<Value>),
}

impl Value {
    /// Strips one level of `Unregistered` wrapping. Idempotent on values that
    /// are already unwrapped.
    pub fn unwrap_unregistered(self) -> Value {
        match self {
            Value::Unregistered(inner) => *inner,
            other => other,
        }
    }

    /// Whether this value counts as "present" for the attribute-copy rule.
    /// Empty strings, zero numbers, `false`, and empty collections are all
    /// falsy; a wrapper defers to its inner value.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::String(value) => !value.is_empty(),
            Value::Number(value) => *value != 0.0,
            Value::Bool(value) => *value,
            Value::Vector(value) => !value.is_empty(),
            Value::List(value) => !value.is_empty(),
            Value::Map(value) => !value.is_empty(),
            Value::Unregistered(inner) => inner.is_truthy(),
        }
    }
}

/// Compares two values structurally, taking float comparisons into account.
///
/// `Unregistered` wrappers are transparent here: a wrapped value is equal to
/// its unwrapped counterpart, and two wrappers are equal iff their inner
/// values are.
pub fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Unregistered(inner), _) => value_eq(inner, b),
        (_, Value::Unregistered(inner)) => value_eq(a, inner),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => number_eq!(*a, *b),
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Vector(a), Value::Vector(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| number_eq!(*x, *y))
        }
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| value_eq(x, y))
        }
        (Value::Map(a), Value::Map(b)) => {
            a.len() == b.len()
                && a.iter().zip(b).all(|((ka, va), (kb, vb))| ka == kb && value_eq(va, vb))
        }
        _ => false,
    }
}
