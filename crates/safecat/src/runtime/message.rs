//! Message arguments and return values.

use crate::runtime::class::{Class, MethodKind};
use crate::runtime::registry::Runtime;
use crate::runtime::selector::Selector;
use std::fmt;

/// Value passed to or returned from a method.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    /// No value (`void` return).
    #[default]
    Nil,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Owned string.
    Str(String),
}

impl Value {
    /// Returns the string payload, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer payload, if any.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

/// Everything a method body sees when it is invoked.
///
/// `receiver` is the class the message was sent to, which may be a
/// subclass of the class that provides the method.
pub struct Message<'a> {
    /// Runtime the message was sent through.
    pub runtime: &'a Runtime,
    /// Receiving class.
    pub receiver: Class,
    /// Namespace the method was found in.
    pub kind: MethodKind,
    /// The selector that was sent (`_cmd`).
    pub selector: &'a Selector,
    /// Message arguments.
    pub args: &'a [Value],
}

impl Message<'_> {
    /// Returns argument `index`, or `Value::Nil` if absent.
    #[must_use]
    pub fn arg(&self, index: usize) -> Value {
        self.args.get(index).cloned().unwrap_or_default()
    }
}
