//! Coerced attribute values stored on model instances

use crate::instance::ModelRef;
use crate::schema::Coercion;
use crate::value::Value;
use chrono::{DateTime, TimeZone, Utc};
use std::fmt;

/// An enumerated token, e.g. an item status such as `backlog`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    /// Create a symbol from its token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Token text, without the leading colon
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A stored attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum Attr {
    /// Uncoerced value (undeclared field or no coercion declared)
    Value(Value),
    /// Enumerated token
    Symbol(Symbol),
    /// UTC timestamp
    Time(DateTime<Utc>),
    /// Coerced integer
    Integer(i64),
    /// Coerced float
    Float(f64),
    /// Coerced boolean
    Boolean(bool),
    /// Coerced text
    Text(String),
    /// Nested model instance
    Model(ModelRef),
    /// Elements coerced one by one
    List(Vec<Attr>),
}

impl Attr {
    /// Null reads as absent
    pub fn is_absent(&self) -> bool {
        matches!(self, Attr::Value(Value::Null))
    }

    /// Text of a `Text` attribute or of an uncoerced string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Attr::Text(s) => Some(s),
            Attr::Value(v) => v.as_str(),
            _ => None,
        }
    }

    /// Token of a `Symbol` attribute
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Attr::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Timestamp of a `Time` attribute
    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Attr::Time(t) => Some(*t),
            _ => None,
        }
    }

    /// Integer of an `Integer` attribute or of an uncoerced int
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Attr::Integer(i) => Some(*i),
            Attr::Value(v) => v.as_int(),
            _ => None,
        }
    }

    /// Float of a numeric attribute
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Attr::Float(f) => Some(*f),
            Attr::Integer(i) => Some(*i as f64),
            Attr::Value(v) => v.as_float(),
            _ => None,
        }
    }

    /// Boolean of a `Boolean` attribute or of an uncoerced bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Attr::Boolean(b) => Some(*b),
            Attr::Value(v) => v.as_bool(),
            _ => None,
        }
    }

    /// Handle of a nested model
    pub fn as_model(&self) -> Option<&ModelRef> {
        match self {
            Attr::Model(m) => Some(m),
            _ => None,
        }
    }

    /// Elements of a `List` attribute
    pub fn as_list(&self) -> Option<&[Attr]> {
        match self {
            Attr::List(items) => Some(items),
            _ => None,
        }
    }

    /// The raw value of an uncoerced attribute
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Attr::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Value> for Attr {
    fn from(value: Value) -> Self {
        Attr::Value(value)
    }
}

/// Convert `value` for a scalar coercion tag
///
/// Returns `None` when the value has no representation under `coercion`.
/// `Model` and `List` tags are resolved by the client and always yield `None`
/// here.
pub(crate) fn coerce_scalar(coercion: &Coercion, value: &Value) -> Option<Attr> {
    match (coercion, value) {
        (Coercion::Symbol, Value::String(s)) => Some(Attr::Symbol(Symbol::new(s.as_str()))),
        (Coercion::Symbol, Value::Bool(b)) => Some(Attr::Symbol(Symbol::new(b.to_string()))),

        (Coercion::Time, Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| Attr::Time(t.with_timezone(&Utc))),
        (Coercion::Time, Value::Int(secs)) => {
            Utc.timestamp_opt(*secs, 0).single().map(Attr::Time)
        }

        (Coercion::Integer, Value::Int(i)) => Some(Attr::Integer(*i)),
        (Coercion::Integer, Value::String(s)) => s.trim().parse().ok().map(Attr::Integer),

        (Coercion::Float, Value::Float(f)) => Some(Attr::Float(*f)),
        (Coercion::Float, Value::Int(i)) => Some(Attr::Float(*i as f64)),
        (Coercion::Float, Value::String(s)) => s.trim().parse().ok().map(Attr::Float),

        (Coercion::Boolean, Value::Bool(b)) => Some(Attr::Boolean(*b)),
        (Coercion::Boolean, Value::String(s)) => match s.as_str() {
            "true" => Some(Attr::Boolean(true)),
            "false" => Some(Attr::Boolean(false)),
            _ => None,
        },

        (Coercion::Text, Value::String(s)) => Some(Attr::Text(s.clone())),
        (Coercion::Text, Value::Int(i)) => Some(Attr::Text(i.to_string())),
        (Coercion::Text, Value::Float(f)) => Some(Attr::Text(f.to_string())),
        (Coercion::Text, Value::Bool(b)) => Some(Attr::Text(b.to_string())),

        _ => None,
    }
}
