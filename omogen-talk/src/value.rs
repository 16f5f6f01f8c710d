//! Normalized value tree for remote records
//!
//! Both response encodings and every local attribute end up as a [`Value`].
//! Nested remote objects are plain [`Value::Record`]s until the materializer
//! substitutes them with [`Value::Entity`].

use indexmap::IndexMap;

use crate::constants::{BOOL_FALSE, BOOL_TRUE};
use crate::entity::Entity;

/// An ordered attribute map, keyed by field name
pub type Record = IndexMap<String, Value>;

/// A value stored on the remote store
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Null/empty value
    #[default]
    Null,
    /// Boolean (remote `Oui` / `Non`)
    Bool(bool),
    /// Whole number
    Int(i64),
    /// Floating point
    Float(f64),
    /// Text value
    String(String),
    /// Ordered list of values
    List(Vec<Value>),
    /// Nested raw record
    Record(Record),
    /// Nested record resolved into a typed entity
    Entity(Box<Entity>),
}

/// Cast a remote boolean literal
pub fn bool_from_literal(literal: &str) -> Option<bool> {
    match literal {
        BOOL_TRUE => Some(true),
        BOOL_FALSE => Some(false),
        _ => None,
    }
}

/// Remote literal for a boolean
pub fn bool_to_literal(value: bool) -> &'static str {
    if value { BOOL_TRUE } else { BOOL_FALSE }
}

impl Value {
    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Try to get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get as bool, accepting the remote literals
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::String(s) => bool_from_literal(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Value::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    /// Replace remote boolean literals by [`Value::Bool`], leaving everything else
    pub fn cast_bool(self) -> Self {
        match self {
            Value::String(s) => match bool_from_literal(&s) {
                Some(b) => Value::Bool(b),
                None => Value::String(s),
            },
            other => other,
        }
    }

    /// Parse from JSON value
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Value::Float(f)
                } else {
                    Value::Null
                }
            }
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => Value::List(items.iter().map(Value::from_json).collect()),
            serde_json::Value::Object(map) => Value::Record(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert to JSON value for callers
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::json!(*i),
            Value::Float(f) => serde_json::json!(*f),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Record(record) => record_to_json(record),
            Value::Entity(entity) => entity.to_json(),
        }
    }

    /// Render as a form field value for a write
    ///
    /// Lists are flattened into a space-joined string in order and booleans
    /// use the remote literals. A nested entity is sent by identifier.
    pub fn to_wire(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => bool_to_literal(*b).to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::List(items) => items
                .iter()
                .map(Value::to_wire)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
            Value::Record(record) => record_to_json(record).to_string(),
            Value::Entity(entity) => entity.id().unwrap_or_default().to_string(),
        }
    }
}

pub(crate) fn record_to_json(record: &Record) -> serde_json::Value {
    serde_json::Value::Object(
        record
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect(),
    )
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "(null)"),
            Value::Entity(entity) => write!(
                f,
                "{}({})",
                entity.descriptor().class_name,
                entity.id().unwrap_or("?")
            ),
            Value::Record(_) => write!(f, "{}", self.to_json()),
            other => write!(f, "{}", other.to_wire()),
        }
    }
}
