//! Member values and declared value types

use serde::{Deserialize, Serialize};
use std::fmt;

/// A member value as read from or written to an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Absent value
    Null,
    /// 64-bit integer
    Integer(i64),
    /// Single precision float
    Float(f32),
    /// Double precision float
    Double(f64),
    /// Free text
    Text(String),
    /// Enumeration constant, by name
    Enum(String),
    /// Identifier of a linked entity
    Reference(String),
}

impl Value {
    /// Returns true if the value is absent
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Tries to get as integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Tries to get as text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Tries to get as enumeration constant name
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            Value::Enum(v) => Some(v.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Text(v) | Value::Enum(v) | Value::Reference(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<Option<i64>> for Value {
    fn from(v: Option<i64>) -> Self {
        v.map_or(Value::Null, Value::Integer)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// Ordered constant names of an enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumConstants(Vec<String>);

impl EnumConstants {
    /// Creates a constant list in declaration order
    pub fn new<I, S>(constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(constants.into_iter().map(Into::into).collect())
    }

    /// Returns the constants in declaration order
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Returns true if `name` is one of the constants
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|c| c == name)
    }

    /// Position of a constant
    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|c| c == name)
    }
}

/// Declared type of an entity member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    /// 64-bit integer
    Integer,
    /// Single precision float
    Float,
    /// Double precision float
    Double,
    /// Text
    Text,
    /// Enumeration with its constants
    Enumeration(EnumConstants),
    /// To-one relation to another entity type
    Relation { target: String },
    /// Value computed by a derived-value provider
    Derived,
    /// Any other declared type, by name
    Other(String),
}

impl ValueType {
    /// Creates an enumeration type from constant names
    pub fn enumeration<I, S>(constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ValueType::Enumeration(EnumConstants::new(constants))
    }

    /// Creates a to-one relation type
    pub fn relation(target: impl Into<String>) -> Self {
        ValueType::Relation {
            target: target.into(),
        }
    }

    /// Creates an unregistered type by name
    pub fn other(type_name: impl Into<String>) -> Self {
        ValueType::Other(type_name.into())
    }

    /// Dispatch key used by widget registration tables
    pub fn key(&self) -> ValueTypeKey {
        match self {
            ValueType::Integer => ValueTypeKey::Integer,
            ValueType::Float => ValueTypeKey::Float,
            ValueType::Double => ValueTypeKey::Double,
            ValueType::Text => ValueTypeKey::Text,
            ValueType::Enumeration(_) => ValueTypeKey::Enumeration,
            ValueType::Relation { .. } => ValueTypeKey::Relation,
            ValueType::Derived => ValueTypeKey::Derived,
            ValueType::Other(name) => ValueTypeKey::Other(name.clone()),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Integer => write!(f, "Integer"),
            ValueType::Float => write!(f, "Float"),
            ValueType::Double => write!(f, "Double"),
            ValueType::Text => write!(f, "Text"),
            ValueType::Enumeration(_) => write!(f, "Enumeration"),
            ValueType::Relation { target } => write!(f, "Relation<{}>", target),
            ValueType::Derived => write!(f, "Derived"),
            ValueType::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Registration key for a value type
///
/// Enumerations and relations dispatch on their variant, not on their payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueTypeKey {
    /// [`ValueType::Integer`]
    Integer,
    /// [`ValueType::Float`]
    Float,
    /// [`ValueType::Double`]
    Double,
    /// [`ValueType::Text`]
    Text,
    /// Any [`ValueType::Enumeration`]
    Enumeration,
    /// Any [`ValueType::Relation`]
    Relation,
    /// [`ValueType::Derived`]
    Derived,
    /// [`ValueType::Other`], by type name
    Other(String),
}
