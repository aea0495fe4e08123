//! Runtime values of the expression language
//!
//! `Value` is also the currency of the public API: contract defaults,
//! call arguments and call results all use it.

use crate::contract::TypeDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A runtime value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// Absence of a value
    Nil,
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit float
    Float(f64),
    /// Boolean
    Bool(bool),
    /// UTF-8 string
    Str(String),
    /// Ordered list
    List(Vec<Value>),
    /// Instance of a registered record schema
    Record {
        /// Schema name
        schema: String,
        /// Field values, keyed by field name
        fields: BTreeMap<String, Value>,
    },
}

impl Value {
    /// Short type name used in error messages and prompts
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Record { .. } => "record",
        }
    }

    /// Whether this value is acceptable for the given type descriptor
    ///
    /// Ints are accepted where floats are expected; `Any` accepts
    /// everything.
    pub fn fits(&self, descriptor: &TypeDescriptor) -> bool {
        match (self, descriptor) {
            (_, TypeDescriptor::Any) => true,
            (Value::Int(_), TypeDescriptor::Int) => true,
            (Value::Int(_), TypeDescriptor::Float) => true,
            (Value::Float(_), TypeDescriptor::Float) => true,
            (Value::Bool(_), TypeDescriptor::Bool) => true,
            (Value::Str(_), TypeDescriptor::Str) => true,
            (Value::List(items), TypeDescriptor::List(inner)) => {
                items.iter().all(|item| item.fits(inner))
            }
            (Value::Record { schema, .. }, TypeDescriptor::Record(name)) => schema == name,
            (Value::Nil, _) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    /// Renders the value as a source-language literal, so defaults can be
    /// embedded verbatim in prompts and synthesized signatures
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => {
                if x.fract() == 0.0 && x.is_finite() {
                    write!(f, "{:.1}", x)
                } else {
                    write!(f, "{}", x)
                }
            }
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => {
                write!(f, "\"")?;
                for c in s.chars() {
                    match c {
                        '"' => write!(f, "\\\"")?,
                        '\\' => write!(f, "\\\\")?,
                        '\n' => write!(f, "\\n")?,
                        '\t' => write!(f, "\\t")?,
                        c => write!(f, "{}", c)?,
                    }
                }
                write!(f, "\"")
            }
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Record { schema, fields } => {
                write!(f, "{} {{ ", schema)?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                write!(f, " }}")
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_as_literals() {
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Str("a\"b".to_string()).to_string(), "\"a\\\"b\"");
        assert_eq!(
            Value::from(vec![1i64, 2, 3]).to_string(),
            "[1, 2, 3]"
        );
        assert_eq!(Value::Nil.to_string(), "nil");
    }

    #[test]
    fn test_fits_descriptor() {
        assert!(Value::Int(1).fits(&TypeDescriptor::Int));
        assert!(Value::Int(1).fits(&TypeDescriptor::Float));
        assert!(!Value::Float(1.0).fits(&TypeDescriptor::Int));
        assert!(Value::Str("x".into()).fits(&TypeDescriptor::Any));
        assert!(Value::from(vec![1i64])
            .fits(&TypeDescriptor::List(Box::new(TypeDescriptor::Int))));
        assert!(!Value::from(vec![1i64])
            .fits(&TypeDescriptor::List(Box::new(TypeDescriptor::Str))));
    }
}
