//! Type descriptors and record schemas referenced by contracts

use serde::{Deserialize, Serialize};
use std::fmt;

/// Describes the type of a parameter, return value or record field
///
/// `Any` is an explicit annotation and is rendered literally; a parameter
/// with *no* descriptor at all is a different, looser case (see
/// [`crate::contract::Parameter`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeDescriptor {
    Int,
    Float,
    Bool,
    Str,
    Any,
    List(Box<TypeDescriptor>),
    Record(String),
}

impl fmt::Display for TypeDescriptor {
    /// Renders the descriptor in source-language syntax
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Int => write!(f, "int"),
            TypeDescriptor::Float => write!(f, "float"),
            TypeDescriptor::Bool => write!(f, "bool"),
            TypeDescriptor::Str => write!(f, "str"),
            TypeDescriptor::Any => write!(f, "any"),
            TypeDescriptor::List(inner) => write!(f, "list[{}]", inner),
            TypeDescriptor::Record(name) => write!(f, "{}", name),
        }
    }
}

/// One field of a record schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordField {
    name: String,
    ty: TypeDescriptor,
    description: Option<String>,
}

impl RecordField {
    /// Field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field type
    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    /// Free-text description carried into prompts, if any
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// A named structured type with an ordered field list
///
/// Schemas registered on a contract are seeded into the evaluation
/// namespace so generated code can construct them by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    name: String,
    fields: Vec<RecordField>,
}

impl RecordSchema {
    /// Create an empty schema with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field
    pub fn field(mut self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.fields.push(RecordField {
            name: name.into(),
            ty,
            description: None,
        });
        self
    }

    /// Append a field with a free-text description for the prompt
    pub fn field_described(
        mut self,
        name: impl Into<String>,
        ty: TypeDescriptor,
        description: impl Into<String>,
    ) -> Self {
        self.fields.push(RecordField {
            name: name.into(),
            ty,
            description: Some(description.into()),
        });
        self
    }

    /// Schema name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[RecordField] {
        &self.fields
    }

    /// Whether the schema declares a field with this name
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }
}

impl fmt::Display for RecordSchema {
    /// Renders the schema as a source-language declaration for prompts
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record {} {{ ", self.name)?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", field.name, field.ty)?;
        }
        write!(f, " }}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_rendering() {
        assert_eq!(TypeDescriptor::Int.to_string(), "int");
        assert_eq!(
            TypeDescriptor::List(Box::new(TypeDescriptor::Record("Point".to_string())))
                .to_string(),
            "list[Point]"
        );
        assert_eq!(TypeDescriptor::Any.to_string(), "any");
    }

    #[test]
    fn test_schema_rendering() {
        let schema = RecordSchema::new("Point")
            .field("x", TypeDescriptor::Int)
            .field("y", TypeDescriptor::Int);
        assert_eq!(schema.to_string(), "record Point { x: int, y: int }");
        assert!(schema.has_field("x"));
        assert!(!schema.has_field("z"));
    }

    #[test]
    fn test_field_descriptions_do_not_change_rendering() {
        let schema = RecordSchema::new("Point")
            .field_described("x", TypeDescriptor::Int, "horizontal coordinate")
            .field("y", TypeDescriptor::Int);
        assert_eq!(schema.to_string(), "record Point { x: int, y: int }");
        assert_eq!(
            schema.fields()[0].description(),
            Some("horizontal coordinate")
        );
        assert_eq!(schema.fields()[1].description(), None);
    }
}
