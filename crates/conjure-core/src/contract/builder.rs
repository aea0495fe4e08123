//! Contract construction and validation
//!
//! Building a contract is the extraction step of the pipeline: it turns
//! the caller's declared interface into a validated [`FunctionContract`],
//! resolving forward-referenced record types into concrete schemas. It is
//! deterministic and has no side effects; failure is a fatal
//! [`ExtractionError`] that is never retried.

use super::types::{RecordSchema, TypeDescriptor};
use super::{FunctionContract, Parameter};
use crate::error::ExtractionError;
use crate::expr::token::is_identifier;
use crate::expr::Value;

/// Builder for [`FunctionContract`]
#[derive(Debug, Clone)]
pub struct ContractBuilder {
    name: String,
    parameters: Vec<Parameter>,
    return_type: Option<TypeDescriptor>,
    return_description: Option<String>,
    docstring: Option<String>,
    records: Vec<RecordSchema>,
}

impl ContractBuilder {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type: None,
            return_description: None,
            docstring: None,
            records: Vec::new(),
        }
    }

    /// Add an annotated parameter
    pub fn parameter(mut self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.parameters.push(Parameter::new(name).typed(ty));
        self
    }

    /// Add a parameter with no type annotation
    pub fn parameter_untyped(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(Parameter::new(name));
        self
    }

    /// Add an annotated parameter carrying a default value
    pub fn parameter_with_default(
        mut self,
        name: impl Into<String>,
        ty: TypeDescriptor,
        default: Value,
    ) -> Self {
        self.parameters
            .push(Parameter::new(name).typed(ty).with_default(default));
        self
    }

    /// Add an annotated parameter with a free-text description
    pub fn parameter_described(
        mut self,
        name: impl Into<String>,
        ty: TypeDescriptor,
        description: impl Into<String>,
    ) -> Self {
        self.parameters
            .push(Parameter::new(name).typed(ty).described(description));
        self
    }

    /// Add a fully specified parameter; covers combinations the
    /// convenience methods do not, e.g. a described default
    pub fn push_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Declare the return type
    pub fn returns(mut self, ty: TypeDescriptor) -> Self {
        self.return_type = Some(ty);
        self
    }

    /// Declare the return type with a free-text description
    pub fn returns_described(
        mut self,
        ty: TypeDescriptor,
        description: impl Into<String>,
    ) -> Self {
        self.return_type = Some(ty);
        self.return_description = Some(description.into());
        self
    }

    /// Attach the behavioral specification text
    pub fn docstring(mut self, text: impl Into<String>) -> Self {
        self.docstring = Some(text.into());
        self
    }

    /// Register a record schema that annotations may reference
    pub fn record(mut self, schema: RecordSchema) -> Self {
        self.records.push(schema);
        self
    }

    /// Validate and build the contract
    pub fn build(self) -> Result<FunctionContract, ExtractionError> {
        if !is_identifier(&self.name) {
            return Err(ExtractionError::InvalidName(self.name));
        }

        for schema in &self.records {
            if !is_identifier(schema.name()) {
                return Err(ExtractionError::InvalidName(schema.name().to_string()));
            }
        }

        let mut seen_default = false;
        for (i, param) in self.parameters.iter().enumerate() {
            if !is_identifier(&param.name) {
                return Err(ExtractionError::InvalidParameterName {
                    function: self.name,
                    parameter: param.name.clone(),
                });
            }
            if self.parameters[..i].iter().any(|p| p.name == param.name) {
                return Err(ExtractionError::DuplicateParameter {
                    function: self.name,
                    parameter: param.name.clone(),
                });
            }
            match &param.default {
                Some(default) => {
                    seen_default = true;
                    if let Some(ty) = &param.ty {
                        if !default.fits(ty) {
                            return Err(ExtractionError::DefaultTypeMismatch {
                                function: self.name,
                                parameter: param.name.clone(),
                                expected: ty.to_string(),
                                actual: default.type_name().to_string(),
                            });
                        }
                    }
                }
                None => {
                    if seen_default {
                        return Err(ExtractionError::DefaultOrdering {
                            function: self.name,
                            parameter: param.name.clone(),
                        });
                    }
                }
            }
        }

        let referenced_types = self.resolve_referenced_types()?;

        Ok(FunctionContract::from_parts(
            self.name,
            self.parameters,
            self.return_type,
            self.return_description,
            self.docstring,
            referenced_types,
        ))
    }

    /// Collect the transitive closure of record schemas reachable from
    /// parameter and return annotations, in first-reference order.
    ///
    /// Schemas may reference one another in any registration order;
    /// resolution happens here, which is what makes forward references
    /// work. Registered schemas that nothing references are dropped.
    fn resolve_referenced_types(&self) -> Result<Vec<RecordSchema>, ExtractionError> {
        let mut pending: Vec<String> = Vec::new();
        for param in &self.parameters {
            if let Some(ty) = &param.ty {
                collect_record_names(ty, &mut pending);
            }
        }
        if let Some(ret) = &self.return_type {
            collect_record_names(ret, &mut pending);
        }

        let mut resolved: Vec<RecordSchema> = Vec::new();
        let mut cursor = 0;
        while cursor < pending.len() {
            let name = pending[cursor].clone();
            cursor += 1;
            let schema = self
                .records
                .iter()
                .find(|s| s.name() == name)
                .ok_or_else(|| ExtractionError::UnknownRecordType {
                    function: self.name.clone(),
                    type_name: name.clone(),
                })?;
            resolved.push(schema.clone());
            for field in schema.fields() {
                collect_record_names(field.ty(), &mut pending);
            }
        }
        Ok(resolved)
    }
}

fn collect_record_names(descriptor: &TypeDescriptor, out: &mut Vec<String>) {
    match descriptor {
        TypeDescriptor::List(inner) => collect_record_names(inner, out),
        TypeDescriptor::Record(name) => {
            if !out.iter().any(|n| n == name) {
                out.push(name.clone());
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_minimal() {
        let contract = FunctionContract::builder("add")
            .parameter("x", TypeDescriptor::Int)
            .parameter("y", TypeDescriptor::Int)
            .docstring("returns x+y")
            .build()
            .unwrap();
        assert_eq!(contract.name(), "add");
        assert_eq!(contract.parameters().len(), 2);
        assert_eq!(contract.docstring(), Some("returns x+y"));
        assert!(contract.referenced_types().is_empty());
    }

    #[test]
    fn test_build_keeps_descriptions() {
        let contract = FunctionContract::builder("scale")
            .parameter_described("x", TypeDescriptor::Float, "value to scale")
            .push_parameter(
                Parameter::new("k")
                    .typed(TypeDescriptor::Float)
                    .with_default(Value::Float(2.0))
                    .described("scaling factor"),
            )
            .returns_described(TypeDescriptor::Float, "x multiplied by k")
            .build()
            .unwrap();

        assert_eq!(
            contract.parameters()[0].description.as_deref(),
            Some("value to scale")
        );
        assert_eq!(
            contract.parameters()[1].description.as_deref(),
            Some("scaling factor")
        );
        assert_eq!(contract.parameters()[1].default, Some(Value::Float(2.0)));
        assert_eq!(contract.return_description(), Some("x multiplied by k"));
        // Descriptions are prompt metadata only; the signature is unchanged.
        assert_eq!(
            contract.signature(),
            "fn scale(x: float, k: float = 2.0) -> float"
        );
    }

    #[test]
    fn test_build_rejects_invalid_name() {
        assert!(matches!(
            FunctionContract::builder("not a name").build(),
            Err(ExtractionError::InvalidName(_))
        ));
        assert!(matches!(
            FunctionContract::builder("fn").build(),
            Err(ExtractionError::InvalidName(_))
        ));
    }

    #[test]
    fn test_build_rejects_invalid_parameter() {
        assert!(matches!(
            FunctionContract::builder("f")
                .parameter("2fast", TypeDescriptor::Int)
                .build(),
            Err(ExtractionError::InvalidParameterName { .. })
        ));
    }

    #[test]
    fn test_build_rejects_duplicate_parameter() {
        assert!(matches!(
            FunctionContract::builder("f")
                .parameter("x", TypeDescriptor::Int)
                .parameter("x", TypeDescriptor::Str)
                .build(),
            Err(ExtractionError::DuplicateParameter { .. })
        ));
    }

    #[test]
    fn test_build_rejects_default_before_required() {
        assert!(matches!(
            FunctionContract::builder("f")
                .parameter_with_default("a", TypeDescriptor::Int, Value::Int(1))
                .parameter("b", TypeDescriptor::Int)
                .build(),
            Err(ExtractionError::DefaultOrdering { .. })
        ));
    }

    #[test]
    fn test_build_rejects_default_type_mismatch() {
        assert!(matches!(
            FunctionContract::builder("f")
                .parameter_with_default("a", TypeDescriptor::Int, Value::Str("no".into()))
                .build(),
            Err(ExtractionError::DefaultTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_build_resolves_forward_referenced_records() {
        // Segment's fields reference Point, registered after Segment.
        let segment = RecordSchema::new("Segment")
            .field("a", TypeDescriptor::Record("Point".to_string()))
            .field("b", TypeDescriptor::Record("Point".to_string()));
        let point = RecordSchema::new("Point")
            .field("x", TypeDescriptor::Int)
            .field("y", TypeDescriptor::Int);

        let contract = FunctionContract::builder("length")
            .parameter("seg", TypeDescriptor::Record("Segment".to_string()))
            .returns(TypeDescriptor::Float)
            .record(segment)
            .record(point)
            .build()
            .unwrap();

        let names: Vec<&str> = contract
            .referenced_types()
            .iter()
            .map(|s| s.name())
            .collect();
        assert_eq!(names, vec!["Segment", "Point"]);
    }

    #[test]
    fn test_build_rejects_unknown_record_reference() {
        assert!(matches!(
            FunctionContract::builder("f")
                .parameter("p", TypeDescriptor::Record("Ghost".to_string()))
                .build(),
            Err(ExtractionError::UnknownRecordType { .. })
        ));
    }

    #[test]
    fn test_build_drops_unreferenced_records() {
        let unused = RecordSchema::new("Unused").field("v", TypeDescriptor::Int);
        let contract = FunctionContract::builder("f")
            .parameter("x", TypeDescriptor::Int)
            .record(unused)
            .build()
            .unwrap();
        assert!(contract.referenced_types().is_empty());
    }

    #[test]
    fn test_build_is_deterministic() {
        let build = || {
            FunctionContract::builder("f")
                .parameter("p", TypeDescriptor::Record("Point".to_string()))
                .record(
                    RecordSchema::new("Point")
                        .field("x", TypeDescriptor::Int)
                        .field("y", TypeDescriptor::Int),
                )
                .build()
                .unwrap()
        };
        assert_eq!(build(), build());
    }
}
