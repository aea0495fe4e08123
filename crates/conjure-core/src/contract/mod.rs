//! Function contracts: the machine-readable description of a stub
//!
//! A [`FunctionContract`] is the structured, serializable description of a
//! function's intended signature and behavior. It is built once through
//! [`FunctionContract::builder`] (the extraction step), stays immutable
//! for the life of the process, and drives both prompt construction and
//! argument binding.

pub mod builder;
pub mod types;

pub use builder::ContractBuilder;
pub use types::{RecordField, RecordSchema, TypeDescriptor};

use crate::error::EvalError;
use crate::expr::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A declared parameter of a contract
///
/// `ty: None` means the caller provided no annotation, which yields looser
/// prompt guidance than an explicit [`TypeDescriptor::Any`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name, a valid source-language identifier
    pub name: String,
    /// Declared type, if any
    pub ty: Option<TypeDescriptor>,
    /// Default value literal, if any
    pub default: Option<Value>,
    /// Free-text description carried into the prompt, if any
    pub description: Option<String>,
}

impl Parameter {
    /// An untyped parameter with no default and no description
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            default: None,
            description: None,
        }
    }

    /// Set the type descriptor
    pub fn typed(mut self, ty: TypeDescriptor) -> Self {
        self.ty = Some(ty);
        self
    }

    /// Set the default value literal
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Set the free-text description
    pub fn described(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }
}

/// Immutable description of a function to be synthesized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionContract {
    name: String,
    parameters: Vec<Parameter>,
    return_type: Option<TypeDescriptor>,
    return_description: Option<String>,
    docstring: Option<String>,
    referenced_types: Vec<RecordSchema>,
}

impl FunctionContract {
    /// Start building a contract for a function with the given name
    pub fn builder(name: impl Into<String>) -> ContractBuilder {
        ContractBuilder::new(name)
    }

    pub(crate) fn from_parts(
        name: String,
        parameters: Vec<Parameter>,
        return_type: Option<TypeDescriptor>,
        return_description: Option<String>,
        docstring: Option<String>,
        referenced_types: Vec<RecordSchema>,
    ) -> Self {
        Self {
            name,
            parameters,
            return_type,
            return_description,
            docstring,
            referenced_types,
        }
    }

    /// The symbol the admitted implementation must define
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameters in declaration order
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Declared return type, if any
    pub fn return_type(&self) -> Option<&TypeDescriptor> {
        self.return_type.as_ref()
    }

    /// Free-text description of the return value, if any
    pub fn return_description(&self) -> Option<&str> {
        self.return_description.as_deref()
    }

    /// Behavioral specification text, if any
    pub fn docstring(&self) -> Option<&str> {
        self.docstring.as_deref()
    }

    /// Record schemas reachable from parameter or return annotations, in
    /// first-reference order
    pub fn referenced_types(&self) -> &[RecordSchema] {
        &self.referenced_types
    }

    /// Render the signature in source-language syntax,
    /// e.g. `fn add(x: int, y: int = 2) -> int`
    pub fn signature(&self) -> String {
        let mut out = format!("fn {}(", self.name);
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&param.name);
            if let Some(ty) = &param.ty {
                out.push_str(": ");
                out.push_str(&ty.to_string());
            }
            if let Some(default) = &param.default {
                out.push_str(" = ");
                out.push_str(&default.to_string());
            }
        }
        out.push(')');
        if let Some(ret) = &self.return_type {
            out.push_str(" -> ");
            out.push_str(&ret.to_string());
        }
        out
    }

    /// Referenced schemas keyed by name, for seeding the evaluator
    pub fn schema_map(&self) -> HashMap<String, RecordSchema> {
        self.referenced_types
            .iter()
            .map(|schema| (schema.name().to_string(), schema.clone()))
            .collect()
    }

    /// Bind caller arguments against this contract's parameters
    ///
    /// The wrapper preserves the stub's observable call signature, so
    /// positional and keyword acceptance follows the contract regardless
    /// of what the generated implementation's exact signature turned out
    /// to be. Binding failures are ordinary invocation errors.
    pub fn bind(&self, args: &CallArgs) -> Result<Vec<Value>, EvalError> {
        if args.positional.len() > self.parameters.len() {
            return Err(EvalError::TooManyPositional {
                function: self.name.clone(),
                expected: self.parameters.len(),
                got: args.positional.len(),
            });
        }

        let mut slots: Vec<Option<Value>> = vec![None; self.parameters.len()];
        for (i, value) in args.positional.iter().enumerate() {
            slots[i] = Some(value.clone());
        }

        for (key, value) in &args.keyword {
            let index = self
                .parameters
                .iter()
                .position(|p| p.name == *key)
                .ok_or_else(|| EvalError::UnknownKeywordArgument {
                    function: self.name.clone(),
                    argument: key.clone(),
                })?;
            if slots[index].is_some() {
                return Err(EvalError::DuplicateArgument {
                    function: self.name.clone(),
                    argument: key.clone(),
                });
            }
            slots[index] = Some(value.clone());
        }

        let mut bound = Vec::with_capacity(self.parameters.len());
        for (slot, param) in slots.into_iter().zip(&self.parameters) {
            match slot.or_else(|| param.default.clone()) {
                Some(value) => bound.push(value),
                None => {
                    return Err(EvalError::MissingArgument {
                        function: self.name.clone(),
                        argument: param.name.clone(),
                    })
                }
            }
        }
        Ok(bound)
    }
}

/// Positional and keyword arguments for one invocation
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    positional: Vec<Value>,
    keyword: Vec<(String, Value)>,
}

impl CallArgs {
    /// No arguments
    pub fn new() -> Self {
        Self::default()
    }

    /// Positional arguments only
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            positional: values.into_iter().map(Into::into).collect(),
            keyword: Vec::new(),
        }
    }

    /// Append a positional argument
    pub fn with(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Append a keyword argument
    pub fn with_keyword(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.push((name.into(), value.into()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract_with_default() -> FunctionContract {
        FunctionContract::builder("add")
            .parameter("a", TypeDescriptor::Int)
            .parameter_with_default("b", TypeDescriptor::Int, Value::Int(2))
            .returns(TypeDescriptor::Int)
            .build()
            .unwrap()
    }

    #[test]
    fn test_signature_rendering() {
        let contract = contract_with_default();
        assert_eq!(contract.signature(), "fn add(a: int, b: int = 2) -> int");
    }

    #[test]
    fn test_signature_untyped_parameter() {
        let contract = FunctionContract::builder("shout")
            .parameter_untyped("text")
            .build()
            .unwrap();
        assert_eq!(contract.signature(), "fn shout(text)");
    }

    #[test]
    fn test_bind_fills_default() {
        let contract = contract_with_default();
        let bound = contract.bind(&CallArgs::positional([5i64])).unwrap();
        assert_eq!(bound, vec![Value::Int(5), Value::Int(2)]);
    }

    #[test]
    fn test_bind_keyword_overrides_default() {
        let contract = contract_with_default();
        let bound = contract
            .bind(&CallArgs::positional([5i64]).with_keyword("b", 7i64))
            .unwrap();
        assert_eq!(bound, vec![Value::Int(5), Value::Int(7)]);
    }

    #[test]
    fn test_bind_rejects_unknown_keyword() {
        let contract = contract_with_default();
        let result = contract.bind(&CallArgs::positional([5i64]).with_keyword("c", 1i64));
        assert!(matches!(
            result,
            Err(EvalError::UnknownKeywordArgument { .. })
        ));
    }

    #[test]
    fn test_bind_rejects_duplicate_argument() {
        let contract = contract_with_default();
        let result = contract.bind(
            &CallArgs::positional([5i64, 6i64]).with_keyword("b", 7i64),
        );
        assert!(matches!(result, Err(EvalError::DuplicateArgument { .. })));
    }

    #[test]
    fn test_bind_rejects_missing_required() {
        let contract = contract_with_default();
        let result = contract.bind(&CallArgs::new());
        assert!(matches!(result, Err(EvalError::MissingArgument { .. })));
    }

    #[test]
    fn test_bind_rejects_too_many_positional() {
        let contract = contract_with_default();
        let result = contract.bind(&CallArgs::positional([1i64, 2, 3]));
        assert!(matches!(result, Err(EvalError::TooManyPositional { .. })));
    }

    #[test]
    fn test_contract_serializes() {
        let contract = contract_with_default();
        let json = serde_json::to_string(&contract).unwrap();
        let back: FunctionContract = serde_json::from_str(&json).unwrap();
        assert_eq!(back, contract);
    }
}
