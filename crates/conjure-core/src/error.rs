//! Error types for Conjure Core
//!
//! This module defines all error types used throughout the synthesis pipeline.
//! We use `thiserror` for ergonomic error definitions with automatic Display/Error implementations.

use thiserror::Error;

/// Result type alias for Conjure operations
pub type Result<T> = std::result::Result<T, ConjureError>;

/// Main error type for Conjure operations
#[derive(Error, Debug)]
pub enum ConjureError {
    /// Contract extraction errors (fatal, never retried)
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Completion client transport errors (propagated, not retried)
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The retry budget was spent without admitting an implementation
    #[error("{0}")]
    Exhausted(#[from] GenerationExhaustedError),

    /// Runtime errors raised while executing an admitted implementation,
    /// including argument binding failures
    #[error("Invocation error: {0}")]
    Invocation(#[from] EvalError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        source: Box<ConjureError>,
    },
}

/// Errors raised while building a [`crate::contract::FunctionContract`]
///
/// Extraction failures are fatal: a contract that cannot be analyzed will
/// never produce a usable prompt, so no retry is attempted.
#[derive(Error, Debug, Clone)]
pub enum ExtractionError {
    #[error("'{0}' is not a valid function name")]
    InvalidName(String),

    #[error("parameter '{parameter}' of '{function}' is not a valid identifier")]
    InvalidParameterName { function: String, parameter: String },

    #[error("duplicate parameter '{parameter}' in '{function}'")]
    DuplicateParameter { function: String, parameter: String },

    #[error("parameter '{parameter}' of '{function}' without a default follows one with a default")]
    DefaultOrdering { function: String, parameter: String },

    #[error("contract for '{function}' references unknown record type '{type_name}'")]
    UnknownRecordType { function: String, type_name: String },

    #[error("default for parameter '{parameter}' of '{function}' does not fit type {expected}, got {actual}")]
    DefaultTypeMismatch {
        function: String,
        parameter: String,
        expected: String,
        actual: String,
    },
}

/// Errors raised by a [`crate::client::CompletionClient`] implementation
///
/// Transport problems (network, auth, rate limits) are not expected to
/// self-resolve across quick retries, so the admission engine propagates
/// them immediately instead of burning the retry budget.
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("completion API error ({status}): {detail}")]
    Api { status: u16, detail: String },

    #[error("malformed completion response: {0}")]
    MalformedResponse(String),

    #[error("completion response contained no choices")]
    EmptyCompletion,
}

/// Raised when the admission engine spends its whole attempt budget
/// without admitting an implementation
///
/// Carries the most recent attempt's failure detail for diagnosis. The
/// failed function is never cached as broken; the next call regenerates
/// from zero.
#[derive(Error, Debug, Clone)]
#[error("generation exhausted for '{function}' after {attempts} attempt(s): {last_error}")]
pub struct GenerationExhaustedError {
    /// Name of the function that could not be synthesized
    pub function: String,
    /// Number of generation attempts made
    pub attempts: u32,
    /// Failure detail of the final attempt
    pub last_error: String,
}

/// Errors raised while lexing or parsing generated source
///
/// Inside the admission engine these are expected, retriable outcomes,
/// not fatal conditions.
#[derive(Error, Debug, Clone)]
pub enum CompileError {
    #[error("unexpected character '{0}' at offset {1}")]
    UnexpectedChar(char, usize),

    #[error("unterminated string literal starting at offset {0}")]
    UnterminatedString(usize),

    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("unexpected token {found} at offset {offset}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        offset: usize,
    },

    #[error("duplicate function definition '{0}'")]
    DuplicateFunction(String),

    #[error("duplicate parameter '{parameter}' in function '{function}'")]
    DuplicateFnParameter { function: String, parameter: String },

    #[error("source defines no functions")]
    EmptyProgram,
}

/// Runtime errors raised while executing an admitted implementation
///
/// These propagate to the caller exactly as if the caller had written and
/// called the function directly; they are never treated as admission
/// failures and never trigger regeneration.
#[derive(Error, Debug, Clone)]
pub enum EvalError {
    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow in '{0}'")]
    IntegerOverflow(String),

    #[error("index {index} out of bounds for list of length {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("unknown record type '{0}'")]
    UnknownRecord(String),

    #[error("record '{record}' literal mismatch: {detail}")]
    RecordMismatch { record: String, detail: String },

    #[error("value of type {value} has no field '{field}'")]
    UnknownField { field: String, value: String },

    #[error("call depth limit of {0} exceeded")]
    CallDepthExceeded(usize),

    #[error("function '{name}' expects {expected} argument(s), got {got}")]
    Arity {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("unknown keyword argument '{argument}' for '{function}'")]
    UnknownKeywordArgument { function: String, argument: String },

    #[error("duplicate value for argument '{argument}' of '{function}'")]
    DuplicateArgument { function: String, argument: String },

    #[error("missing required argument '{argument}' for '{function}'")]
    MissingArgument { function: String, argument: String },

    #[error("'{function}' takes at most {expected} positional argument(s), got {got}")]
    TooManyPositional {
        function: String,
        expected: usize,
        got: usize,
    },
}

impl ConjureError {
    /// Add context to an error
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to a Result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add lazy context to a Result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_context() {
        let err = ExtractionError::InvalidName("9lives".to_string());
        let err = ConjureError::from(err);
        let err = err.context("Failed to build contract");

        assert!(err.to_string().contains("Failed to build contract"));
    }

    #[test]
    fn test_result_ext() {
        let result: Result<()> = Err(TransportError::EmptyCompletion.into());
        let result = result.context("Completion request failed");

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Completion request failed"));
    }

    #[test]
    fn test_exhausted_display_carries_detail() {
        let err = GenerationExhaustedError {
            function: "add".to_string(),
            attempts: 3,
            last_error: "unexpected token )".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("add"));
        assert!(rendered.contains("3 attempt(s)"));
        assert!(rendered.contains("unexpected token"));
    }
}
