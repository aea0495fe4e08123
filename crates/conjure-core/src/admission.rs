//! Admission engine
//!
//! The core state machine of the cold path: generate a completion,
//! sanitize it, compile it against the contract's record schemas, and
//! structurally validate the result before it is trusted to run. Failed
//! attempts retry with a fresh prompt/completion round until the attempt
//! budget is spent.
//!
//! Admission is purely structural. The function must exist with a
//! compatible arity; no trial call is made, so runtime errors during real
//! use surface to the caller as ordinary execution failures.

use crate::client::CompletionClient;
use crate::config::SynthesisConfig;
use crate::contract::{FunctionContract, RecordSchema};
use crate::error::{CompileError, EvalError, GenerationExhaustedError, Result};
use crate::expr::{parse_program, Evaluator, Program, Value};
use crate::prompt::build_prompt;
use crate::sanitize::sanitize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// An admitted implementation bound to its contract's record schemas
///
/// Holds every function definition found in the admitted source, so the
/// entry function can call helpers the model defined alongside it.
#[derive(Debug, Clone)]
pub struct CompiledImplementation {
    program: Program,
    entry: String,
    schemas: HashMap<String, RecordSchema>,
    attempts: u32,
}

impl CompiledImplementation {
    /// Execute the entry function with positionally bound arguments
    pub fn invoke(&self, args: Vec<Value>) -> std::result::Result<Value, EvalError> {
        Evaluator::new(&self.program, &self.schemas).call(&self.entry, args)
    }

    /// How many generation attempts it took to admit this implementation
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

/// Outcome of a single generation round
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Admitted,
    CompileError(String),
    ValidationError(String),
}

impl AttemptOutcome {
    fn detail(&self) -> &str {
        match self {
            AttemptOutcome::Admitted => "admitted",
            AttemptOutcome::CompileError(detail) => detail,
            AttemptOutcome::ValidationError(detail) => detail,
        }
    }
}

/// One round of generation; ephemeral to the retry loop
#[derive(Debug, Clone)]
pub struct GenerationAttempt {
    /// 1-based attempt index
    pub index: u32,
    /// Raw completion text as returned by the client
    pub raw: String,
    /// Sanitized candidate source
    pub sanitized: String,
    /// How the round ended
    pub outcome: AttemptOutcome,
}

/// Drives prompt → completion → sanitize → admit rounds for one contract
pub struct AdmissionEngine<'a> {
    client: &'a dyn CompletionClient,
    config: &'a SynthesisConfig,
}

impl std::fmt::Debug for AdmissionEngine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionEngine")
            .field("config", &self.config)
            .finish()
    }
}

impl<'a> AdmissionEngine<'a> {
    pub fn new(client: &'a dyn CompletionClient, config: &'a SynthesisConfig) -> Self {
        Self { client, config }
    }

    /// Run generation rounds until an implementation is admitted or the
    /// attempt budget is spent
    ///
    /// Transport errors propagate immediately; compile and validation
    /// failures retry. Each retry regenerates from the same prompt.
    pub async fn admit(&self, contract: &FunctionContract) -> Result<CompiledImplementation> {
        let prompt = build_prompt(contract);
        let budget = self.config.attempt_budget();
        let mut attempts: Vec<GenerationAttempt> = Vec::new();

        for index in 1..=budget {
            debug!(
                function = contract.name(),
                attempt = index,
                model = %self.config.model,
                "requesting completion"
            );
            let raw = self.client.complete(&prompt, &self.config.model).await?;
            let sanitized = sanitize(&raw);

            match self.admit_source(contract, &sanitized) {
                Ok(program) => {
                    info!(
                        function = contract.name(),
                        attempt = index,
                        "implementation admitted"
                    );
                    return Ok(CompiledImplementation {
                        program,
                        entry: contract.name().to_string(),
                        schemas: contract.schema_map(),
                        attempts: index,
                    });
                }
                Err(outcome) => {
                    warn!(
                        function = contract.name(),
                        attempt = index,
                        budget,
                        detail = outcome.detail(),
                        "admission attempt failed"
                    );
                    attempts.push(GenerationAttempt {
                        index,
                        raw,
                        sanitized,
                        outcome,
                    });
                }
            }
        }

        let last_error = attempts
            .last()
            .map(|a| a.outcome.detail().to_string())
            .unwrap_or_else(|| "no attempts made".to_string());
        Err(GenerationExhaustedError {
            function: contract.name().to_string(),
            attempts: budget,
            last_error,
        }
        .into())
    }

    /// Compile and structurally validate one sanitized candidate
    fn admit_source(
        &self,
        contract: &FunctionContract,
        source: &str,
    ) -> std::result::Result<Program, AttemptOutcome> {
        let program = parse_program(source)
            .map_err(|e: CompileError| AttemptOutcome::CompileError(e.to_string()))?;

        let Some(def) = program.get(contract.name()) else {
            return Err(AttemptOutcome::ValidationError(format!(
                "source does not define the requested function '{}'",
                contract.name()
            )));
        };

        let expected = contract.parameters().len();
        if def.params.len() != expected {
            return Err(AttemptOutcome::ValidationError(format!(
                "'{}' defines {} parameter(s), contract declares {}",
                contract.name(),
                def.params.len(),
                expected
            )));
        }

        Ok(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::TypeDescriptor;
    use crate::error::{ConjureError, TransportError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays a scripted sequence of completions; repeats the last one
    /// when the script runs out.
    struct ScriptedClient {
        responses: Mutex<Vec<String>>,
        calls: AtomicUsize,
        fail_transport: bool,
    }

    impl ScriptedClient {
        fn new(responses: &[&str]) -> Self {
            Self {
                responses: Mutex::new(responses.iter().rev().map(|s| s.to_string()).collect()),
                calls: AtomicUsize::new(0),
                fail_transport: false,
            }
        }

        fn failing() -> Self {
            Self {
                responses: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
                fail_transport: true,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(
            &self,
            _prompt: &str,
            _model: &str,
        ) -> std::result::Result<String, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_transport {
                return Err(TransportError::Network("connection refused".to_string()));
            }
            let mut responses = self.responses.lock().expect("lock poisoned");
            match responses.len() {
                0 => Err(TransportError::EmptyCompletion),
                1 => Ok(responses[0].clone()),
                _ => Ok(responses.pop().expect("checked length")),
            }
        }
    }

    fn add_contract() -> FunctionContract {
        FunctionContract::builder("add")
            .parameter("x", TypeDescriptor::Int)
            .parameter("y", TypeDescriptor::Int)
            .docstring("returns x+y")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_admit_valid_source_first_attempt() {
        let client = ScriptedClient::new(&["fn add(x, y) { x + y }"]);
        let config = SynthesisConfig::default();
        let engine = AdmissionEngine::new(&client, &config);

        let implementation = engine.admit(&add_contract()).await.unwrap();
        assert_eq!(implementation.attempts(), 1);
        assert_eq!(client.calls(), 1);
        assert_eq!(
            implementation
                .invoke(vec![Value::Int(2), Value::Int(3)])
                .unwrap(),
            Value::Int(5)
        );
    }

    #[tokio::test]
    async fn test_admit_fenced_source() {
        let client = ScriptedClient::new(&["Sure thing:\n```\nfn add(x, y) { x + y }\n```"]);
        let config = SynthesisConfig::default();
        let engine = AdmissionEngine::new(&client, &config);

        let implementation = engine.admit(&add_contract()).await.unwrap();
        assert_eq!(
            implementation
                .invoke(vec![Value::Int(2), Value::Int(3)])
                .unwrap(),
            Value::Int(5)
        );
    }

    #[tokio::test]
    async fn test_retry_after_syntax_error() {
        let client = ScriptedClient::new(&["fn add(x, y) { x + }", "fn add(x, y) { x + y }"]);
        let config = SynthesisConfig::default();
        let engine = AdmissionEngine::new(&client, &config);

        let implementation = engine.admit(&add_contract()).await.unwrap();
        assert_eq!(implementation.attempts(), 2);
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_wrong_name_is_validation_failure_then_retry() {
        let client = ScriptedClient::new(&["fn sum(x, y) { x + y }", "fn add(x, y) { x + y }"]);
        let config = SynthesisConfig::default();
        let engine = AdmissionEngine::new(&client, &config);

        let implementation = engine.admit(&add_contract()).await.unwrap();
        assert_eq!(implementation.attempts(), 2);
    }

    #[tokio::test]
    async fn test_arity_mismatch_is_validation_failure() {
        let client = ScriptedClient::new(&["fn add(x) { x }"]);
        let config = SynthesisConfig::default().with_retry_limit(1);
        let engine = AdmissionEngine::new(&client, &config);

        let err = engine.admit(&add_contract()).await.unwrap_err();
        match err {
            ConjureError::Exhausted(e) => {
                assert!(e.last_error.contains("parameter"));
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_exhaustion_after_budget_spent() {
        let client = ScriptedClient::new(&["this is not code at all"]);
        let config = SynthesisConfig::default().with_retry_limit(3);
        let engine = AdmissionEngine::new(&client, &config);

        let err = engine.admit(&add_contract()).await.unwrap_err();
        assert_eq!(client.calls(), 3);
        match err {
            ConjureError::Exhausted(e) => {
                assert_eq!(e.attempts, 3);
                assert_eq!(e.function, "add");
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_zero_retry_limit_fails_after_single_attempt() {
        let client = ScriptedClient::new(&["garbage"]);
        let config = SynthesisConfig::default().with_retry_limit(0);
        let engine = AdmissionEngine::new(&client, &config);

        let err = engine.admit(&add_contract()).await.unwrap_err();
        assert_eq!(client.calls(), 1);
        assert!(matches!(err, ConjureError::Exhausted(_)));
    }

    #[tokio::test]
    async fn test_transport_error_propagates_without_retry() {
        let client = ScriptedClient::failing();
        let config = SynthesisConfig::default().with_retry_limit(3);
        let engine = AdmissionEngine::new(&client, &config);

        let err = engine.admit(&add_contract()).await.unwrap_err();
        assert_eq!(client.calls(), 1);
        assert!(matches!(err, ConjureError::Transport(_)));
    }

    #[tokio::test]
    async fn test_extra_helper_functions_are_kept() {
        let source = "fn double(v) { v * 2 }\nfn add(x, y) { double(x) + y }";
        let client = ScriptedClient::new(&[source]);
        let config = SynthesisConfig::default();
        let engine = AdmissionEngine::new(&client, &config);

        let implementation = engine.admit(&add_contract()).await.unwrap();
        assert_eq!(
            implementation
                .invoke(vec![Value::Int(2), Value::Int(3)])
                .unwrap(),
            Value::Int(7)
        );
    }
}
