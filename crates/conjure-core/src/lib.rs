//! Conjure Core - Lazy LLM synthesis of function implementations
//!
//! Conjure lets a caller describe a function it has not written - name,
//! parameters, defaults, return type, docstring - and receive a callable
//! whose body is synthesized by a text-generation backend the first time
//! it is invoked, admitted into a sandboxed expression evaluator, and
//! optionally memoized for the rest of the process.
//!
//! # Architecture
//!
//! The cold path flows strictly downward:
//!
//! 1. **Contract** (`contract`): validated description of the stub's signature
//! 2. **Prompt** (`prompt`): deterministic rendering of the contract
//! 3. **Completion Client** (`client`): boundary trait for the LLM backend
//! 4. **Sanitizer** (`sanitize`): strips fences and commentary from completions
//! 5. **Admission** (`admission`): compile, validate, retry within a budget
//! 6. **Registry** (`registry`): process-lifetime memoization of admitted code
//! 7. **Synthesizer** (`synthesizer`): the per-call entry point tying it together
//!
//! Generated implementations are written in a small expression language
//! (`expr`) and run in-process by a tree-walking evaluator; no native
//! code is ever admitted at runtime.
//!
//! # Quick Start
//!
//! ```
//! use conjure_core::{
//!     CallArgs, CompletionClient, FunctionContract, SynthesisConfig, Synthesizer,
//!     TransportError, TypeDescriptor, Value,
//! };
//! use std::sync::Arc;
//!
//! // A stand-in backend; production code uses conjure-client.
//! struct CannedClient;
//!
//! #[async_trait::async_trait]
//! impl CompletionClient for CannedClient {
//!     async fn complete(&self, _prompt: &str, _model: &str) -> Result<String, TransportError> {
//!         Ok("fn add(x, y) { x + y }".to_string())
//!     }
//! }
//!
//! # tokio_runtime().block_on(async {
//! let contract = FunctionContract::builder("add")
//!     .parameter("x", TypeDescriptor::Int)
//!     .parameter("y", TypeDescriptor::Int)
//!     .docstring("returns x+y")
//!     .build()
//!     .unwrap();
//!
//! let config = SynthesisConfig::new().with_cache_enabled(true);
//! let synthesizer = Synthesizer::with_config(Arc::new(CannedClient), config);
//! let add = synthesizer.function("demo::add", contract);
//!
//! let result = add.call(CallArgs::positional([2i64, 3])).await.unwrap();
//! assert_eq!(result, Value::Int(5));
//! # });
//! # fn tokio_runtime() -> tokio::runtime::Runtime {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap()
//! # }
//! ```
//!
//! # Design Principles
//!
//! 1. **Lazy generation**: the remote call happens at first use, not at definition time
//! 2. **Structural admission**: generated code must compile and define the right
//!    symbol, but is never trial-executed
//! 3. **Failures are ordinary**: malformed completions retry, runtime errors
//!    propagate to the caller unchanged
//! 4. **No hidden state**: the cache is an injected registry keyed by explicit handles

#![deny(unsafe_code)]
#![warn(rust_2018_idioms, missing_debug_implementations)]

pub mod admission;
pub mod client;
pub mod config;
pub mod contract;
pub mod error;
pub mod expr;
pub mod prompt;
pub mod registry;
pub mod sanitize;
pub mod synthesizer;

// Re-export commonly used types for convenience
pub use admission::{AdmissionEngine, AttemptOutcome, CompiledImplementation, GenerationAttempt};
pub use client::CompletionClient;
pub use config::{SynthesisConfig, DEFAULT_MODEL, DEFAULT_RETRY_LIMIT};
pub use contract::{CallArgs, ContractBuilder, FunctionContract, Parameter, RecordField, RecordSchema, TypeDescriptor};
pub use error::{
    ConjureError, ExtractionError, GenerationExhaustedError, Result, TransportError,
};
pub use expr::Value;
pub use registry::{FunctionId, ImplementationRegistry};
pub use synthesizer::{SynthesizedFunction, Synthesizer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
