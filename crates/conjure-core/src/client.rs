//! Completion client boundary
//!
//! The HTTP transport to an LLM provider is an external collaborator;
//! only its request/response contract lives here. `conjure-client` ships
//! a real implementation, and tests script their own.

use crate::error::TransportError;
use async_trait::async_trait;

/// A text-generation backend
///
/// Implementations must not retry or back off on their own: the admission
/// engine owns the decision of whether a failure is retriable, and treats
/// every [`TransportError`] as non-retriable.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send a prompt to the backend and return the raw completion text
    async fn complete(&self, prompt: &str, model: &str) -> Result<String, TransportError>;
}
