//! Invocation wrapper
//!
//! `Synthesizer` wires a completion client, an implementation registry
//! and a configuration together and mints `SynthesizedFunction` handles:
//! callables whose bodies do not exist until first use. Generation is
//! lazy: nothing talks to the backend at mint time, only at the first
//! call (and on every call when memoization is disabled).

use crate::admission::AdmissionEngine;
use crate::client::CompletionClient;
use crate::config::SynthesisConfig;
use crate::contract::{CallArgs, FunctionContract};
use crate::error::Result;
use crate::expr::Value;
use crate::registry::{FunctionId, ImplementationRegistry};
use std::sync::Arc;
use tracing::debug;

/// Factory for synthesized function handles
#[derive(Clone)]
pub struct Synthesizer {
    client: Arc<dyn CompletionClient>,
    registry: Arc<ImplementationRegistry>,
    config: SynthesisConfig,
}

impl Synthesizer {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        registry: Arc<ImplementationRegistry>,
        config: SynthesisConfig,
    ) -> Self {
        Self {
            client,
            registry,
            config,
        }
    }

    /// Convenience constructor choosing the registry from the
    /// configuration's cache flag
    pub fn with_config(client: Arc<dyn CompletionClient>, config: SynthesisConfig) -> Self {
        let registry = if config.cache_enabled {
            Arc::new(ImplementationRegistry::new())
        } else {
            Arc::new(ImplementationRegistry::disabled())
        };
        Self::new(client, registry, config)
    }

    /// Mint a callable handle for a contract
    ///
    /// The id is the cache key; reusing an id across different contracts
    /// will make them share a cache slot.
    pub fn function(
        &self,
        id: impl Into<FunctionId>,
        contract: FunctionContract,
    ) -> SynthesizedFunction {
        SynthesizedFunction {
            id: id.into(),
            contract: Arc::new(contract),
            client: Arc::clone(&self.client),
            registry: Arc::clone(&self.registry),
            config: self.config.clone(),
        }
    }

    /// The registry this synthesizer populates
    pub fn registry(&self) -> &Arc<ImplementationRegistry> {
        &self.registry
    }
}

impl std::fmt::Debug for Synthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synthesizer")
            .field("config", &self.config)
            .field("cached", &self.registry.len())
            .finish()
    }
}

/// A callable whose implementation is synthesized on first invocation
#[derive(Clone)]
pub struct SynthesizedFunction {
    id: FunctionId,
    contract: Arc<FunctionContract>,
    client: Arc<dyn CompletionClient>,
    registry: Arc<ImplementationRegistry>,
    config: SynthesisConfig,
}

impl SynthesizedFunction {
    /// Invoke the function with the given arguments
    ///
    /// Cold path on a registry miss: prompt → completion → sanitize →
    /// admission, then optional memoization, then execution. Runtime
    /// errors raised by the generated implementation propagate unchanged,
    /// and never poison the cache slot.
    pub async fn call(&self, args: CallArgs) -> Result<Value> {
        let implementation = match self.registry.get(&self.id) {
            Some(implementation) => {
                debug!(id = %self.id, "registry hit, skipping generation");
                implementation
            }
            None => {
                debug!(id = %self.id, "registry miss, entering cold path");
                let engine = AdmissionEngine::new(self.client.as_ref(), &self.config);
                let admitted = Arc::new(engine.admit(&self.contract).await?);
                self.registry
                    .insert(self.id.clone(), Arc::clone(&admitted));
                admitted
            }
        };

        let bound = self.contract.bind(&args)?;
        Ok(implementation.invoke(bound)?)
    }

    /// The handle's cache identity
    pub fn id(&self) -> &FunctionId {
        &self.id
    }

    /// The contract this handle was minted from
    pub fn contract(&self) -> &FunctionContract {
        &self.contract
    }
}

impl std::fmt::Debug for SynthesizedFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesizedFunction")
            .field("id", &self.id)
            .field("signature", &self.contract.signature())
            .finish()
    }
}
