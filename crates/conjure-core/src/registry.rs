//! Memoization registry
//!
//! An in-process mapping from function identity to its admitted
//! implementation. The registry is injected into the synthesizer at
//! construction time; keys are stable handles chosen by the caller, so
//! two differently defined functions never collide unless the caller
//! hands them the same id. Entries are never evicted within a process.

use crate::admission::CompiledImplementation;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Stable identity of a synthesized function, chosen by the caller
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionId(String);

impl FunctionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FunctionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for FunctionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Process-lifetime cache of admitted implementations
///
/// Concurrent first calls may each run the cold path; whichever insert
/// lands last wins and earlier in-flight results are discarded. That
/// lost-update behavior is accepted for a memoization cache.
#[derive(Debug)]
pub struct ImplementationRegistry {
    entries: DashMap<FunctionId, Arc<CompiledImplementation>>,
    enabled: bool,
}

impl ImplementationRegistry {
    /// Create an enabled registry
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            enabled: true,
        }
    }

    /// Create a registry that never stores anything: `get` always misses
    /// and `insert` is a no-op, so every invocation re-runs the cold path
    pub fn disabled() -> Self {
        Self {
            entries: DashMap::new(),
            enabled: false,
        }
    }

    /// Whether memoization is active
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Look up an admitted implementation
    pub fn get(&self, id: &FunctionId) -> Option<Arc<CompiledImplementation>> {
        if !self.enabled {
            return None;
        }
        self.entries.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Store an admitted implementation
    pub fn insert(&self, id: FunctionId, implementation: Arc<CompiledImplementation>) {
        if self.enabled {
            self.entries.insert(id, implementation);
        }
    }

    /// Number of cached implementations
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ImplementationRegistry {
    fn default() -> Self {
        Self::new()
    }
}
