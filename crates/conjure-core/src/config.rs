//! Synthesis configuration

use serde::{Deserialize, Serialize};

/// Default model identifier sent to the completion backend
pub const DEFAULT_MODEL: &str = "meta-llama/llama-3.3-70b-instruct:free";

/// Default number of generation attempts before giving up
pub const DEFAULT_RETRY_LIMIT: u32 = 3;

/// Configuration consumed by the synthesizer
///
/// Read once when a synthesized function handle is minted; later mutation
/// is not observed by handles that already exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Memoize admitted implementations across calls
    pub cache_enabled: bool,

    /// Total generation attempt budget. A limit of 0 behaves as a single
    /// attempt that fails on any admission problem without retrying.
    pub retry_limit: u32,

    /// Model identifier passed to the completion client
    pub model: String,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            cache_enabled: false,
            retry_limit: DEFAULT_RETRY_LIMIT,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl SynthesisConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable memoization
    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Set the generation attempt budget
    pub fn with_retry_limit(mut self, limit: u32) -> Self {
        self.retry_limit = limit;
        self
    }

    /// Set the model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Number of admission rounds actually run; a retry limit of 0 still
    /// performs one round
    pub fn attempt_budget(&self) -> u32 {
        self.retry_limit.max(1)
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &str) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file(&self, path: &str) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
