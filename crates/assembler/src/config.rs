//! Engine configuration.

use serde::Deserialize;

/// Deepest chain of slotted references rendered inside one another, unless
/// configured otherwise.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Settings shared by both engines.
///
/// Every field has a default, so a partial document deserializes:
///
/// ```rust
/// use assembler::EngineConfig;
///
/// let config: EngineConfig = serde_json::from_str(r#"{"view_prefix":"Main"}"#).unwrap();
/// assert_eq!(config.view_prefix, "Main");
/// assert_eq!(config.interpretive_pass_limit, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Substring of template names that a request's view replaces. Empty
    /// disables view variants.
    pub view_prefix: String,
    /// Passes after which the interpretive engine reports a fault.
    pub interpretive_pass_limit: usize,
    /// Passes after which the compiled engine returns what it has.
    pub compiled_pass_limit: usize,
    /// Largest merged output, in bytes, either engine produces.
    pub output_limit: usize,
    /// Deepest chain of slotted references rendered inside one another.
    pub max_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            view_prefix: String::new(),
            interpretive_pass_limit: 100,
            compiled_pass_limit: 10,
            output_limit: 32 * 1024 * 1024,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.view_prefix = prefix.into();
        self
    }

    pub fn interpretive_pass_limit(mut self, passes: usize) -> Self {
        self.interpretive_pass_limit = passes;
        self
    }

    pub fn compiled_pass_limit(mut self, passes: usize) -> Self {
        self.compiled_pass_limit = passes;
        self
    }

    pub fn output_limit(mut self, bytes: usize) -> Self {
        self.output_limit = bytes;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}
