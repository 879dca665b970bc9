//! Manager configuration.

/// Key prefix under which checkpoint records are stored.
pub const CHECKPOINT_PREFIX: &str = "checkpoint_";

/// Configuration for a [`crate::CheckpointManager`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Prefix prepended to collection names to derive durable-store keys.
    pub checkpoint_prefix: String,

    /// Whether `initialize` creates the reserved `packets` and `schemas`
    /// collections when they are absent.
    pub bootstrap_reserved: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            checkpoint_prefix: CHECKPOINT_PREFIX.to_string(),
            bootstrap_reserved: true,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the checkpoint key prefix.
    #[must_use]
    pub fn checkpoint_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.checkpoint_prefix = prefix.into();
        self
    }

    /// Sets whether the reserved collections are bootstrapped.
    #[must_use]
    pub const fn bootstrap_reserved(mut self, value: bool) -> Self {
        self.bootstrap_reserved = value;
        self
    }
}
