//! Engine configuration

use serde::{Deserialize, Serialize};

/// Knobs for an [`Engine`](crate::engine::Engine)
///
/// Deserializes with every field optional so a host can embed it in its
/// own configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Also register the root supplier under `$$root` in the registry seen
    /// by the root scope. The root is always invoked by reference; this
    /// only makes it demandable by name from below.
    pub register_root: bool,

    /// Record per-capability demand metrics
    pub collect_metrics: bool,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_root(mut self, enabled: bool) -> Self {
        self.register_root = enabled;
        self
    }

    pub fn collect_metrics(mut self, enabled: bool) -> Self {
        self.collect_metrics = enabled;
        self
    }
}
