//! Engine Configuration
//!
//! Runtime options for the query engine. Every field has a default, so an
//! empty JSON object is a valid configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default value for `emit_distinct_changes_only`.
pub const EMIT_DISTINCT_CHANGES_ONLY_DEFAULT_VALUE: bool = true;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// When `false`, every query defined through the engine notifies on each
    /// recomputation, whatever its own definition asks for.
    pub emit_distinct_changes_only: bool,
    /// Emit a `trace` event for every candidate value collected by a query.
    pub trace_traversal: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            emit_distinct_changes_only: EMIT_DISTINCT_CHANGES_ONLY_DEFAULT_VALUE,
            trace_traversal: false,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(content: &str) -> anyhow::Result<Self> {
        let config: EngineConfig = serde_json::from_str(content)?;
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}
