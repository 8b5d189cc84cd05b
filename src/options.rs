//! Engine configuration
//!
//! Options arrive from the build wiring (the enable switch and the skip-inline
//! toggle) and from an optional JSON file. Every field has a default so an empty
//! object is a valid configuration.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Path of the runtime module the injected calls refer to
pub const DEFAULT_RUNTIME_PATH: &str = "::recomp_tracker::runtime";

/// Name of the host-context parameter render functions receive
pub const DEFAULT_HOST_CONTEXT: &str = "cx";

/// Label used for file-level scopes when no file name is known
pub const DEFAULT_FILE_LABEL: &str = "<unit>";

/// Options controlling analysis and instrumentation of one compilation unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstrumentOptions {
    /// Master switch; when off the unit is returned untouched
    pub enabled: bool,
    /// Treat `#[inline]` render functions as plain functions
    pub skip_inline: bool,
    /// Module path holding `recomposition_tracker`, `Arguments` and `EMPTY_ARGUMENTS`
    pub runtime_path: String,
    /// Parameter forwarded to the tracker as the host context
    pub host_context: String,
    /// Module path prepended to every qualified name
    pub module_prefix: Option<String>,
    /// Scope label for file-level declarations without a qualified name
    pub file_label: String,
    /// Type names whose values are unwrapped before diffing
    pub reactive_wrappers: Vec<String>,
}

impl Default for InstrumentOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            skip_inline: false,
            runtime_path: DEFAULT_RUNTIME_PATH.to_string(),
            host_context: DEFAULT_HOST_CONTEXT.to_string(),
            module_prefix: None,
            file_label: DEFAULT_FILE_LABEL.to_string(),
            reactive_wrappers: ["State", "Signal", "ReadSignal", "Memo"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl InstrumentOptions {
    /// Load options from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse options from JSON text
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::config(e.to_string()))
    }

    /// Whether a type name (last path segment) is a reactive wrapper
    pub fn is_reactive_wrapper(&self, type_name: &str) -> bool {
        self.reactive_wrappers.iter().any(|w| w == type_name)
    }

    /// Module prefix split into path segments
    pub fn module_prefix_segments(&self) -> Vec<String> {
        self.module_prefix
            .as_deref()
            .map(|prefix| {
                prefix
                    .split("::")
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }
}
