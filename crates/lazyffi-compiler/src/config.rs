//! Compiler configuration.

use lazyffi_codegen::{CodegenOptions, LintLevel};
use serde::{Deserialize, Serialize};

/// Options for one compilation, usually read from JSON.
///
/// ```json
/// { "lint": "deny", "extra_globals": ["jQuery"], "emit_prelude": false }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FfiConfig {
    /// Level of the naked property access lint.
    pub lint: LintLevel,
    /// Identifiers added to the lint's allow-list of known globals.
    pub extra_globals: Vec<String>,
    /// Prepend the host runtime prelude to the generated module.
    pub emit_prelude: bool,
}

impl Default for FfiConfig {
    fn default() -> Self {
        Self {
            lint: LintLevel::Warn,
            extra_globals: Vec::new(),
            emit_prelude: true,
        }
    }
}

impl FfiConfig {
    /// Parse a JSON configuration. An empty document gives the defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json)
    }

    pub fn codegen_options(&self) -> CodegenOptions {
        CodegenOptions {
            lint: self.lint,
            extra_globals: self.extra_globals.clone(),
            emit_prelude: self.emit_prelude,
        }
    }
}
