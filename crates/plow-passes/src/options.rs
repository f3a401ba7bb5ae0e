//! Pipeline configuration.

use serde::Deserialize;

/// Options for one lowering run, read from camelCase JSON:
///
/// ```json
/// { "parallel": true, "stopOnErrorDiagnostics": true }
/// ```
///
/// Every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoweringOptions {
    /// Apply each pass to the compilation units in parallel.
    pub parallel: bool,
    /// Stop before the next pass once any error diagnostic was reported.
    pub stop_on_error_diagnostics: bool,
    /// Re-run every pass on its own output and fail if anything changes.
    pub verify_idempotence: bool,
    /// Passes to leave out of the default pipeline, by name.
    pub disabled_passes: Vec<String>,
}

impl LoweringOptions {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn is_pass_enabled(&self, name: &str) -> bool {
        !self.disabled_passes.iter().any(|disabled| disabled == name)
    }
}
