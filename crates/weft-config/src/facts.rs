//! Content facts feeding the second activation round.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Facts about document content known only after the render phase passes
/// (citations seen, index terms seen, scripts used). The resolver's second
/// round re-evaluates fragment triggers against these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentFacts {
    pub citations_present: bool,
    pub index_terms_present: bool,
    /// Script name → count of text runs using it.
    pub script_usage: IndexMap<String, usize>,
}

impl ContentFacts {
    pub fn script_present(&self, script: &str) -> bool {
        self.script_usage.get(script).copied().unwrap_or(0) > 0
    }
}
