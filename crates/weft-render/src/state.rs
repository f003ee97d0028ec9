//! The render-state accumulator.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use weft_config::ContentFacts;

/// A heading encountered during the post phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingRecord {
    pub level: i64,
    pub text: String,
    pub numbered: bool,
}

/// Mutable facts accumulated while rendering a document.
///
/// One instance is threaded through every slot's phase passes (single
/// writer per pass) and flushed into the output and into the content
/// facts that drive the second fragment-activation round.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderState {
    /// Citation keys in first-seen order, deduplicated.
    pub citations: IndexSet<String>,
    /// Index terms in document order.
    pub index_terms: Vec<String>,
    /// Asset references (image targets) in document order.
    pub assets: Vec<String>,
    /// Script name → count of text runs using it.
    pub script_usage: IndexMap<String, usize>,
    /// Headings in document order, recorded in the post phase.
    pub headings_seen: Vec<HeadingRecord>,
}

impl RenderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a citation key; returns true if it was new.
    pub fn record_citation(&mut self, key: impl Into<String>) -> bool {
        self.citations.insert(key.into())
    }

    pub fn record_index_term(&mut self, term: impl Into<String>) {
        self.index_terms.push(term.into());
    }

    pub fn record_asset(&mut self, target: impl Into<String>) {
        self.assets.push(target.into());
    }

    pub fn record_script(&mut self, script: &str) {
        *self.script_usage.entry(script.to_string()).or_insert(0) += 1;
    }

    /// The facts the resolver's second activation round consumes.
    pub fn to_facts(&self) -> ContentFacts {
        ContentFacts {
            citations_present: !self.citations.is_empty(),
            index_terms_present: !self.index_terms.is_empty(),
            script_usage: self.script_usage.clone(),
        }
    }
}

/// Classify a character into a coarse script bucket, for font-coverage
/// triggers. Selection of actual font families is a collaborator's job.
pub fn classify_script(c: char) -> Option<&'static str> {
    let code = c as u32;
    match code {
        0x0041..=0x024F => Some("latin"),
        0x0370..=0x03FF => Some("greek"),
        0x0400..=0x04FF => Some("cyrillic"),
        0x0590..=0x05FF => Some("hebrew"),
        0x0600..=0x06FF => Some("arabic"),
        0x3040..=0x30FF => Some("kana"),
        0x4E00..=0x9FFF => Some("han"),
        0xAC00..=0xD7AF => Some("hangul"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn citations_deduplicate_in_order() {
        let mut state = RenderState::new();
        assert!(state.record_citation("knuth1984"));
        assert!(state.record_citation("lamport1994"));
        assert!(!state.record_citation("knuth1984"));
        let keys: Vec<_> = state.citations.iter().cloned().collect();
        assert_eq!(keys, vec!["knuth1984", "lamport1994"]);
    }

    #[test]
    fn facts_reflect_state() {
        let mut state = RenderState::new();
        assert!(!state.to_facts().citations_present);
        state.record_citation("a");
        state.record_script("greek");
        let facts = state.to_facts();
        assert!(facts.citations_present);
        assert!(facts.script_present("greek"));
        assert!(!facts.script_present("han"));
    }

    #[test]
    fn script_classification() {
        assert_eq!(classify_script('a'), Some("latin"));
        assert_eq!(classify_script('λ'), Some("greek"));
        assert_eq!(classify_script('中'), Some("han"));
        assert_eq!(classify_script('1'), None);
    }
}
