//! Inline-phase handlers: fact collection.

use weft_dom::NodeKind;
use weft_dom::inline::Inline;

use crate::phase::{HandlerContext, HandlerError, InlineAction, Phase, PhaseHandler};
use crate::state::classify_script;

/// Records citation keys into the render state, in first-seen order.
/// Bibliography material itself comes from a fragment triggered by these
/// facts in the second activation round.
pub struct CollectCitations;

impl PhaseHandler for CollectCitations {
    fn name(&self) -> &'static str {
        "collect-citations"
    }

    fn registrations(&self) -> Vec<(Phase, NodeKind)> {
        vec![(Phase::Inline, NodeKind::Cite)]
    }

    fn handle_inline(
        &self,
        inline: &mut Inline,
        cx: &mut HandlerContext<'_>,
    ) -> Result<InlineAction, HandlerError> {
        if let Inline::Cite(cite) = inline {
            for key in &cite.keys {
                cx.state.record_citation(key.clone());
            }
        }
        Ok(InlineAction::Keep)
    }
}

/// Tallies which scripts appear in text runs, so font-support fragments
/// can activate on actual content.
pub struct CollectScripts;

impl PhaseHandler for CollectScripts {
    fn name(&self) -> &'static str {
        "collect-scripts"
    }

    fn registrations(&self) -> Vec<(Phase, NodeKind)> {
        vec![(Phase::Inline, NodeKind::Str)]
    }

    fn handle_inline(
        &self,
        inline: &mut Inline,
        cx: &mut HandlerContext<'_>,
    ) -> Result<InlineAction, HandlerError> {
        if let Inline::Str(s) = inline {
            let mut seen_in_run: Option<&'static str> = None;
            for c in s.text.chars() {
                if let Some(script) = classify_script(c)
                    && seen_in_run != Some(script)
                {
                    cx.state.record_script(script);
                    seen_in_run = Some(script);
                }
            }
        }
        Ok(InlineAction::Keep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use weft_config::{ExecutionContext, NumberingMode};
    use weft_dom::block::{Block, Paragraph};
    use weft_dom::inline::Cite;
    use weft_error_reporting::DiagnosticCollector;

    use crate::phase::{Phase, PhaseEngine};
    use crate::slots::SlotFragment;
    use crate::state::RenderState;

    fn run_inline(blocks: Vec<Block>) -> RenderState {
        let mut engine = PhaseEngine::new();
        engine.register(Box::new(CollectCitations));
        engine.register(Box::new(CollectScripts));
        let mut slot = SlotFragment {
            slot_name: "body".to_string(),
            blocks,
            matched: true,
            level_shift: 0,
        };
        let ctx = ExecutionContext {
            document_ref: "doc.qmd".to_string(),
            resolved_attributes: IndexMap::new(),
            active_fragments: vec![],
            slot_requests: IndexMap::new(),
            language: "en".to_string(),
            numbering_mode: NumberingMode::Numbered,
            partial_providers: IndexMap::new(),
            base_level_override: 0,
        };
        let mut state = RenderState::new();
        let mut diagnostics = DiagnosticCollector::new();
        engine
            .run_phase(Phase::Inline, &mut slot, &ctx, &mut state, &mut diagnostics)
            .unwrap();
        state
    }

    #[test]
    fn citations_recorded_in_document_order() {
        let blocks = vec![Block::Paragraph(Paragraph {
            content: vec![
                Inline::Cite(Cite {
                    keys: vec!["b".to_string(), "a".to_string()],
                    content: vec![],
                }),
                Inline::Cite(Cite {
                    keys: vec!["a".to_string()],
                    content: vec![],
                }),
            ],
        })];
        let state = run_inline(blocks);
        let keys: Vec<_> = state.citations.iter().cloned().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn scripts_tallied_from_text_runs() {
        let blocks = vec![Block::Paragraph(Paragraph {
            content: vec![Inline::str("αβγ and 漢字")],
        })];
        let state = run_inline(blocks);
        let facts = state.to_facts();
        assert!(facts.script_present("greek"));
        assert!(facts.script_present("han"));
        assert!(!facts.script_present("hebrew"));
    }
}
