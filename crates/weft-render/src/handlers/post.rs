//! Post-phase handlers: cross-cutting finalization.

use weft_config::NumberingMode;
use weft_dom::NodeKind;
use weft_dom::block::Block;
use weft_dom::inline::Inline;
use weft_dom::inlines_to_text;

use crate::phase::{BlockAction, HandlerContext, HandlerError, InlineAction, Phase, PhaseHandler};
use crate::state::HeadingRecord;

/// Under document-wide unnumbered mode, marks every heading with the
/// `unnumbered` class so the tree matches what the writer emits.
pub struct MarkUnnumbered;

impl PhaseHandler for MarkUnnumbered {
    fn name(&self) -> &'static str {
        "mark-unnumbered"
    }

    fn registrations(&self) -> Vec<(Phase, NodeKind)> {
        vec![(Phase::Post, NodeKind::Header)]
    }

    fn handle_block(
        &self,
        block: &mut Block,
        cx: &mut HandlerContext<'_>,
    ) -> Result<BlockAction, HandlerError> {
        if cx.ctx.numbering_mode == NumberingMode::Unnumbered
            && let Block::Header(header) = block
            && !header.attr.has_class("unnumbered")
        {
            header.attr.classes.push("unnumbered".to_string());
        }
        Ok(BlockAction::Keep)
    }
}

/// Records every heading (aligned level, flattened text, numbering) for
/// table-of-contents material.
pub struct RecordHeadings;

impl PhaseHandler for RecordHeadings {
    fn name(&self) -> &'static str {
        "record-headings"
    }

    fn registrations(&self) -> Vec<(Phase, NodeKind)> {
        vec![(Phase::Post, NodeKind::Header)]
    }

    fn handle_block(
        &self,
        block: &mut Block,
        cx: &mut HandlerContext<'_>,
    ) -> Result<BlockAction, HandlerError> {
        if let Block::Header(header) = block {
            let numbered = cx.ctx.numbering_mode == NumberingMode::Numbered
                && !header.attr.has_class("unnumbered");
            cx.state.headings_seen.push(HeadingRecord {
                level: header.level,
                text: inlines_to_text(&header.content),
                numbered,
            });
        }
        Ok(BlockAction::Keep)
    }
}

/// Records image targets as asset references.
pub struct RecordAssets;

impl PhaseHandler for RecordAssets {
    fn name(&self) -> &'static str {
        "record-assets"
    }

    fn registrations(&self) -> Vec<(Phase, NodeKind)> {
        vec![(Phase::Post, NodeKind::Image)]
    }

    fn handle_inline(
        &self,
        inline: &mut Inline,
        cx: &mut HandlerContext<'_>,
    ) -> Result<InlineAction, HandlerError> {
        if let Inline::Image(image) = inline {
            cx.state.record_asset(image.target.clone());
        }
        Ok(InlineAction::Keep)
    }
}

/// Records `index-term` spans. The term is the `term` attribute when
/// present, the span's flattened text otherwise.
pub struct RecordIndexTerms;

impl PhaseHandler for RecordIndexTerms {
    fn name(&self) -> &'static str {
        "record-index-terms"
    }

    fn registrations(&self) -> Vec<(Phase, NodeKind)> {
        vec![(Phase::Post, NodeKind::Span)]
    }

    fn handle_inline(
        &self,
        inline: &mut Inline,
        cx: &mut HandlerContext<'_>,
    ) -> Result<InlineAction, HandlerError> {
        if let Inline::Span(span) = inline
            && span.attr.has_class("index-term")
        {
            let term = span
                .attr
                .get("term")
                .map(str::to_string)
                .unwrap_or_else(|| inlines_to_text(&span.content));
            cx.state.record_index_term(term);
        }
        Ok(InlineAction::Keep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use weft_config::ExecutionContext;
    use weft_dom::attr::Attr;
    use weft_dom::block::{Header, Paragraph};
    use weft_dom::inline::{Image, Span};
    use weft_error_reporting::DiagnosticCollector;

    use crate::phase::PhaseEngine;
    use crate::slots::SlotFragment;
    use crate::state::RenderState;

    fn context(numbering: NumberingMode) -> ExecutionContext {
        ExecutionContext {
            document_ref: "doc.qmd".to_string(),
            resolved_attributes: IndexMap::new(),
            active_fragments: vec![],
            slot_requests: IndexMap::new(),
            language: "en".to_string(),
            numbering_mode: numbering,
            partial_providers: IndexMap::new(),
            base_level_override: 0,
        }
    }

    fn run_post(blocks: Vec<Block>, numbering: NumberingMode) -> (Vec<Block>, RenderState) {
        let mut engine = PhaseEngine::new();
        engine.register(Box::new(MarkUnnumbered));
        engine.register(Box::new(RecordHeadings));
        engine.register(Box::new(RecordAssets));
        engine.register(Box::new(RecordIndexTerms));
        let mut slot = SlotFragment {
            slot_name: "body".to_string(),
            blocks,
            matched: true,
            level_shift: 0,
        };
        let ctx = context(numbering);
        let mut state = RenderState::new();
        let mut diagnostics = DiagnosticCollector::new();
        engine
            .run_phase(Phase::Post, &mut slot, &ctx, &mut state, &mut diagnostics)
            .unwrap();
        (slot.blocks, state)
    }

    fn header(level: i64, text: &str) -> Block {
        Block::Header(Header {
            level,
            attr: Attr::empty(),
            content: vec![Inline::str(text)],
        })
    }

    #[test]
    fn headings_recorded_with_numbering() {
        let (_, state) = run_post(vec![header(1, "Intro")], NumberingMode::Numbered);
        assert_eq!(
            state.headings_seen,
            vec![HeadingRecord {
                level: 1,
                text: "Intro".to_string(),
                numbered: true,
            }]
        );
    }

    #[test]
    fn unnumbered_mode_marks_and_records() {
        let (blocks, state) = run_post(vec![header(1, "Intro")], NumberingMode::Unnumbered);
        assert!(matches!(&blocks[0], Block::Header(h) if h.attr.has_class("unnumbered")));
        assert!(!state.headings_seen[0].numbered);
    }

    #[test]
    fn assets_and_index_terms_recorded() {
        let mut span_attr = Attr::with_classes(["index-term"]);
        span_attr
            .attributes
            .push(("term".to_string(), "typesetting".to_string()));
        let blocks = vec![Block::Paragraph(Paragraph {
            content: vec![
                Inline::Image(Image {
                    attr: Attr::empty(),
                    content: vec![],
                    target: "figs/plot.png".to_string(),
                    title: String::new(),
                }),
                Inline::Span(Span {
                    attr: span_attr,
                    content: vec![Inline::str("TeX")],
                }),
            ],
        })];
        let (_, state) = run_post(blocks, NumberingMode::Numbered);
        assert_eq!(state.assets, vec!["figs/plot.png"]);
        assert_eq!(state.index_terms, vec!["typesetting"]);
    }
}
