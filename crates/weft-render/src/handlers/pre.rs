//! Pre-phase handlers: structural normalization.

use weft_config::{expand_placeholders, has_placeholders};
use weft_dom::NodeKind;
use weft_dom::block::Block;
use weft_dom::inline::Inline;
use weft_error_reporting::{DiagnosticMessageBuilder, Location};

use crate::phase::{BlockAction, HandlerContext, HandlerError, InlineAction, Phase, PhaseHandler};

/// Raw formats the LaTeX target keeps; everything else is dropped.
fn format_is_native(format: &str) -> bool {
    matches!(format, "latex" | "tex")
}

/// Drops raw blocks and inlines written for other output targets.
pub struct DropForeignRaw;

impl PhaseHandler for DropForeignRaw {
    fn name(&self) -> &'static str {
        "drop-foreign-raw"
    }

    fn registrations(&self) -> Vec<(Phase, NodeKind)> {
        vec![(Phase::Pre, NodeKind::RawBlock), (Phase::Pre, NodeKind::RawInline)]
    }

    fn handle_block(
        &self,
        block: &mut Block,
        _cx: &mut HandlerContext<'_>,
    ) -> Result<BlockAction, HandlerError> {
        match block {
            Block::RawBlock(raw) if !format_is_native(&raw.format) => Ok(BlockAction::Remove),
            _ => Ok(BlockAction::Keep),
        }
    }

    fn handle_inline(
        &self,
        inline: &mut Inline,
        _cx: &mut HandlerContext<'_>,
    ) -> Result<InlineAction, HandlerError> {
        match inline {
            Inline::RawInline(raw) if !format_is_native(&raw.format) => Ok(InlineAction::Remove),
            _ => Ok(InlineAction::Keep),
        }
    }
}

/// Unwraps divs and spans that carry no id, class or key-value attributes.
/// Wrappers with attributes may be slot markers or partial targets and
/// stay put.
pub struct UnwrapWrappers;

impl PhaseHandler for UnwrapWrappers {
    fn name(&self) -> &'static str {
        "unwrap-wrappers"
    }

    fn registrations(&self) -> Vec<(Phase, NodeKind)> {
        vec![(Phase::Pre, NodeKind::Div), (Phase::Pre, NodeKind::Span)]
    }

    fn handle_block(
        &self,
        block: &mut Block,
        _cx: &mut HandlerContext<'_>,
    ) -> Result<BlockAction, HandlerError> {
        match block {
            Block::Div(div) if div.attr.is_empty() => {
                Ok(BlockAction::Splice(std::mem::take(&mut div.content)))
            }
            _ => Ok(BlockAction::Keep),
        }
    }

    fn handle_inline(
        &self,
        inline: &mut Inline,
        _cx: &mut HandlerContext<'_>,
    ) -> Result<InlineAction, HandlerError> {
        match inline {
            Inline::Span(span) if span.attr.is_empty() => {
                Ok(InlineAction::Splice(std::mem::take(&mut span.content)))
            }
            _ => Ok(InlineAction::Keep),
        }
    }
}

/// Expands `{{name}}` placeholders in text runs against the resolved
/// attributes. Unknown names stay verbatim and warn once per occurrence.
pub struct ExpandTextPlaceholders;

impl PhaseHandler for ExpandTextPlaceholders {
    fn name(&self) -> &'static str {
        "expand-text-placeholders"
    }

    fn registrations(&self) -> Vec<(Phase, NodeKind)> {
        vec![(Phase::Pre, NodeKind::Str)]
    }

    fn handle_inline(
        &self,
        inline: &mut Inline,
        cx: &mut HandlerContext<'_>,
    ) -> Result<InlineAction, HandlerError> {
        let Inline::Str(s) = inline else {
            return Ok(InlineAction::Keep);
        };
        if !has_placeholders(&s.text) {
            return Ok(InlineAction::Keep);
        }
        let (expanded, unknown) = expand_placeholders(&s.text, &cx.ctx.resolved_attributes);
        s.text = expanded;
        for name in unknown {
            let location = Location::in_slot("render", cx.slot).at_node(cx.node_path());
            cx.diagnostics.push(
                DiagnosticMessageBuilder::warning("Unknown placeholder")
                    .with_code("W-RES-3")
                    .problem(format!("Placeholder `{{{{{name}}}}}` matches no attribute."))
                    .add_hint("The token is left verbatim in the output.")
                    .at(location)
                    .build(),
            );
        }
        Ok(InlineAction::Keep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use weft_config::{AttrValue, ExecutionContext, NumberingMode};
    use weft_dom::attr::Attr;
    use weft_dom::block::{Blocks, Div, Paragraph, RawBlock};
    use weft_error_reporting::DiagnosticCollector;

    use crate::phase::PhaseEngine;
    use crate::slots::SlotFragment;
    use crate::state::RenderState;

    fn context_with(attrs: Vec<(&str, AttrValue)>) -> ExecutionContext {
        let mut resolved = IndexMap::new();
        for (name, value) in attrs {
            resolved.insert(name.to_string(), value);
        }
        ExecutionContext {
            document_ref: "doc.qmd".to_string(),
            resolved_attributes: resolved,
            active_fragments: vec![],
            slot_requests: IndexMap::new(),
            language: "en".to_string(),
            numbering_mode: NumberingMode::Numbered,
            partial_providers: IndexMap::new(),
            base_level_override: 0,
        }
    }

    fn run_pre(blocks: Blocks, ctx: &ExecutionContext) -> (Blocks, DiagnosticCollector) {
        let mut engine = PhaseEngine::new();
        engine.register(Box::new(DropForeignRaw));
        engine.register(Box::new(UnwrapWrappers));
        engine.register(Box::new(ExpandTextPlaceholders));
        let mut slot = SlotFragment {
            slot_name: "body".to_string(),
            blocks,
            matched: true,
            level_shift: 0,
        };
        let mut state = RenderState::new();
        let mut diagnostics = DiagnosticCollector::new();
        engine
            .run_phase(Phase::Pre, &mut slot, ctx, &mut state, &mut diagnostics)
            .unwrap();
        (slot.blocks, diagnostics)
    }

    fn para(text: &str) -> Block {
        Block::Paragraph(Paragraph {
            content: vec![Inline::str(text)],
        })
    }

    #[test]
    fn foreign_raw_blocks_are_dropped() {
        let ctx = context_with(vec![]);
        let blocks = vec![
            Block::RawBlock(RawBlock {
                format: "html".to_string(),
                text: "<hr>".to_string(),
            }),
            Block::RawBlock(RawBlock {
                format: "latex".to_string(),
                text: "\\newpage".to_string(),
            }),
        ];
        let (out, _) = run_pre(blocks, &ctx);
        assert_eq!(out.len(), 1);
        assert!(matches!(&out[0], Block::RawBlock(r) if r.format == "latex"));
    }

    #[test]
    fn attributeless_wrappers_unwrap() {
        let ctx = context_with(vec![]);
        let blocks = vec![Block::Div(Div {
            attr: Attr::empty(),
            content: vec![para("inner")],
        })];
        let (out, _) = run_pre(blocks, &ctx);
        assert_eq!(out, vec![para("inner")]);

        // a marked div stays
        let blocks = vec![Block::Div(Div {
            attr: Attr::with_classes(["appendix"]),
            content: vec![para("inner")],
        })];
        let (out, _) = run_pre(blocks, &ctx);
        assert!(matches!(&out[0], Block::Div(_)));
    }

    #[test]
    fn text_placeholders_expand_and_unknown_warn() {
        let ctx = context_with(vec![("version", AttrValue::from("2.1"))]);
        let blocks = vec![para("v{{version}} by {{author}}")];
        let (out, diagnostics) = run_pre(blocks, &ctx);
        assert_eq!(out, vec![para("v2.1 by {{author}}")]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.messages()[0].code.as_deref(), Some("W-RES-3"));
    }
}
