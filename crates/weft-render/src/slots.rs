//! Slot extraction and heading alignment.
//!
//! Slots are the template's named insertion points. The extractor detaches
//! each requested slot's subtree from the document, leaves the rest as the
//! `body` slot, and computes per-slot heading shifts so that each slot's
//! shallowest heading lands on the level its spec asks for.

use indexmap::IndexMap;
use weft_config::{AttrValue, ExecutionContext, SlotSelector};
use weft_dom::block::{Block, Blocks};
use weft_dom::{Document, inlines_to_text, shallowest_heading_level};
use weft_error_reporting::{DiagnosticCollector, DiagnosticMessageBuilder, Location};

/// One detached slot subtree, ready for phase processing.
#[derive(Debug, Clone)]
pub struct SlotFragment {
    pub slot_name: String,
    pub blocks: Blocks,
    /// Whether a selector actually matched (false for the implicit body
    /// slot and for unresolved selectors).
    pub matched: bool,
    /// Total heading shift applied during the block phase. Computed from
    /// the slot spec, the document-wide base-level override, and the
    /// slot's own shallowest heading; independent across slots.
    pub level_shift: i64,
}

/// Extracted slots in template declaration order.
pub type SlotMap = IndexMap<String, SlotFragment>;

/// Detach slot subtrees from the document and compute heading shifts.
///
/// Every requested slot appears in the result, matched or not; unresolved
/// selectors produce a warning and an empty fragment, and their would-be
/// content stays in the body. The body slot receives everything that no
/// selector claimed.
pub fn extract_slots(
    doc: &mut Document,
    ctx: &ExecutionContext,
    diagnostics: &mut DiagnosticCollector,
) -> SlotMap {
    let mut slots = SlotMap::new();
    let mut remaining = std::mem::take(&mut doc.blocks);

    for (name, request) in &ctx.slot_requests {
        if name == "body" {
            continue;
        }
        let extracted = request
            .selector
            .as_ref()
            .and_then(|selector| carve(&mut remaining, selector));
        let (blocks, matched) = match extracted {
            Some(blocks) => (blocks, true),
            None => {
                if let Some(selector) = &request.selector {
                    diagnostics.push(
                        DiagnosticMessageBuilder::warning("Unresolved slot selector")
                            .with_code("W-SLT-1")
                            .problem(format!("No subtree matched the selector for slot `{name}`."))
                            .add_detail(format!("selector was {selector}"))
                            .add_hint("The slot renders empty; its content stays in the body.")
                            .at(Location::in_slot("slots", name.clone()))
                            .build(),
                    );
                }
                (Vec::new(), false)
            }
        };
        let shift = level_shift(&blocks, request.spec.base_level, request.spec.offset, ctx);
        slots.insert(
            name.clone(),
            SlotFragment {
                slot_name: name.clone(),
                blocks,
                matched,
                level_shift: shift,
            },
        );
    }

    if title_promotion_enabled(ctx) {
        promote_title(doc, &mut remaining);
    }

    let body_spec = ctx
        .slot_requests
        .get("body")
        .map(|r| (r.spec.base_level, r.spec.offset))
        .unwrap_or((1, 0));
    let shift = level_shift(&remaining, body_spec.0, body_spec.1, ctx);
    let body = SlotFragment {
        slot_name: "body".to_string(),
        blocks: remaining,
        matched: false,
        level_shift: shift,
    };
    // body keeps the position the template declared it at
    let body_index = ctx
        .slot_requests
        .get_index_of("body")
        .unwrap_or(0)
        .min(slots.len());
    slots.shift_insert(body_index, "body".to_string(), body);
    slots
}

/// The heading shift for one slot: normalize the slot's shallowest heading
/// to level 1, then move it to `base_level`, plus the declared offsets.
fn level_shift(blocks: &Blocks, base_level: i64, offset: i64, ctx: &ExecutionContext) -> i64 {
    let normalize = match shallowest_heading_level(blocks) {
        Some(shallowest) => 1 - shallowest,
        None => 0,
    };
    base_level + offset + ctx.base_level_override + normalize - 1
}

/// Remove the matched subtree for a selector from `blocks`, if present.
///
/// Heading selectors claim the blocks after the matched heading up to the
/// next heading of the same or shallower level; the heading itself is
/// consumed. Marker selectors claim a div's content and consume the div.
fn carve(blocks: &mut Blocks, selector: &SlotSelector) -> Option<Blocks> {
    let start = blocks.iter().position(|block| matches(block, selector))?;
    let heading_level = match &blocks[start] {
        Block::Div(_) => None,
        Block::Header(header) => Some(header.level),
        _ => return None,
    };
    match heading_level {
        None => {
            let Block::Div(div) = blocks.remove(start) else {
                unreachable!()
            };
            Some(div.content)
        }
        Some(level) => {
            let end = blocks[start + 1..]
                .iter()
                .position(|b| matches!(b, Block::Header(h) if h.level <= level))
                .map(|i| start + 1 + i)
                .unwrap_or(blocks.len());
            let mut carved: Blocks = blocks.drain(start..end).collect();
            carved.remove(0);
            Some(carved)
        }
    }
}

fn matches(block: &Block, selector: &SlotSelector) -> bool {
    match (block, selector) {
        (Block::Header(header), SlotSelector::HeadingText(text)) => {
            inlines_to_text(&header.content).trim().eq_ignore_ascii_case(text)
        }
        (Block::Header(header), SlotSelector::HeadingId(id)) => header.attr.id == *id,
        (Block::Div(div), SlotSelector::MarkerClass(class)) => div.attr.has_class(class),
        _ => false,
    }
}

/// Promotion is on unless the `title-promotion` attribute resolves falsy;
/// a template or document sets it to keep a unique top heading in the body.
fn title_promotion_enabled(ctx: &ExecutionContext) -> bool {
    ctx.attr("title-promotion")
        .map(AttrValue::is_truthy)
        .unwrap_or(true)
}

/// Promote a unique shallowest heading at the top of the body into the
/// document title, unless the document already has one.
fn promote_title(doc: &mut Document, body: &mut Blocks) {
    if doc.meta.contains_key("title") {
        return;
    }
    let Some(shallowest) = shallowest_heading_level(body) else {
        return;
    };
    let count = count_headings_at(body, shallowest);
    if count != 1 {
        return;
    }
    let first_is_it = matches!(body.first(), Some(Block::Header(h)) if h.level == shallowest);
    if !first_is_it {
        return;
    }
    let Block::Header(header) = body.remove(0) else {
        unreachable!()
    };
    doc.meta
        .insert("title".to_string(), inlines_to_text(&header.content));
}

fn count_headings_at(blocks: &Blocks, level: i64) -> usize {
    let mut count = 0;
    scan(blocks, level, &mut count);
    return count;

    fn scan(blocks: &Blocks, level: i64, count: &mut usize) {
        for block in blocks {
            match block {
                Block::Header(h) if h.level == level => *count += 1,
                Block::Div(div) => scan(&div.content, level, count),
                Block::BlockQuote(quote) => scan(&quote.content, level, count),
                Block::Figure(figure) => scan(&figure.content, level, count),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use weft_config::{NumberingMode, SlotRequest, SlotSpec};
    use weft_dom::attr::Attr;
    use weft_dom::block::{Div, Header, Paragraph};
    use weft_dom::inline::Inline;

    fn header(level: i64, text: &str) -> Block {
        Block::Header(Header {
            level,
            attr: Attr::empty(),
            content: vec![Inline::str(text)],
        })
    }

    fn para(text: &str) -> Block {
        Block::Paragraph(Paragraph {
            content: vec![Inline::str(text)],
        })
    }

    fn context(slots: Vec<(&str, SlotSpec, Option<SlotSelector>)>) -> ExecutionContext {
        let mut slot_requests = IndexMap::new();
        for (name, spec, selector) in slots {
            slot_requests.insert(name.to_string(), SlotRequest { spec, selector });
        }
        ExecutionContext {
            document_ref: "doc.qmd".to_string(),
            resolved_attributes: IndexMap::new(),
            active_fragments: vec![],
            slot_requests,
            language: "en".to_string(),
            numbering_mode: NumberingMode::Numbered,
            partial_providers: IndexMap::new(),
            base_level_override: 0,
        }
    }

    #[test]
    fn heading_selector_carves_section() {
        let ctx = context(vec![
            ("body", SlotSpec::at_level(1), None),
            (
                "abstract",
                SlotSpec::at_level(1),
                Some(SlotSelector::HeadingText("Abstract".to_string())),
            ),
        ]);
        let mut doc = Document::new(vec![
            header(2, "Abstract"),
            para("short summary"),
            header(2, "Introduction"),
            para("body text"),
        ]);
        let mut diagnostics = DiagnosticCollector::new();
        let slots = extract_slots(&mut doc, &ctx, &mut diagnostics);

        let abs = &slots["abstract"];
        assert!(abs.matched);
        // matched heading is consumed, content follows
        assert_eq!(abs.blocks, vec![para("short summary")]);
        // body keeps the rest
        assert_eq!(
            slots["body"].blocks,
            vec![header(2, "Introduction"), para("body text")]
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn marker_class_carves_div_content() {
        let ctx = context(vec![(
            "appendix",
            SlotSpec::at_level(1),
            Some(SlotSelector::MarkerClass("appendix".to_string())),
        )]);
        let mut doc = Document::new(vec![
            para("intro"),
            Block::Div(Div {
                attr: Attr::with_classes(["appendix"]),
                content: vec![para("extra material")],
            }),
        ]);
        let mut diagnostics = DiagnosticCollector::new();
        let slots = extract_slots(&mut doc, &ctx, &mut diagnostics);
        assert_eq!(slots["appendix"].blocks, vec![para("extra material")]);
        assert_eq!(slots["body"].blocks, vec![para("intro")]);
    }

    #[test]
    fn unresolved_selector_warns_and_keeps_content_in_body() {
        let ctx = context(vec![(
            "abstract",
            SlotSpec::at_level(1),
            Some(SlotSelector::HeadingId("abstract".to_string())),
        )]);
        let mut doc = Document::new(vec![header(2, "Other"), para("text")]);
        let mut diagnostics = DiagnosticCollector::new();
        let slots = extract_slots(&mut doc, &ctx, &mut diagnostics);

        assert!(!slots["abstract"].matched);
        assert!(slots["abstract"].blocks.is_empty());
        assert_eq!(slots["body"].blocks.len(), 2);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.messages()[0].code.as_deref(), Some("W-SLT-1"));
    }

    #[test]
    fn level_shift_normalizes_shallowest_heading() {
        // shallowest is ## so everything shifts up by one to land on level 1
        let ctx = context(vec![("body", SlotSpec::at_level(1), None)]);
        let mut doc = Document::new(vec![
            header(2, "Overview"),
            para("a"),
            header(3, "Details"),
            header(2, "More"),
        ]);
        let mut diagnostics = DiagnosticCollector::new();
        let slots = extract_slots(&mut doc, &ctx, &mut diagnostics);
        assert_eq!(slots["body"].level_shift, -1);
    }

    #[test]
    fn level_shift_is_independent_per_slot() {
        let ctx = context(vec![
            ("body", SlotSpec::at_level(1), None),
            (
                "appendix",
                SlotSpec::at_level(2),
                Some(SlotSelector::HeadingText("Appendix".to_string())),
            ),
        ]);
        let mut doc = Document::new(vec![
            header(1, "Intro"),
            header(3, "Appendix"),
            header(4, "Tables"),
            header(1, "Done"),
        ]);
        let mut diagnostics = DiagnosticCollector::new();
        let slots = extract_slots(&mut doc, &ctx, &mut diagnostics);
        // appendix content is the level-4 heading; it lands on base 2
        assert_eq!(slots["appendix"].level_shift, 2 + (1 - 4) - 1);
        // body still has level-1 headings, no shift
        assert_eq!(slots["body"].level_shift, 0);
    }

    #[test]
    fn headingless_slot_shifts_by_base_alone() {
        let ctx = context(vec![("body", SlotSpec::at_level(2), None)]);
        let mut doc = Document::new(vec![para("no headings here")]);
        let mut diagnostics = DiagnosticCollector::new();
        let slots = extract_slots(&mut doc, &ctx, &mut diagnostics);
        assert_eq!(slots["body"].level_shift, 1);
    }

    #[test]
    fn unique_shallowest_heading_becomes_title() {
        let ctx = context(vec![("body", SlotSpec::at_level(1), None)]);
        let mut doc = Document::new(vec![
            header(1, "My Document"),
            header(2, "Intro"),
            para("text"),
        ]);
        let mut diagnostics = DiagnosticCollector::new();
        let slots = extract_slots(&mut doc, &ctx, &mut diagnostics);
        assert_eq!(doc.meta.get("title").map(String::as_str), Some("My Document"));
        assert_eq!(slots["body"].blocks.len(), 2);
        // post-promotion shallowest is ## and normalizes to level 1
        assert_eq!(slots["body"].level_shift, -1);
    }

    #[test]
    fn title_promotion_can_be_disabled() {
        let mut ctx = context(vec![("body", SlotSpec::at_level(1), None)]);
        ctx.resolved_attributes
            .insert("title-promotion".to_string(), AttrValue::Bool(false));
        let mut doc = Document::new(vec![
            header(1, "My Document"),
            header(2, "Intro"),
            para("text"),
        ]);
        let mut diagnostics = DiagnosticCollector::new();
        let slots = extract_slots(&mut doc, &ctx, &mut diagnostics);
        assert!(doc.meta.get("title").is_none());
        // the unique top heading stays in the body and anchors the shift
        assert_eq!(slots["body"].blocks.len(), 3);
        assert_eq!(slots["body"].level_shift, 0);
    }

    #[test]
    fn title_not_promoted_when_ambiguous_or_present() {
        let ctx = context(vec![("body", SlotSpec::at_level(1), None)]);
        let mut doc = Document::new(vec![header(1, "One"), header(1, "Two")]);
        let mut diagnostics = DiagnosticCollector::new();
        extract_slots(&mut doc, &ctx, &mut diagnostics);
        assert!(doc.meta.get("title").is_none());

        let mut doc = Document::new(vec![header(1, "One")]);
        doc.meta.insert("title".to_string(), "Existing".to_string());
        extract_slots(&mut doc, &ctx, &mut diagnostics);
        assert_eq!(doc.meta.get("title").map(String::as_str), Some("Existing"));
    }
}
