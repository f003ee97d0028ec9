//! Tree traversal helpers.

use crate::block::{Block, Blocks};
use crate::inline::{Inline, Inlines};

/// Visit every block in the tree, preorder, including blocks nested in
/// quotes, divs, figures, list items and footnotes.
pub fn visit_blocks_mut(blocks: &mut Blocks, f: &mut impl FnMut(&mut Block)) {
    for block in blocks.iter_mut() {
        f(block);
        match block {
            Block::BlockQuote(quote) => visit_blocks_mut(&mut quote.content, f),
            Block::Div(div) => visit_blocks_mut(&mut div.content, f),
            Block::Figure(figure) => visit_blocks_mut(&mut figure.content, f),
            Block::OrderedList(list) => {
                for item in &mut list.content {
                    visit_blocks_mut(item, f);
                }
            }
            Block::BulletList(list) => {
                for item in &mut list.content {
                    visit_blocks_mut(item, f);
                }
            }
            Block::DefinitionList(list) => {
                for (_, definitions) in &mut list.content {
                    for definition in definitions {
                        visit_blocks_mut(definition, f);
                    }
                }
            }
            Block::Plain(plain) => visit_note_blocks(&mut plain.content, f),
            Block::Paragraph(para) => visit_note_blocks(&mut para.content, f),
            Block::Header(header) => visit_note_blocks(&mut header.content, f),
            _ => {}
        }
    }
}

fn visit_note_blocks(inlines: &mut Inlines, f: &mut impl FnMut(&mut Block)) {
    for inline in inlines.iter_mut() {
        match inline {
            Inline::Note(note) => visit_blocks_mut(&mut note.content, f),
            Inline::Emph(e) => visit_note_blocks(&mut e.content, f),
            Inline::Strong(s) => visit_note_blocks(&mut s.content, f),
            Inline::Link(l) => visit_note_blocks(&mut l.content, f),
            Inline::Image(i) => visit_note_blocks(&mut i.content, f),
            Inline::Span(s) => visit_note_blocks(&mut s.content, f),
            Inline::Cite(c) => visit_note_blocks(&mut c.content, f),
            _ => {}
        }
    }
}

/// Visit every inline anywhere in the block tree, preorder.
pub fn visit_inlines_mut(blocks: &mut Blocks, f: &mut impl FnMut(&mut Inline)) {
    visit_blocks_mut(blocks, &mut |block| match block {
        Block::Plain(plain) => visit_inline_seq(&mut plain.content, f),
        Block::Paragraph(para) => visit_inline_seq(&mut para.content, f),
        Block::Header(header) => visit_inline_seq(&mut header.content, f),
        Block::Figure(figure) => visit_inline_seq(&mut figure.caption, f),
        Block::DefinitionList(list) => {
            for (term, _) in &mut list.content {
                visit_inline_seq(term, f);
            }
        }
        _ => {}
    });
}

fn visit_inline_seq(inlines: &mut Inlines, f: &mut impl FnMut(&mut Inline)) {
    for inline in inlines.iter_mut() {
        f(inline);
        match inline {
            Inline::Emph(e) => visit_inline_seq(&mut e.content, f),
            Inline::Strong(s) => visit_inline_seq(&mut s.content, f),
            Inline::Link(l) => visit_inline_seq(&mut l.content, f),
            Inline::Image(i) => visit_inline_seq(&mut i.content, f),
            Inline::Span(s) => visit_inline_seq(&mut s.content, f),
            Inline::Cite(c) => visit_inline_seq(&mut c.content, f),
            _ => {}
        }
    }
}

/// Flatten inlines to plain text (for selectors and promoted titles).
pub fn inlines_to_text(inlines: &Inlines) -> String {
    let mut out = String::new();
    collect_text(inlines, &mut out);
    out
}

fn collect_text(inlines: &Inlines, out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Str(s) => out.push_str(&s.text),
            Inline::Code(c) => out.push_str(&c.text),
            Inline::Math(m) => out.push_str(&m.text),
            Inline::Space(_) | Inline::SoftBreak(_) | Inline::LineBreak(_) => out.push(' '),
            Inline::Emph(e) => collect_text(&e.content, out),
            Inline::Strong(s) => collect_text(&s.content, out),
            Inline::Link(l) => collect_text(&l.content, out),
            Inline::Image(i) => collect_text(&i.content, out),
            Inline::Span(s) => collect_text(&s.content, out),
            Inline::Cite(c) => collect_text(&c.content, out),
            Inline::RawInline(_) | Inline::Note(_) => {}
        }
    }
}

/// The level of the shallowest header anywhere in the tree, if any.
pub fn shallowest_heading_level(blocks: &Blocks) -> Option<i64> {
    let mut shallowest: Option<i64> = None;
    // visit_blocks_mut requires &mut; scan without mutation instead
    scan_headings(blocks, &mut shallowest);
    shallowest
}

fn scan_headings(blocks: &Blocks, shallowest: &mut Option<i64>) {
    for block in blocks {
        match block {
            Block::Header(header) => {
                *shallowest = Some(match shallowest {
                    Some(level) => (*level).min(header.level),
                    None => header.level,
                });
            }
            Block::BlockQuote(quote) => scan_headings(&quote.content, shallowest),
            Block::Div(div) => scan_headings(&div.content, shallowest),
            Block::Figure(figure) => scan_headings(&figure.content, shallowest),
            Block::OrderedList(list) => {
                for item in &list.content {
                    scan_headings(item, shallowest);
                }
            }
            Block::BulletList(list) => {
                for item in &list.content {
                    scan_headings(item, shallowest);
                }
            }
            Block::DefinitionList(list) => {
                for (_, definitions) in &list.content {
                    for definition in definitions {
                        scan_headings(definition, shallowest);
                    }
                }
            }
            _ => {}
        }
    }
}
