//! LaTeX serialization.
//!
//! The writer turns a phase-processed slot tree into LaTeX text. Each
//! node kind is rendered by its bound partial: either the core default
//! below or an override template expanded against the node's variables
//! plus the resolved attributes.

use indexmap::IndexMap;
use weft_config::{AttrValue, ExecutionContext, NumberingMode, expand_placeholders};
use weft_dom::block::{Block, Blocks, Header};
use weft_dom::inline::{Inline, Inlines, MathKind};

use crate::partials::{PartialSet, PartialSource};

/// Escape text for use in LaTeX body position.
pub fn escape_latex(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '$' => out.push_str("\\$"),
            '&' => out.push_str("\\&"),
            '#' => out.push_str("\\#"),
            '^' => out.push_str("\\textasciicircum{}"),
            '_' => out.push_str("\\_"),
            '%' => out.push_str("\\%"),
            '~' => out.push_str("\\textasciitilde{}"),
            other => out.push(other),
        }
    }
    out
}

/// The sectioning command for an aligned heading level, if one exists.
///
/// Levels outside -1..=5 have no LaTeX counterpart; the writer clamps
/// before calling this.
pub fn section_command(level: i64) -> Option<&'static str> {
    match level {
        -1 => Some("part"),
        0 => Some("chapter"),
        1 => Some("section"),
        2 => Some("subsection"),
        3 => Some("subsubsection"),
        4 => Some("paragraph"),
        5 => Some("subparagraph"),
        _ => None,
    }
}

/// Serializes one slot's blocks using the resolved partial set.
pub struct Writer<'a> {
    partials: &'a PartialSet,
    ctx: &'a ExecutionContext,
}

impl<'a> Writer<'a> {
    pub fn new(partials: &'a PartialSet, ctx: &'a ExecutionContext) -> Self {
        Writer { partials, ctx }
    }

    pub fn write_blocks(&self, blocks: &Blocks) -> String {
        let mut out = String::new();
        for block in blocks {
            self.write_block(block, &mut out);
        }
        out
    }

    pub fn write_inlines(&self, inlines: &Inlines) -> String {
        let mut out = String::new();
        for inline in inlines {
            self.write_inline(inline, &mut out);
        }
        out
    }

    fn write_block(&self, block: &Block, out: &mut String) {
        if let Some(binding) = self.partials.get(&block.kind())
            && let PartialSource::Text(template) = &binding.source
        {
            out.push_str(&self.expand_override(template, self.block_vars(block)));
            return;
        }
        self.core_block(block, out);
    }

    fn write_inline(&self, inline: &Inline, out: &mut String) {
        if let Some(binding) = self.partials.get(&inline.kind())
            && let PartialSource::Text(template) = &binding.source
        {
            out.push_str(&self.expand_override(template, self.inline_vars(inline)));
            return;
        }
        self.core_inline(inline, out);
    }

    /// Expand an override partial. Node variables shadow resolved
    /// attributes of the same name; unknown names stay verbatim (they
    /// were already reported when the manifest was resolved).
    fn expand_override(&self, template: &str, vars: IndexMap<String, AttrValue>) -> String {
        let mut scope = self.ctx.resolved_attributes.clone();
        scope.extend(vars);
        let (expanded, _unknown) = expand_placeholders(template, &scope);
        expanded
    }

    fn block_vars(&self, block: &Block) -> IndexMap<String, AttrValue> {
        let mut vars = IndexMap::new();
        match block {
            Block::Plain(plain) => {
                vars.insert("content".into(), self.write_inlines(&plain.content).into());
            }
            Block::Paragraph(para) => {
                vars.insert("content".into(), self.write_inlines(&para.content).into());
            }
            Block::CodeBlock(code) => {
                vars.insert("text".into(), AttrValue::from(code.text.as_str()));
                if let Some(language) = code.attr.classes.first() {
                    vars.insert("language".into(), AttrValue::from(language.as_str()));
                }
            }
            Block::RawBlock(raw) => {
                vars.insert("text".into(), AttrValue::from(raw.text.as_str()));
            }
            Block::BlockQuote(quote) => {
                vars.insert("content".into(), self.write_blocks(&quote.content).into());
            }
            Block::Header(header) => {
                let level = header.level.clamp(-1, 5);
                vars.insert("content".into(), self.write_inlines(&header.content).into());
                vars.insert("level".into(), AttrValue::Number(header.level as f64));
                if let Some(command) = section_command(level) {
                    vars.insert("command".into(), AttrValue::from(command));
                }
                vars.insert("id".into(), AttrValue::from(header.attr.id.as_str()));
            }
            Block::Figure(figure) => {
                vars.insert("content".into(), self.write_blocks(&figure.content).into());
                vars.insert("caption".into(), self.write_inlines(&figure.caption).into());
                vars.insert("id".into(), AttrValue::from(figure.attr.id.as_str()));
            }
            Block::Div(div) => {
                vars.insert("content".into(), self.write_blocks(&div.content).into());
                vars.insert("id".into(), AttrValue::from(div.attr.id.as_str()));
            }
            Block::OrderedList(_)
            | Block::BulletList(_)
            | Block::DefinitionList(_)
            | Block::HorizontalRule(_) => {
                vars.insert("content".into(), self.core_rendering(block).into());
            }
        }
        vars
    }

    fn inline_vars(&self, inline: &Inline) -> IndexMap<String, AttrValue> {
        let mut vars = IndexMap::new();
        match inline {
            Inline::Str(s) => {
                vars.insert("text".into(), AttrValue::from(s.text.as_str()));
            }
            Inline::Emph(e) => {
                vars.insert("content".into(), self.write_inlines(&e.content).into());
            }
            Inline::Strong(s) => {
                vars.insert("content".into(), self.write_inlines(&s.content).into());
            }
            Inline::Code(c) => {
                vars.insert("text".into(), AttrValue::from(c.text.as_str()));
            }
            Inline::Math(m) => {
                vars.insert("text".into(), AttrValue::from(m.text.as_str()));
            }
            Inline::RawInline(raw) => {
                vars.insert("text".into(), AttrValue::from(raw.text.as_str()));
            }
            Inline::Link(link) => {
                vars.insert("content".into(), self.write_inlines(&link.content).into());
                vars.insert("target".into(), AttrValue::from(link.target.as_str()));
                vars.insert("title".into(), AttrValue::from(link.title.as_str()));
            }
            Inline::Image(image) => {
                vars.insert("content".into(), self.write_inlines(&image.content).into());
                vars.insert("target".into(), AttrValue::from(image.target.as_str()));
                vars.insert("title".into(), AttrValue::from(image.title.as_str()));
            }
            Inline::Cite(cite) => {
                vars.insert(
                    "keys".into(),
                    AttrValue::List(cite.keys.iter().map(|k| k.as_str().into()).collect()),
                );
                vars.insert("content".into(), self.write_inlines(&cite.content).into());
            }
            Inline::Note(note) => {
                vars.insert("content".into(), self.write_blocks(&note.content).into());
            }
            Inline::Span(span) => {
                vars.insert("content".into(), self.write_inlines(&span.content).into());
                vars.insert("id".into(), AttrValue::from(span.attr.id.as_str()));
            }
            Inline::Space(_) | Inline::SoftBreak(_) | Inline::LineBreak(_) => {}
        }
        vars
    }

    fn core_rendering(&self, block: &Block) -> String {
        let mut out = String::new();
        self.core_block(block, &mut out);
        out
    }

    fn core_block(&self, block: &Block, out: &mut String) {
        match block {
            Block::Plain(plain) => {
                for inline in &plain.content {
                    self.write_inline(inline, out);
                }
                out.push('\n');
            }
            Block::Paragraph(para) => {
                for inline in &para.content {
                    self.write_inline(inline, out);
                }
                out.push_str("\n\n");
            }
            Block::CodeBlock(code) => {
                out.push_str("\\begin{verbatim}\n");
                out.push_str(&code.text);
                if !code.text.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str("\\end{verbatim}\n");
            }
            Block::RawBlock(raw) => {
                // foreign formats were dropped in the pre phase
                out.push_str(&raw.text);
                out.push('\n');
            }
            Block::BlockQuote(quote) => {
                out.push_str("\\begin{quote}\n");
                for inner in &quote.content {
                    self.write_block(inner, out);
                }
                out.push_str("\\end{quote}\n");
            }
            Block::OrderedList(list) => {
                out.push_str("\\begin{enumerate}\n");
                if list.start != 1 {
                    // counter is pre-increment; start 0 needs -1
                    out.push_str(&format!(
                        "\\setcounter{{enumi}}{{{}}}\n",
                        list.start as i64 - 1
                    ));
                }
                for item in &list.content {
                    out.push_str("\\item ");
                    for inner in item {
                        self.write_block(inner, out);
                    }
                }
                out.push_str("\\end{enumerate}\n");
            }
            Block::BulletList(list) => {
                out.push_str("\\begin{itemize}\n");
                for item in &list.content {
                    out.push_str("\\item ");
                    for inner in item {
                        self.write_block(inner, out);
                    }
                }
                out.push_str("\\end{itemize}\n");
            }
            Block::DefinitionList(list) => {
                out.push_str("\\begin{description}\n");
                for (term, definitions) in &list.content {
                    out.push_str("\\item[");
                    out.push_str(&self.write_inlines(term));
                    out.push_str("] ");
                    for definition in definitions {
                        for inner in definition {
                            self.write_block(inner, out);
                        }
                    }
                }
                out.push_str("\\end{description}\n");
            }
            Block::Header(header) => self.core_header(header, out),
            Block::HorizontalRule(_) => {
                out.push_str("\\noindent\\rule{\\linewidth}{0.4pt}\n");
            }
            Block::Figure(figure) => {
                out.push_str("\\begin{figure}\n");
                for inner in &figure.content {
                    self.write_block(inner, out);
                }
                if !figure.caption.is_empty() {
                    out.push_str("\\caption{");
                    out.push_str(&self.write_inlines(&figure.caption));
                    out.push_str("}\n");
                }
                if !figure.attr.id.is_empty() {
                    out.push_str(&format!("\\label{{{}}}\n", figure.attr.id));
                }
                out.push_str("\\end{figure}\n");
            }
            Block::Div(div) => {
                for inner in &div.content {
                    self.write_block(inner, out);
                }
            }
        }
    }

    fn core_header(&self, header: &Header, out: &mut String) {
        let level = header.level.clamp(-1, 5);
        let Some(command) = section_command(level) else {
            return;
        };
        let numbered = self.ctx.numbering_mode == NumberingMode::Numbered
            && !header.attr.has_class("unnumbered");
        out.push('\\');
        out.push_str(command);
        if !numbered {
            out.push('*');
        }
        out.push('{');
        out.push_str(&self.write_inlines(&header.content));
        out.push('}');
        if !header.attr.id.is_empty() {
            out.push_str(&format!("\\label{{{}}}", header.attr.id));
        }
        out.push('\n');
    }

    fn core_inline(&self, inline: &Inline, out: &mut String) {
        match inline {
            Inline::Str(s) => out.push_str(&escape_latex(&s.text)),
            Inline::Emph(e) => {
                out.push_str("\\emph{");
                out.push_str(&self.write_inlines(&e.content));
                out.push('}');
            }
            Inline::Strong(s) => {
                out.push_str("\\textbf{");
                out.push_str(&self.write_inlines(&s.content));
                out.push('}');
            }
            Inline::Code(c) => {
                out.push_str("\\texttt{");
                out.push_str(&escape_latex(&c.text));
                out.push('}');
            }
            Inline::Space(_) => out.push(' '),
            Inline::SoftBreak(_) => out.push('\n'),
            Inline::LineBreak(_) => out.push_str("\\\\\n"),
            Inline::Math(m) => match m.kind {
                MathKind::Inline => {
                    out.push('$');
                    out.push_str(&m.text);
                    out.push('$');
                }
                MathKind::Display => {
                    out.push_str("\\[");
                    out.push_str(&m.text);
                    out.push_str("\\]");
                }
            },
            Inline::RawInline(raw) => out.push_str(&raw.text),
            Inline::Link(link) => {
                out.push_str(&format!("\\href{{{}}}{{", link.target));
                out.push_str(&self.write_inlines(&link.content));
                out.push('}');
            }
            Inline::Image(image) => {
                out.push_str(&format!("\\includegraphics{{{}}}", image.target));
            }
            Inline::Cite(cite) => {
                out.push_str(&format!("\\cite{{{}}}", cite.keys.join(",")));
            }
            Inline::Note(note) => {
                out.push_str("\\footnote{");
                let inner = self.write_blocks(&note.content);
                out.push_str(inner.trim_end());
                out.push('}');
            }
            Inline::Span(span) => {
                out.push_str(&self.write_inlines(&span.content));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partials::{PartialBinding, PartialSet};
    use weft_config::NumberingMode;
    use weft_dom::NodeKind;
    use weft_dom::attr::Attr;
    use weft_dom::block::Paragraph;

    fn test_context(numbering: NumberingMode) -> ExecutionContext {
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

    fn header(level: i64, text: &str) -> Block {
        Block::Header(Header {
            level,
            attr: Attr::empty(),
            content: vec![Inline::str(text)],
        })
    }

    #[test]
    fn escaping() {
        assert_eq!(escape_latex("50% & $5"), "50\\% \\& \\$5");
        assert_eq!(escape_latex("a_b"), "a\\_b");
    }

    #[test]
    fn section_command_table() {
        assert_eq!(section_command(-1), Some("part"));
        assert_eq!(section_command(0), Some("chapter"));
        assert_eq!(section_command(1), Some("section"));
        assert_eq!(section_command(5), Some("subparagraph"));
        assert_eq!(section_command(6), None);
    }

    #[test]
    fn headers_use_level_commands() {
        let partials = PartialSet::new();
        let ctx = test_context(NumberingMode::Numbered);
        let writer = Writer::new(&partials, &ctx);
        let out = writer.write_blocks(&vec![header(1, "Intro"), header(2, "Detail")]);
        assert!(out.contains("\\section{Intro}"));
        assert!(out.contains("\\subsection{Detail}"));
    }

    #[test]
    fn unnumbered_mode_stars_commands() {
        let partials = PartialSet::new();
        let ctx = test_context(NumberingMode::Unnumbered);
        let writer = Writer::new(&partials, &ctx);
        let out = writer.write_blocks(&vec![header(1, "Intro")]);
        assert!(out.contains("\\section*{Intro}"));
    }

    #[test]
    fn unnumbered_class_stars_a_single_header() {
        let partials = PartialSet::new();
        let ctx = test_context(NumberingMode::Numbered);
        let writer = Writer::new(&partials, &ctx);
        let mut attr = Attr::empty();
        attr.classes.push("unnumbered".to_string());
        let block = Block::Header(Header {
            level: 1,
            attr,
            content: vec![Inline::str("Preface")],
        });
        let out = writer.write_blocks(&vec![block]);
        assert!(out.contains("\\section*{Preface}"));
    }

    #[test]
    fn override_partial_expands_node_variables() {
        let mut partials = PartialSet::new();
        partials.insert(
            NodeKind::Header,
            PartialBinding {
                node_kind: NodeKind::Header,
                provider_id: "fancy".to_string(),
                source: PartialSource::Text("\\fancy{{{command}}}{{{content}}}\n".to_string()),
            },
        );
        let ctx = test_context(NumberingMode::Numbered);
        let writer = Writer::new(&partials, &ctx);
        let out = writer.write_blocks(&vec![header(2, "Scope")]);
        assert_eq!(out, "\\fancy{subsection}{Scope}\n");
    }

    #[test]
    fn ordered_list_start_adjusts_the_counter() {
        use weft_dom::block::OrderedList;
        let partials = PartialSet::new();
        let ctx = test_context(NumberingMode::Numbered);
        let writer = Writer::new(&partials, &ctx);

        let list = |start| {
            Block::OrderedList(OrderedList {
                start,
                content: vec![vec![Block::Plain(weft_dom::block::Plain {
                    content: vec![Inline::str("item")],
                })]],
            })
        };
        assert!(!writer.write_blocks(&vec![list(1)]).contains("\\setcounter"));
        assert!(writer.write_blocks(&vec![list(4)]).contains("\\setcounter{enumi}{3}"));
        // sources may number from zero
        assert!(writer.write_blocks(&vec![list(0)]).contains("\\setcounter{enumi}{-1}"));
    }

    #[test]
    fn paragraph_and_inline_markup() {
        let partials = PartialSet::new();
        let ctx = test_context(NumberingMode::Numbered);
        let writer = Writer::new(&partials, &ctx);
        let block = Block::Paragraph(Paragraph {
            content: vec![
                Inline::str("see"),
                Inline::Space(weft_dom::inline::Space),
                Inline::Emph(weft_dom::inline::Emph {
                    content: vec![Inline::str("this")],
                }),
            ],
        });
        assert_eq!(writer.write_blocks(&vec![block]), "see \\emph{this}\n\n");
    }
}
