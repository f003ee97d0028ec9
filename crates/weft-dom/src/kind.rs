//! Fieldless node kinds for typed dispatch.

use serde::{Deserialize, Serialize};

/// Every block and inline variant, plus [`NodeKind::Any`] for catch-all
/// handler registration.
///
/// Handler tables and partial catalogs are keyed by this enum, so a
/// registration for a kind that cannot occur is a compile error rather
/// than a silent runtime miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    // block kinds
    Plain,
    Paragraph,
    CodeBlock,
    RawBlock,
    BlockQuote,
    OrderedList,
    BulletList,
    DefinitionList,
    Header,
    HorizontalRule,
    Figure,
    Div,
    // inline kinds
    Str,
    Emph,
    Strong,
    Code,
    Space,
    SoftBreak,
    LineBreak,
    Math,
    RawInline,
    Link,
    Image,
    Cite,
    Note,
    Span,
    /// Matches every node; used only for handler registration.
    Any,
}

impl NodeKind {
    /// Every concrete kind (everything but [`NodeKind::Any`]).
    pub const ALL: [NodeKind; 26] = [
        NodeKind::Plain,
        NodeKind::Paragraph,
        NodeKind::CodeBlock,
        NodeKind::RawBlock,
        NodeKind::BlockQuote,
        NodeKind::OrderedList,
        NodeKind::BulletList,
        NodeKind::DefinitionList,
        NodeKind::Header,
        NodeKind::HorizontalRule,
        NodeKind::Figure,
        NodeKind::Div,
        NodeKind::Str,
        NodeKind::Emph,
        NodeKind::Strong,
        NodeKind::Code,
        NodeKind::Space,
        NodeKind::SoftBreak,
        NodeKind::LineBreak,
        NodeKind::Math,
        NodeKind::RawInline,
        NodeKind::Link,
        NodeKind::Image,
        NodeKind::Cite,
        NodeKind::Note,
        NodeKind::Span,
    ];

    /// Stable lowercase name, used in manifests and diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Plain => "plain",
            NodeKind::Paragraph => "paragraph",
            NodeKind::CodeBlock => "code_block",
            NodeKind::RawBlock => "raw_block",
            NodeKind::BlockQuote => "block_quote",
            NodeKind::OrderedList => "ordered_list",
            NodeKind::BulletList => "bullet_list",
            NodeKind::DefinitionList => "definition_list",
            NodeKind::Header => "header",
            NodeKind::HorizontalRule => "horizontal_rule",
            NodeKind::Figure => "figure",
            NodeKind::Div => "div",
            NodeKind::Str => "str",
            NodeKind::Emph => "emph",
            NodeKind::Strong => "strong",
            NodeKind::Code => "code",
            NodeKind::Space => "space",
            NodeKind::SoftBreak => "soft_break",
            NodeKind::LineBreak => "line_break",
            NodeKind::Math => "math",
            NodeKind::RawInline => "raw_inline",
            NodeKind::Link => "link",
            NodeKind::Image => "image",
            NodeKind::Cite => "cite",
            NodeKind::Note => "note",
            NodeKind::Span => "span",
            NodeKind::Any => "any",
        }
    }

    /// Parse a manifest name back to a kind.
    pub fn from_str_name(name: &str) -> Option<NodeKind> {
        let kind = match name {
            "plain" => NodeKind::Plain,
            "paragraph" => NodeKind::Paragraph,
            "code_block" => NodeKind::CodeBlock,
            "raw_block" => NodeKind::RawBlock,
            "block_quote" => NodeKind::BlockQuote,
            "ordered_list" => NodeKind::OrderedList,
            "bullet_list" => NodeKind::BulletList,
            "definition_list" => NodeKind::DefinitionList,
            "header" => NodeKind::Header,
            "horizontal_rule" => NodeKind::HorizontalRule,
            "figure" => NodeKind::Figure,
            "div" => NodeKind::Div,
            "str" => NodeKind::Str,
            "emph" => NodeKind::Emph,
            "strong" => NodeKind::Strong,
            "code" => NodeKind::Code,
            "space" => NodeKind::Space,
            "soft_break" => NodeKind::SoftBreak,
            "line_break" => NodeKind::LineBreak,
            "math" => NodeKind::Math,
            "raw_inline" => NodeKind::RawInline,
            "link" => NodeKind::Link,
            "image" => NodeKind::Image,
            "cite" => NodeKind::Cite,
            "note" => NodeKind::Note,
            "span" => NodeKind::Span,
            "any" => NodeKind::Any,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_block(&self) -> bool {
        matches!(
            self,
            NodeKind::Plain
                | NodeKind::Paragraph
                | NodeKind::CodeBlock
                | NodeKind::RawBlock
                | NodeKind::BlockQuote
                | NodeKind::OrderedList
                | NodeKind::BulletList
                | NodeKind::DefinitionList
                | NodeKind::Header
                | NodeKind::HorizontalRule
                | NodeKind::Figure
                | NodeKind::Div
        )
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_roundtrip() {
        for kind in [
            NodeKind::Paragraph,
            NodeKind::Header,
            NodeKind::Cite,
            NodeKind::Any,
        ] {
            assert_eq!(NodeKind::from_str_name(kind.as_str()), Some(kind));
        }
        assert_eq!(NodeKind::from_str_name("nonsense"), None);
    }

    #[test]
    fn block_vs_inline() {
        assert!(NodeKind::Header.is_block());
        assert!(!NodeKind::Emph.is_block());
        assert!(!NodeKind::Any.is_block());
    }
}
