//! Block-level nodes.

use serde::{Deserialize, Serialize};

use crate::attr::Attr;
use crate::inline::Inlines;
use crate::kind::NodeKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    Plain(Plain),
    Paragraph(Paragraph),
    CodeBlock(CodeBlock),
    RawBlock(RawBlock),
    BlockQuote(BlockQuote),
    OrderedList(OrderedList),
    BulletList(BulletList),
    DefinitionList(DefinitionList),
    Header(Header),
    HorizontalRule(HorizontalRule),
    Figure(Figure),
    Div(Div),
}

pub type Blocks = Vec<Block>;

impl Block {
    /// The fieldless kind of this node, used for dispatch.
    pub fn kind(&self) -> NodeKind {
        match self {
            Block::Plain(_) => NodeKind::Plain,
            Block::Paragraph(_) => NodeKind::Paragraph,
            Block::CodeBlock(_) => NodeKind::CodeBlock,
            Block::RawBlock(_) => NodeKind::RawBlock,
            Block::BlockQuote(_) => NodeKind::BlockQuote,
            Block::OrderedList(_) => NodeKind::OrderedList,
            Block::BulletList(_) => NodeKind::BulletList,
            Block::DefinitionList(_) => NodeKind::DefinitionList,
            Block::Header(_) => NodeKind::Header,
            Block::HorizontalRule(_) => NodeKind::HorizontalRule,
            Block::Figure(_) => NodeKind::Figure,
            Block::Div(_) => NodeKind::Div,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plain {
    pub content: Inlines,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub content: Inlines,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub attr: Attr,
    pub text: String,
}

/// A raw block in some target format; blocks whose format does not match
/// the output target are dropped during the pre phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBlock {
    pub format: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockQuote {
    pub content: Blocks,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedList {
    pub start: usize,
    pub content: Vec<Blocks>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletList {
    pub content: Vec<Blocks>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionList {
    pub content: Vec<(Inlines, Vec<Blocks>)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Heading level. Source documents carry 1..=6; heading alignment may
    /// shift levels to 0 (chapter) or -1 (part).
    pub level: i64,
    pub attr: Attr,
    pub content: Inlines,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizontalRule;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub attr: Attr,
    pub caption: Inlines,
    pub content: Blocks,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Div {
    pub attr: Attr,
    pub content: Blocks,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inline::{Inline, Str};

    #[test]
    fn block_kinds() {
        let para = Block::Paragraph(Paragraph {
            content: vec![Inline::Str(Str {
                text: "hello".to_string(),
            })],
        });
        assert_eq!(para.kind(), NodeKind::Paragraph);
        assert_eq!(Block::HorizontalRule(HorizontalRule).kind(), NodeKind::HorizontalRule);
    }
}
