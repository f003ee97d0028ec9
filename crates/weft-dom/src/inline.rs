//! Inline nodes.

use serde::{Deserialize, Serialize};

use crate::attr::Attr;
use crate::block::Blocks;
use crate::kind::NodeKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Inline {
    Str(Str),
    Emph(Emph),
    Strong(Strong),
    Code(Code),
    Space(Space),
    SoftBreak(SoftBreak),
    LineBreak(LineBreak),
    Math(Math),
    RawInline(RawInline),
    Link(Link),
    Image(Image),
    Cite(Cite),
    Note(Note),
    Span(Span),
}

pub type Inlines = Vec<Inline>;

impl Inline {
    /// The fieldless kind of this node, used for dispatch.
    pub fn kind(&self) -> NodeKind {
        match self {
            Inline::Str(_) => NodeKind::Str,
            Inline::Emph(_) => NodeKind::Emph,
            Inline::Strong(_) => NodeKind::Strong,
            Inline::Code(_) => NodeKind::Code,
            Inline::Space(_) => NodeKind::Space,
            Inline::SoftBreak(_) => NodeKind::SoftBreak,
            Inline::LineBreak(_) => NodeKind::LineBreak,
            Inline::Math(_) => NodeKind::Math,
            Inline::RawInline(_) => NodeKind::RawInline,
            Inline::Link(_) => NodeKind::Link,
            Inline::Image(_) => NodeKind::Image,
            Inline::Cite(_) => NodeKind::Cite,
            Inline::Note(_) => NodeKind::Note,
            Inline::Span(_) => NodeKind::Span,
        }
    }

    /// Convenience constructor for plain text.
    pub fn str(text: impl Into<String>) -> Self {
        Inline::Str(Str { text: text.into() })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Str {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emph {
    pub content: Inlines,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strong {
    pub content: Inlines,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Code {
    pub attr: Attr,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftBreak;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineBreak;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MathKind {
    Inline,
    Display,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Math {
    pub kind: MathKind,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInline {
    pub format: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub attr: Attr,
    pub content: Inlines,
    pub target: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub attr: Attr,
    pub content: Inlines,
    pub target: String,
    pub title: String,
}

/// A citation reference. Keys are recorded into the render state during
/// the inline phase; bibliography generation itself is a collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cite {
    pub keys: Vec<String>,
    pub content: Inlines,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub content: Blocks,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub attr: Attr,
    pub content: Inlines,
}
