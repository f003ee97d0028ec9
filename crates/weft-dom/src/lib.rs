//! Normalized document tree types for Weft.
//!
//! The tree is the interchange format between the (out-of-scope) source
//! parser and the render core: block and inline nodes as closed enums with
//! struct payloads, plus a fieldless [`NodeKind`] mirror of every variant
//! used for typed handler and partial dispatch.

pub mod attr;
pub mod block;
pub mod doc;
pub mod inline;
pub mod kind;
pub mod walk;

pub use attr::Attr;
pub use block::{
    Block, BlockQuote, Blocks, BulletList, CodeBlock, DefinitionList, Div, Figure, Header,
    HorizontalRule, OrderedList, Paragraph, Plain, RawBlock,
};
pub use doc::Document;
pub use inline::{
    Cite, Code, Emph, Image, Inline, Inlines, LineBreak, Link, Math, MathKind, Note, RawInline,
    SoftBreak, Space, Span, Str, Strong,
};
pub use kind::NodeKind;
pub use walk::{inlines_to_text, shallowest_heading_level, visit_blocks_mut, visit_inlines_mut};
