//! The frozen execution context.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use weft_dom::NodeKind;

use crate::manifest::{SlotSelector, SlotSpec};
use crate::value::AttrValue;

/// Heading numbering policy for the render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NumberingMode {
    #[default]
    Numbered,
    Unnumbered,
}

/// A slot the extractor must fill: the template's slot spec plus the
/// selector in effect for this document.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotRequest {
    pub spec: SlotSpec,
    pub selector: Option<SlotSelector>,
}

/// The resolved, immutable view consumed by every downstream stage.
///
/// Built once per resolution round; never mutated afterwards. When
/// re-resolution is needed (the second activation round), a new context is
/// built from scratch.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub document_ref: String,
    pub resolved_attributes: IndexMap<String, AttrValue>,
    /// Active fragment ids, in manifest declaration order.
    pub active_fragments: Vec<String>,
    pub slot_requests: IndexMap<String, SlotRequest>,
    pub language: String,
    pub numbering_mode: NumberingMode,
    /// Winning provider id per overridden node kind.
    pub partial_providers: IndexMap<NodeKind, String>,
    /// Document-wide extra heading offset (`base-level` attribute).
    pub base_level_override: i64,
}

impl ExecutionContext {
    /// Resolved value of an attribute, if registered.
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.resolved_attributes.get(name)
    }

    /// Resolved string attribute, if present and a string.
    pub fn str_attr(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(AttrValue::as_str)
    }

    /// Resolved attribute truthiness; absent attributes are falsy.
    pub fn truthy(&self, name: &str) -> bool {
        self.attr(name).map(AttrValue::is_truthy).unwrap_or(false)
    }

    pub fn is_fragment_active(&self, id: &str) -> bool {
        self.active_fragments.iter().any(|f| f == id)
    }
}
