//! Template and fragment manifests.
//!
//! Manifests are the interchange format with template/fragment authors;
//! their shapes must stay stable across minor versions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use weft_dom::NodeKind;

use crate::error::ConfigError;
use crate::facts::ContentFacts;
use crate::spec::AttributeSpec;
use crate::value::AttrValue;

/// How a slot finds its content in the document tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotSelector {
    /// Match a header whose flattened text equals this (case-insensitive).
    HeadingText(String),
    /// Match a header with this identifier.
    HeadingId(String),
    /// Match a div carrying this class.
    MarkerClass(String),
}

impl SlotSelector {
    /// Parse the front-matter shorthand: `#id`, `.class`, or heading text.
    pub fn parse(s: &str) -> SlotSelector {
        if let Some(id) = s.strip_prefix('#') {
            SlotSelector::HeadingId(id.to_string())
        } else if let Some(class) = s.strip_prefix('.') {
            SlotSelector::MarkerClass(class.to_string())
        } else {
            SlotSelector::HeadingText(s.to_string())
        }
    }
}

impl std::fmt::Display for SlotSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotSelector::HeadingText(t) => write!(f, "heading text `{t}`"),
            SlotSelector::HeadingId(id) => write!(f, "heading id `#{id}`"),
            SlotSelector::MarkerClass(c) => write!(f, "marker class `.{c}`"),
        }
    }
}

/// A named insertion point declared by a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSpec {
    /// Heading level the slot's shallowest heading should land on.
    pub base_level: i64,
    /// How many heading levels render as sectioning commands, if bounded.
    /// Deeper headings are demoted to run-in emphasis.
    pub depth: Option<i64>,
    /// Template-declared extra offset.
    pub offset: i64,
    /// Default selector; front matter may override it per document.
    pub selector: Option<SlotSelector>,
}

impl SlotSpec {
    pub fn at_level(base_level: i64) -> Self {
        SlotSpec {
            base_level,
            depth: None,
            offset: 0,
            selector: None,
        }
    }

    pub fn with_depth(mut self, depth: i64) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn with_selector(mut self, selector: SlotSelector) -> Self {
        self.selector = Some(selector);
        self
    }
}

/// What kind of output a fragment piece contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PieceKind {
    /// A package/preamble requirement line.
    Package,
    /// An input/include line referencing generated material.
    Input,
    /// Inline target-language text.
    Inline,
}

/// Where a fragment piece is injected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InjectTarget {
    Slot(String),
    Variable(String),
}

impl std::fmt::Display for InjectTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InjectTarget::Slot(s) => write!(f, "slot `{s}`"),
            InjectTarget::Variable(v) => write!(f, "variable `{v}`"),
        }
    }
}

/// One output piece a fragment renders when active.
///
/// `output` is target-language text with `{{name}}` placeholders expanded
/// against the resolved attributes at injection time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceSpec {
    pub kind: PieceKind,
    pub target: InjectTarget,
    pub output: String,
}

/// A predicate over resolved attributes and content facts deciding whether
/// a fragment activates.
///
/// Content-driven variants are false in the first resolution round, when
/// no facts exist yet; the second round re-evaluates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Trigger {
    /// Attribute resolves truthy.
    AttrTruthy(String),
    /// Attribute equals a specific value.
    AttrEquals(String, AttrValue),
    /// Any citation was recorded during rendering.
    CitationsPresent,
    /// Any index term was recorded during rendering.
    IndexTermsPresent,
    /// A given script appeared in text runs.
    ScriptPresent(String),
    AnyOf(Vec<Trigger>),
    AllOf(Vec<Trigger>),
}

impl Trigger {
    pub fn evaluate(
        &self,
        resolved: &IndexMap<String, AttrValue>,
        facts: Option<&ContentFacts>,
    ) -> bool {
        match self {
            Trigger::AttrTruthy(name) => {
                resolved.get(name).map(AttrValue::is_truthy).unwrap_or(false)
            }
            Trigger::AttrEquals(name, expected) => {
                resolved.get(name).map(|v| v == expected).unwrap_or(false)
            }
            Trigger::CitationsPresent => facts.map(|f| f.citations_present).unwrap_or(false),
            Trigger::IndexTermsPresent => {
                facts.map(|f| f.index_terms_present).unwrap_or(false)
            }
            Trigger::ScriptPresent(script) => {
                facts.map(|f| f.script_present(script)).unwrap_or(false)
            }
            Trigger::AnyOf(triggers) => {
                triggers.iter().any(|t| t.evaluate(resolved, facts))
            }
            Trigger::AllOf(triggers) => {
                triggers.iter().all(|t| t.evaluate(resolved, facts))
            }
        }
    }
}

/// A template manifest.
#[derive(Debug, Clone, Default)]
pub struct TemplateManifest {
    pub id: String,
    /// Declared slots; `body` is the default slot and must be present.
    pub slots: IndexMap<String, SlotSpec>,
    pub attributes: Vec<AttributeSpec>,
    /// Values this template supplies at the template-default layer,
    /// including for attributes it does not own.
    pub defaults: IndexMap<String, AttrValue>,
    /// Partial overrides: node kind → partial template text.
    pub overrides: IndexMap<NodeKind, String>,
    /// Node kinds (by manifest name) that must have a partial bound.
    pub required_partials: Vec<String>,
    /// Variables fragments may inject into.
    pub variables: Vec<String>,
}

impl TemplateManifest {
    pub fn new(id: impl Into<String>) -> Self {
        let mut slots = IndexMap::new();
        slots.insert("body".to_string(), SlotSpec::at_level(1));
        TemplateManifest {
            id: id.into(),
            slots,
            ..Default::default()
        }
    }

    pub fn declares_slot(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn declares_variable(&self, name: &str) -> bool {
        self.variables.iter().any(|v| v == name)
    }
}

/// A fragment manifest: template-shaped, plus pieces and a trigger.
#[derive(Debug, Clone, Default)]
pub struct FragmentManifest {
    pub id: String,
    /// Fragments that must be injected before this one.
    pub depends_on: Vec<String>,
    pub attributes: Vec<AttributeSpec>,
    pub defaults: IndexMap<String, AttrValue>,
    pub overrides: IndexMap<NodeKind, String>,
    pub required_partials: Vec<String>,
    pub pieces: Vec<PieceSpec>,
    pub trigger: Option<Trigger>,
}

impl FragmentManifest {
    pub fn new(id: impl Into<String>) -> Self {
        FragmentManifest {
            id: id.into(),
            ..Default::default()
        }
    }
}

/// Compute the winning partial provider per node kind.
///
/// Precedence is fixed: fragment override > template override. (The core
/// default catalog is the renderer's fallback and carries no provider id
/// here.) Two active fragments overriding the same kind is ambiguous and
/// an error, never resolved arbitrarily.
pub fn compute_partial_providers(
    template: &TemplateManifest,
    active_fragments: &[&FragmentManifest],
) -> Result<IndexMap<NodeKind, String>, ConfigError> {
    let mut providers: IndexMap<NodeKind, String> = IndexMap::new();

    for fragment in active_fragments {
        for kind in fragment.overrides.keys() {
            if let Some(existing) = providers.get(kind) {
                return Err(ConfigError::DuplicatePartialProvider {
                    node_kind: kind.as_str().to_string(),
                    first: existing.clone(),
                    second: fragment.id.clone(),
                });
            }
            providers.insert(*kind, fragment.id.clone());
        }
    }

    for kind in template.overrides.keys() {
        providers.entry(*kind).or_insert_with(|| template.id.clone());
    }

    Ok(providers)
}
