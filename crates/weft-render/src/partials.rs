//! Partial resolution.
//!
//! A partial is the renderer responsible for one node kind. Every render
//! binds at most one partial per kind under a fixed precedence: fragment
//! override > template override > core default. Ambiguity (two fragments
//! overriding the same kind) and missing required partials abort before
//! any phase runs.

use indexmap::{IndexMap, IndexSet};
use weft_config::{FragmentManifest, TemplateManifest, compute_partial_providers};
use weft_dom::NodeKind;

use crate::error::{RenderError, Result};

/// Where a partial's implementation comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum PartialSource {
    /// The built-in renderer for this kind.
    CoreDefault,
    /// Override template text with `{{…}}` placeholders, from a template
    /// or fragment manifest.
    Text(String),
}

/// One resolved binding: a node kind mapped to exactly one provider.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialBinding {
    pub node_kind: NodeKind,
    pub provider_id: String,
    pub source: PartialSource,
}

/// The node kinds the core default renderer covers.
///
/// Tests construct narrower catalogs to exercise missing-provider
/// behavior; production uses [`PartialCatalog::latex`].
#[derive(Debug, Clone, Default)]
pub struct PartialCatalog {
    kinds: IndexSet<NodeKind>,
}

impl PartialCatalog {
    /// An empty catalog (no core defaults).
    pub fn empty() -> Self {
        Self::default()
    }

    /// The full built-in LaTeX catalog: every concrete node kind.
    pub fn latex() -> Self {
        PartialCatalog {
            kinds: NodeKind::ALL.into_iter().collect(),
        }
    }

    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kinds.insert(kind);
        self
    }

    pub fn without_kind(mut self, kind: NodeKind) -> Self {
        self.kinds.shift_remove(&kind);
        self
    }

    pub fn contains(&self, kind: NodeKind) -> bool {
        self.kinds.contains(&kind)
    }
}

/// Resolved bindings per node kind.
pub type PartialSet = IndexMap<NodeKind, PartialBinding>;

/// Resolve one binding per needed node kind and enforce the required-
/// partials contract.
///
/// Precedence is fixed: fragment override > template override > core
/// default. Required partials declared by the template or any active
/// fragment must end up bound, otherwise rendering aborts here, before
/// any output is produced.
pub fn resolve_partials(
    needed: &[NodeKind],
    template: &TemplateManifest,
    active_fragments: &[&FragmentManifest],
    core: &PartialCatalog,
) -> Result<PartialSet> {
    let providers = compute_partial_providers(template, active_fragments)?;

    let mut bindings: PartialSet = IndexMap::new();
    for kind in needed {
        if let Some(provider_id) = providers.get(kind) {
            let text = override_text(*kind, provider_id, template, active_fragments);
            bindings.insert(
                *kind,
                PartialBinding {
                    node_kind: *kind,
                    provider_id: provider_id.clone(),
                    source: PartialSource::Text(text),
                },
            );
        } else if core.contains(*kind) {
            bindings.insert(
                *kind,
                PartialBinding {
                    node_kind: *kind,
                    provider_id: "core".to_string(),
                    source: PartialSource::CoreDefault,
                },
            );
        }
    }

    check_required(template, active_fragments, &bindings)?;
    tracing::debug!(bindings = bindings.len(), "partials resolved");
    Ok(bindings)
}

fn override_text(
    kind: NodeKind,
    provider_id: &str,
    template: &TemplateManifest,
    active_fragments: &[&FragmentManifest],
) -> String {
    if provider_id == template.id {
        return template.overrides[&kind].clone();
    }
    active_fragments
        .iter()
        .find(|f| f.id == provider_id)
        .and_then(|f| f.overrides.get(&kind))
        .cloned()
        .unwrap_or_default()
}

fn check_required(
    template: &TemplateManifest,
    active_fragments: &[&FragmentManifest],
    bindings: &PartialSet,
) -> Result<()> {
    let mut requirements: Vec<(&str, String)> = Vec::new();
    for name in &template.required_partials {
        requirements.push((name, format!("template `{}`", template.id)));
    }
    for fragment in active_fragments {
        for name in &fragment.required_partials {
            requirements.push((name, format!("fragment `{}`", fragment.id)));
        }
    }

    for (name, declared_by) in requirements {
        let bound = NodeKind::from_str_name(name)
            .map(|kind| bindings.contains_key(&kind))
            .unwrap_or(false);
        if !bound {
            return Err(RenderError::MissingPartialProvider {
                name: name.to_string(),
                declared_by,
            });
        }
    }
    Ok(())
}
