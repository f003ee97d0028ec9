//! The execution-context resolver.
//!
//! Merges override sources, template and fragment specs into one frozen
//! [`ExecutionContext`]. Fragment activation is a fixed point computed in
//! two resolution rounds: [`ContextResolver::resolve`] is the first round
//! (no content facts yet), [`ContextResolver::resolve_with_facts`] the
//! second, after content has been scanned. Each round builds a fresh,
//! immutable context; nothing is mutated in between.

use indexmap::IndexMap;
use weft_error_reporting::{DiagnosticMessage, DiagnosticMessageBuilder, Location};

use crate::context::{ExecutionContext, NumberingMode, SlotRequest};
use crate::error::Result;
use crate::facts::ContentFacts;
use crate::manifest::{
    FragmentManifest, SlotSelector, TemplateManifest, compute_partial_providers,
};
use crate::placeholder::expand_placeholders;
use crate::registry::AttributeRegistry;
use crate::source::SourceSet;
use crate::value::AttrValue;

/// A frozen context plus the warnings raised while building it.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub context: ExecutionContext,
    pub warnings: Vec<DiagnosticMessage>,
}

/// Resolves execution contexts for one template + fragment catalog.
///
/// The resolver itself is immutable and shareable; identical inputs always
/// produce identical contexts.
pub struct ContextResolver<'a> {
    template: &'a TemplateManifest,
    fragments: &'a [FragmentManifest],
}

impl<'a> ContextResolver<'a> {
    pub fn new(template: &'a TemplateManifest, fragments: &'a [FragmentManifest]) -> Self {
        ContextResolver {
            template,
            fragments,
        }
    }

    /// First resolution round: content-driven triggers evaluate false.
    pub fn resolve(&self, document_ref: &str, sources: &SourceSet) -> Result<Resolution> {
        self.resolve_round(document_ref, sources, None)
    }

    /// Second resolution round, with facts gathered from rendering.
    pub fn resolve_with_facts(
        &self,
        document_ref: &str,
        sources: &SourceSet,
        facts: &ContentFacts,
    ) -> Result<Resolution> {
        self.resolve_round(document_ref, sources, Some(facts))
    }

    fn resolve_round(
        &self,
        document_ref: &str,
        sources: &SourceSet,
        facts: Option<&ContentFacts>,
    ) -> Result<Resolution> {
        let mut warnings = Vec::new();

        // (a) register every spec; ownership conflicts surface here,
        // before anything is resolved.
        let mut registry = AttributeRegistry::new();
        for spec in &self.template.attributes {
            registry.register(spec.clone())?;
        }
        for fragment in self.fragments {
            for spec in &fragment.attributes {
                registry.register(spec.clone())?;
            }
        }
        tracing::debug!(
            template = %self.template.id,
            attributes = registry.len(),
            "registered attribute specs"
        );

        // (b) resolve with template defaults only, then
        // (c) run activation to a fixed point: defaults from newly active
        // fragments can flip attribute-based triggers, so re-resolve and
        // re-evaluate once after the active set changes.
        let mut effective = sources.clone();
        effective.template_defaults = self.template.defaults.clone();
        effective.fragment_defaults = IndexMap::new();

        let mut resolved = registry.resolve_all(&effective)?;
        let mut active = self.activation(&resolved, sources, facts);
        // Bounded: each pass can only add fragments via defaults, so the
        // set settles within |fragments| + 1 passes.
        for _ in 0..=self.fragments.len() {
            effective.fragment_defaults = self.collect_fragment_defaults(&active);
            resolved = registry.resolve_all(&effective)?;
            let next = self.activation(&resolved, sources, facts);
            if next == active {
                break;
            }
            active = next;
        }
        tracing::debug!(active = ?active, "fragment activation settled");

        // (d) expand placeholder tokens in string attributes against the
        // resolved map, then freeze.
        let snapshot = resolved.clone();
        for (name, value) in resolved.iter_mut() {
            expand_value(name, value, &snapshot, &mut warnings);
        }

        let language = resolved
            .get("lang")
            .and_then(AttrValue::as_str)
            .unwrap_or("en")
            .to_string();
        let numbering_mode = match resolved.get("numbering").and_then(AttrValue::as_str) {
            Some("unnumbered") => NumberingMode::Unnumbered,
            _ => NumberingMode::Numbered,
        };
        let base_level_override = resolved
            .get("base-level")
            .and_then(AttrValue::as_number)
            .unwrap_or(0.0) as i64;

        let active_refs: Vec<&FragmentManifest> = self
            .fragments
            .iter()
            .filter(|f| active.contains(&f.id))
            .collect();
        let partial_providers = compute_partial_providers(self.template, &active_refs)?;

        let slot_requests = self.slot_requests(sources);

        Ok(Resolution {
            context: ExecutionContext {
                document_ref: document_ref.to_string(),
                resolved_attributes: resolved,
                active_fragments: active,
                slot_requests,
                language,
                numbering_mode,
                partial_providers,
                base_level_override,
            },
            warnings,
        })
    }

    /// Active fragments in manifest declaration order: explicitly
    /// requested, or trigger holds over the resolved attributes (and
    /// facts, when present).
    fn activation(
        &self,
        resolved: &IndexMap<String, AttrValue>,
        sources: &SourceSet,
        facts: Option<&ContentFacts>,
    ) -> Vec<String> {
        self.fragments
            .iter()
            .filter(|fragment| {
                if sources.requested_fragments.iter().any(|r| r == &fragment.id) {
                    return true;
                }
                fragment
                    .trigger
                    .as_ref()
                    .map(|t| t.evaluate(resolved, facts))
                    .unwrap_or(false)
            })
            .map(|fragment| fragment.id.clone())
            .collect()
    }

    /// Defaults of the active fragments, declaration order, first wins.
    fn collect_fragment_defaults(&self, active: &[String]) -> IndexMap<String, AttrValue> {
        let mut defaults = IndexMap::new();
        for fragment in self.fragments {
            if !active.contains(&fragment.id) {
                continue;
            }
            for (name, value) in &fragment.defaults {
                defaults
                    .entry(name.clone())
                    .or_insert_with(|| value.clone());
            }
        }
        defaults
    }

    /// Template slots with per-document selector overrides from front
    /// matter (`slots.<name>`).
    fn slot_requests(&self, sources: &SourceSet) -> IndexMap<String, SlotRequest> {
        let mut requests = IndexMap::new();
        for (name, spec) in &self.template.slots {
            let override_selector = sources
                .front_matter
                .lookup(&format!("slots.{name}"))
                .and_then(AttrValue::as_str)
                .map(SlotSelector::parse);
            requests.insert(
                name.clone(),
                SlotRequest {
                    spec: spec.clone(),
                    selector: override_selector.or_else(|| spec.selector.clone()),
                },
            );
        }
        requests
    }
}

fn expand_value(
    name: &str,
    value: &mut AttrValue,
    snapshot: &IndexMap<String, AttrValue>,
    warnings: &mut Vec<DiagnosticMessage>,
) {
    match value {
        AttrValue::String(s) => {
            let (expanded, unknown) = expand_placeholders(s, snapshot);
            for token in unknown {
                warnings.push(
                    DiagnosticMessageBuilder::warning("Unknown placeholder")
                        .with_code("W-RES-3")
                        .problem(format!(
                            "Attribute `{name}` references `{{{{{token}}}}}`, \
                             which names no resolved attribute."
                        ))
                        .at(Location::stage("resolve"))
                        .build(),
                );
            }
            *s = expanded;
        }
        AttrValue::List(items) => {
            for item in items {
                expand_value(name, item, snapshot, warnings);
            }
        }
        _ => {}
    }
}
