//! Fragment injection.
//!
//! Active fragments contribute output pieces (package lines, input lines,
//! inline text) into template slots and variables. Pieces are injected in
//! dependency order: `depends_on` edges first, manifest declaration order
//! breaking ties, so the same activation set always injects identically.

use indexmap::IndexMap;
use weft_config::{
    AttrValue, ConfigError, ContentFacts, ExecutionContext, FragmentManifest, InjectTarget,
    PieceKind, TemplateManifest, expand_placeholders,
};
use weft_error_reporting::{DiagnosticCollector, DiagnosticMessageBuilder, Location};

use crate::error::{RenderError, Result};
use crate::state::RenderState;

/// The injection plan: active fragments in dependency order.
#[derive(Debug)]
pub struct FragmentConfig<'a> {
    ordered: Vec<&'a FragmentManifest>,
}

impl<'a> FragmentConfig<'a> {
    /// Order the active fragments topologically.
    ///
    /// Dependencies on inactive fragments are satisfied trivially (the
    /// dependency simply is not injected), but the name must exist among
    /// the known fragments. A cycle among active fragments has no
    /// deterministic order and is an error.
    pub fn plan(all: &'a [FragmentManifest], active_ids: &[String]) -> Result<Self> {
        let active: Vec<&FragmentManifest> = active_ids
            .iter()
            .filter_map(|id| all.iter().find(|f| f.id == *id))
            .collect();

        for fragment in &active {
            for dep in &fragment.depends_on {
                if !all.iter().any(|f| f.id == *dep) {
                    return Err(RenderError::Config(ConfigError::UnknownFragmentDependency {
                        fragment: fragment.id.clone(),
                        dependency: dep.clone(),
                    }));
                }
            }
        }

        // Kahn's algorithm, always taking the first ready fragment in
        // declaration order
        let mut ordered: Vec<&FragmentManifest> = Vec::with_capacity(active.len());
        let mut placed: Vec<&str> = Vec::with_capacity(active.len());
        let mut pending: Vec<&FragmentManifest> = active.clone();
        while !pending.is_empty() {
            let ready = pending.iter().position(|f| {
                f.depends_on.iter().all(|dep| {
                    placed.contains(&dep.as_str()) || !pending.iter().any(|p| p.id == *dep)
                })
            });
            match ready {
                Some(i) => {
                    let fragment = pending.remove(i);
                    placed.push(&fragment.id);
                    ordered.push(fragment);
                }
                None => {
                    return Err(RenderError::FragmentCycle(pending[0].id.clone()));
                }
            }
        }
        Ok(FragmentConfig { ordered })
    }

    pub fn ordered(&self) -> &[&'a FragmentManifest] {
        &self.ordered
    }

    pub fn ids(&self) -> Vec<&str> {
        self.ordered.iter().map(|f| f.id.as_str()).collect()
    }
}

/// One rendered piece with its destination.
#[derive(Debug, Clone, PartialEq)]
pub struct InjectedPiece {
    pub fragment_id: String,
    pub kind: PieceKind,
    pub target: InjectTarget,
    pub text: String,
}

/// Renders and places the active fragments' pieces.
pub struct FragmentInjector<'a> {
    template: &'a TemplateManifest,
    config: FragmentConfig<'a>,
}

impl<'a> FragmentInjector<'a> {
    pub fn new(template: &'a TemplateManifest, config: FragmentConfig<'a>) -> Self {
        FragmentInjector { template, config }
    }

    /// Check every piece target against the template's declared slots and
    /// variables. Runs before any piece is rendered, so a bad manifest
    /// fails the render instead of half-injecting.
    pub fn validate_targets(&self) -> Result<()> {
        for fragment in self.config.ordered() {
            for piece in &fragment.pieces {
                let declared = match &piece.target {
                    InjectTarget::Slot(name) => self.template.declares_slot(name),
                    InjectTarget::Variable(name) => self.template.declares_variable(name),
                };
                if !declared {
                    return Err(RenderError::Template {
                        fragment: fragment.id.clone(),
                        target: piece.target.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Render every piece in dependency order.
    ///
    /// Each fragment passes an emit gate first: a fragment can be active
    /// (explicitly requested, say) while its trigger no longer holds over
    /// the final render facts — a requested bibliography with zero
    /// citations recorded emits nothing.
    pub fn inject(
        &self,
        ctx: &ExecutionContext,
        state: &RenderState,
        diagnostics: &mut DiagnosticCollector,
    ) -> Result<Vec<InjectedPiece>> {
        self.validate_targets()?;
        let scope = piece_scope(ctx, state);
        let facts = state.to_facts();
        let mut pieces = Vec::new();
        for fragment in self.config.ordered() {
            if !should_render(fragment, ctx, &facts) {
                tracing::debug!(fragment = %fragment.id, "fragment emits nothing");
                continue;
            }
            for spec in &fragment.pieces {
                let (text, unknown) = expand_placeholders(&spec.output, &scope);
                for name in unknown {
                    diagnostics.push(
                        DiagnosticMessageBuilder::warning("Unknown placeholder in fragment piece")
                            .with_code("W-INJ-1")
                            .problem(format!(
                                "Fragment `{}` uses placeholder `{{{{{name}}}}}` which matches \
                                 no attribute or render fact.",
                                fragment.id
                            ))
                            .add_hint("The token is left verbatim in the injected text.")
                            .at(Location::stage("inject"))
                            .build(),
                    );
                }
                pieces.push(InjectedPiece {
                    fragment_id: fragment.id.clone(),
                    kind: spec.kind,
                    target: spec.target.clone(),
                    text,
                });
            }
            tracing::debug!(fragment = %fragment.id, "fragment injected");
        }
        Ok(pieces)
    }
}

/// The per-fragment emit gate: the trigger re-evaluated against the final
/// resolved attributes and render facts. Fragments without a trigger
/// always render.
fn should_render(
    fragment: &FragmentManifest,
    ctx: &ExecutionContext,
    facts: &ContentFacts,
) -> bool {
    match &fragment.trigger {
        Some(trigger) => trigger.evaluate(&ctx.resolved_attributes, Some(facts)),
        None => true,
    }
}

/// The expansion scope for piece output: resolved attributes plus
/// render facts exposed as pseudo-attributes.
fn piece_scope(ctx: &ExecutionContext, state: &RenderState) -> IndexMap<String, AttrValue> {
    let mut scope = ctx.resolved_attributes.clone();
    scope.insert(
        "citations".to_string(),
        AttrValue::List(state.citations.iter().map(|k| k.as_str().into()).collect()),
    );
    scope.insert(
        "index-terms".to_string(),
        AttrValue::List(state.index_terms.iter().map(|t| t.as_str().into()).collect()),
    );
    scope.insert(
        "assets".to_string(),
        AttrValue::List(state.assets.iter().map(|a| a.as_str().into()).collect()),
    );
    scope.insert("language".to_string(), AttrValue::from(ctx.language.as_str()));
    scope
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_config::{NumberingMode, PieceSpec};

    fn fragment(id: &str, deps: &[&str]) -> FragmentManifest {
        let mut f = FragmentManifest::new(id);
        f.depends_on = deps.iter().map(|d| d.to_string()).collect();
        f
    }

    fn active(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn declaration_order_without_dependencies() {
        let all = vec![fragment("a", &[]), fragment("b", &[]), fragment("c", &[])];
        let config = FragmentConfig::plan(&all, &active(&["a", "b", "c"])).unwrap();
        assert_eq!(config.ids(), vec!["a", "b", "c"]);
    }

    #[test]
    fn dependencies_order_first() {
        let all = vec![fragment("toc", &["bibliography"]), fragment("bibliography", &[])];
        let config = FragmentConfig::plan(&all, &active(&["toc", "bibliography"])).unwrap();
        assert_eq!(config.ids(), vec!["bibliography", "toc"]);
    }

    #[test]
    fn inactive_dependency_is_skipped_not_injected() {
        let all = vec![fragment("a", &["b"]), fragment("b", &[])];
        let config = FragmentConfig::plan(&all, &active(&["a"])).unwrap();
        assert_eq!(config.ids(), vec!["a"]);
    }

    #[test]
    fn unknown_dependency_errors() {
        let all = vec![fragment("a", &["ghost"])];
        let err = FragmentConfig::plan(&all, &active(&["a"])).unwrap_err();
        assert!(matches!(err, RenderError::Config(_)));
    }

    #[test]
    fn cycle_errors_deterministically() {
        let all = vec![fragment("a", &["b"]), fragment("b", &["a"])];
        let err = FragmentConfig::plan(&all, &active(&["a", "b"])).unwrap_err();
        assert!(matches!(err, RenderError::FragmentCycle(id) if id == "a"));
    }

    fn context() -> ExecutionContext {
        ExecutionContext {
            document_ref: "doc.qmd".to_string(),
            resolved_attributes: IndexMap::new(),
            active_fragments: vec![],
            slot_requests: IndexMap::new(),
            language: "en".to_string(),
            numbering_mode: NumberingMode::Numbered,
            partial_providers: IndexMap::new(),
            base_level_override: 0,
        }
    }

    #[test]
    fn undeclared_target_is_a_template_error() {
        let template = TemplateManifest::new("article");
        let mut f = fragment("bibliography", &[]);
        f.pieces.push(PieceSpec {
            kind: PieceKind::Inline,
            target: InjectTarget::Slot("references".to_string()),
            output: "\\printbibliography".to_string(),
        });
        let all = vec![f];
        let config = FragmentConfig::plan(&all, &active(&["bibliography"])).unwrap();
        let injector = FragmentInjector::new(&template, config);
        let err = injector.validate_targets().unwrap_err();
        assert!(matches!(
            err,
            RenderError::Template { fragment, target }
                if fragment == "bibliography" && target == "slot `references`"
        ));
    }

    #[test]
    fn pieces_expand_against_facts() {
        let mut template = TemplateManifest::new("article");
        template.variables.push("preamble".to_string());
        let mut f = fragment("bibliography", &[]);
        f.pieces.push(PieceSpec {
            kind: PieceKind::Package,
            target: InjectTarget::Variable("preamble".to_string()),
            output: "% keys: {{citations}}".to_string(),
        });
        let all = vec![f];
        let config = FragmentConfig::plan(&all, &active(&["bibliography"])).unwrap();
        let injector = FragmentInjector::new(&template, config);

        let ctx = context();
        let mut state = RenderState::new();
        state.record_citation("knuth1984");
        let mut diagnostics = DiagnosticCollector::new();
        let pieces = injector.inject(&ctx, &state, &mut diagnostics).unwrap();
        assert_eq!(pieces[0].text, "% keys: knuth1984");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn active_fragment_without_matching_content_emits_nothing() {
        use weft_config::Trigger;

        let mut template = TemplateManifest::new("article");
        template.variables.push("preamble".to_string());
        let mut f = fragment("bibliography", &[]);
        f.trigger = Some(Trigger::CitationsPresent);
        f.pieces.push(PieceSpec {
            kind: PieceKind::Inline,
            target: InjectTarget::Variable("preamble".to_string()),
            output: "\\printbibliography".to_string(),
        });
        let all = vec![f];

        // requested, hence active, but no citations were ever recorded
        let config = FragmentConfig::plan(&all, &active(&["bibliography"])).unwrap();
        let injector = FragmentInjector::new(&template, config);
        let ctx = context();
        let mut diagnostics = DiagnosticCollector::new();
        let pieces = injector
            .inject(&ctx, &RenderState::new(), &mut diagnostics)
            .unwrap();
        assert!(pieces.is_empty());

        // with a citation the same fragment renders
        let config = FragmentConfig::plan(&all, &active(&["bibliography"])).unwrap();
        let injector = FragmentInjector::new(&template, config);
        let mut state = RenderState::new();
        state.record_citation("knuth1984");
        let pieces = injector.inject(&ctx, &state, &mut diagnostics).unwrap();
        assert_eq!(pieces.len(), 1);
    }

    #[test]
    fn unknown_piece_placeholder_warns() {
        let mut template = TemplateManifest::new("article");
        template.variables.push("preamble".to_string());
        let mut f = fragment("fonts", &[]);
        f.pieces.push(PieceSpec {
            kind: PieceKind::Package,
            target: InjectTarget::Variable("preamble".to_string()),
            output: "\\setmainfont{ {{main-font}} }".to_string(),
        });
        let all = vec![f];
        let config = FragmentConfig::plan(&all, &active(&["fonts"])).unwrap();
        let injector = FragmentInjector::new(&template, config);

        let ctx = context();
        let state = RenderState::new();
        let mut diagnostics = DiagnosticCollector::new();
        let pieces = injector.inject(&ctx, &state, &mut diagnostics).unwrap();
        assert!(pieces[0].text.contains("{{main-font}}"));
        assert_eq!(diagnostics.messages()[0].code.as_deref(), Some("W-INJ-1"));
    }
}
