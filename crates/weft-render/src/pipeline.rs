//! The document render pipeline.
//!
//! One render is single-document-sequential: resolve, extract slots, bind
//! partials, run the four phases per slot, re-resolve with content facts,
//! inject fragments, serialize. The shared [`Registry`] is immutable, so
//! independent documents can render concurrently from the same registry.

use indexmap::IndexMap;
use weft_config::{
    ContentFacts, ContextResolver, ExecutionContext, FragmentManifest, InjectTarget, SourceSet,
    TemplateManifest,
};
use weft_dom::{Document, NodeKind};
use weft_error_reporting::{DiagnosticCollector, DiagnosticMessage};

use crate::cancel::Cancellation;
use crate::error::{RenderError, Result};
use crate::fragments::{FragmentConfig, FragmentInjector};
use crate::latex::Writer;
use crate::partials::{PartialCatalog, PartialSet, resolve_partials};
use crate::phase::PhaseEngine;
use crate::slots::extract_slots;
use crate::state::RenderState;

/// Everything shared across renders: the template, the fragment catalog,
/// and the core partial coverage. Owned data only, so a registry can sit
/// behind an `Arc` and serve renders from many threads.
#[derive(Debug, Clone)]
pub struct Registry {
    pub template: TemplateManifest,
    pub fragments: Vec<FragmentManifest>,
    pub core_partials: PartialCatalog,
}

impl Registry {
    pub fn new(template: TemplateManifest) -> Self {
        Registry {
            template,
            fragments: Vec::new(),
            core_partials: PartialCatalog::latex(),
        }
    }

    pub fn with_fragment(mut self, fragment: FragmentManifest) -> Self {
        self.fragments.push(fragment);
        self
    }
}

/// One slot's serialized output.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotOutput {
    pub name: String,
    pub text: String,
    /// Whether the slot's selector matched content in the document.
    pub matched: bool,
}

/// The result of a successful render.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    /// Serialized slots in template declaration order.
    pub slots: IndexMap<String, SlotOutput>,
    /// Template variables filled by fragment pieces; declared variables
    /// with no pieces are present and empty.
    pub variables: IndexMap<String, String>,
    /// Content facts gathered while rendering.
    pub facts: ContentFacts,
    /// Document metadata, including a promoted title if any.
    pub meta: IndexMap<String, String>,
    /// Fragments active after the second activation round.
    pub active_fragments: Vec<String>,
    /// All diagnostics raised during the render, in order.
    pub diagnostics: Vec<DiagnosticMessage>,
}

/// Renders documents against one registry.
pub struct DocumentPipeline<'a> {
    registry: &'a Registry,
    engine: PhaseEngine,
}

impl<'a> DocumentPipeline<'a> {
    /// A pipeline with the built-in handler set.
    pub fn new(registry: &'a Registry) -> Self {
        DocumentPipeline {
            registry,
            engine: PhaseEngine::with_default_handlers(),
        }
    }

    /// A pipeline with a caller-assembled engine.
    pub fn with_engine(registry: &'a Registry, engine: PhaseEngine) -> Self {
        DocumentPipeline { registry, engine }
    }

    /// Render one document.
    pub fn render(
        &self,
        document_ref: &str,
        mut document: Document,
        sources: &SourceSet,
        cancel: &Cancellation,
    ) -> Result<RenderOutput> {
        let mut diagnostics = DiagnosticCollector::new();
        let resolver = ContextResolver::new(&self.registry.template, &self.registry.fragments);

        // first activation round: no content facts yet
        let round1 = resolver.resolve(document_ref, sources)?;
        diagnostics.extend(round1.warnings);
        let ctx = round1.context;
        tracing::info!(
            document = document_ref,
            template = %self.registry.template.id,
            active = ?ctx.active_fragments,
            "render start"
        );

        // partials bind against the first round's activation set; a
        // missing required partial aborts before any phase runs
        let partials = self.bind_partials(&ctx)?;

        let mut slots = extract_slots(&mut document, &ctx, &mut diagnostics);

        let mut state = RenderState::new();
        for slot in slots.values_mut() {
            self.engine
                .run(slot, &ctx, &mut state, &mut diagnostics, cancel)?;
        }

        // second activation round: content-driven fragments join in
        let facts = state.to_facts();
        let round2 = resolver.resolve_with_facts(document_ref, sources, &facts)?;
        diagnostics.extend(round2.warnings);
        let ctx = round2.context;
        self.check_late_required_partials(&ctx, &partials)?;

        if cancel.is_cancelled() {
            return Err(RenderError::Cancelled);
        }

        // inject fragment pieces in dependency order
        let config = FragmentConfig::plan(&self.registry.fragments, &ctx.active_fragments)?;
        let injector = FragmentInjector::new(&self.registry.template, config);
        let pieces = injector.inject(&ctx, &state, &mut diagnostics)?;

        // serialize slots, then place pieces
        let writer = Writer::new(&partials, &ctx);
        let mut outputs: IndexMap<String, SlotOutput> = slots
            .values()
            .map(|slot| {
                (
                    slot.slot_name.clone(),
                    SlotOutput {
                        name: slot.slot_name.clone(),
                        text: writer.write_blocks(&slot.blocks),
                        matched: slot.matched,
                    },
                )
            })
            .collect();

        let mut variables: IndexMap<String, String> = self
            .registry
            .template
            .variables
            .iter()
            .map(|name| (name.clone(), String::new()))
            .collect();
        for piece in pieces {
            match &piece.target {
                InjectTarget::Slot(name) => {
                    if let Some(output) = outputs.get_mut(name) {
                        push_line(&mut output.text, &piece.text);
                    }
                }
                InjectTarget::Variable(name) => {
                    if let Some(value) = variables.get_mut(name) {
                        push_line(value, &piece.text);
                    }
                }
            }
        }

        tracing::info!(
            document = document_ref,
            slots = outputs.len(),
            diagnostics = diagnostics.len(),
            "render done"
        );
        Ok(RenderOutput {
            slots: outputs,
            variables,
            facts,
            meta: document.meta,
            active_fragments: ctx.active_fragments,
            diagnostics: diagnostics.into_messages(),
        })
    }

    fn bind_partials(&self, ctx: &ExecutionContext) -> Result<PartialSet> {
        let active: Vec<&FragmentManifest> = self
            .registry
            .fragments
            .iter()
            .filter(|f| ctx.is_fragment_active(&f.id))
            .collect();
        resolve_partials(
            &NodeKind::ALL,
            &self.registry.template,
            &active,
            &self.registry.core_partials,
        )
    }

    /// Partials stay bound from the first round; fragments that only
    /// activate on content facts cannot override partials, but their
    /// required partials must still be satisfied.
    fn check_late_required_partials(
        &self,
        ctx: &ExecutionContext,
        partials: &PartialSet,
    ) -> Result<()> {
        for fragment in &self.registry.fragments {
            if !ctx.is_fragment_active(&fragment.id) {
                continue;
            }
            for name in &fragment.required_partials {
                let bound = NodeKind::from_str_name(name)
                    .map(|kind| partials.contains_key(&kind))
                    .unwrap_or(false);
                if !bound {
                    return Err(RenderError::MissingPartialProvider {
                        name: name.clone(),
                        declared_by: format!("fragment `{}`", fragment.id),
                    });
                }
            }
        }
        Ok(())
    }
}

fn push_line(buffer: &mut String, text: &str) {
    if !buffer.is_empty() && !buffer.ends_with('\n') {
        buffer.push('\n');
    }
    buffer.push_str(text);
    if !text.ends_with('\n') {
        buffer.push('\n');
    }
}
