//! The four-phase render engine.
//!
//! Every slot is walked four times, in fixed order: pre, block, inline,
//! post. No phase is skippable, even when nothing is registered for it;
//! skipping is what makes phase interactions untestable. Handlers are
//! dispatched from a table keyed by `(Phase, NodeKind)`; kind-specific
//! registrations run before [`NodeKind::Any`] catch-alls, registration
//! order breaking ties within each group.
//!
//! Handlers mutate the node they are handed, or return an action that
//! rebuilds it. Sibling and ancestor mutation is off the table: the
//! engine owns the traversal, and actions are the only way a handler
//! changes tree shape.

use std::collections::HashMap;

use weft_config::ExecutionContext;
use weft_dom::block::{Block, Blocks, RawBlock};
use weft_dom::inline::{Inline, Inlines, RawInline};
use weft_dom::NodeKind;
use weft_error_reporting::{DiagnosticCollector, DiagnosticMessageBuilder, Location};

use crate::cancel::Cancellation;
use crate::error::{RenderError, Result};
use crate::slots::SlotFragment;
use crate::state::RenderState;

/// The four render phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Structural normalization: unwrap wrappers, drop foreign raw nodes,
    /// expand placeholders in text.
    Pre,
    /// Block-level rewrites: heading alignment, figure layout.
    Block,
    /// Inline rewrites and fact collection: citations, script usage.
    Inline,
    /// Cross-cutting finalization: numbering, heading records, assets.
    Post,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Pre, Phase::Block, Phase::Inline, Phase::Post];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Pre => "pre",
            Phase::Block => "block",
            Phase::Inline => "inline",
            Phase::Post => "post",
        }
    }
}

/// What a handler wants done with a block node.
///
/// `Replace` and `Splice` re-enter dispatch for the new content, so a
/// handler that keeps the node's kind should mutate in place and return
/// `Keep` instead of replacing, or it will be handed its own output.
#[derive(Debug)]
pub enum BlockAction {
    Keep,
    Replace(Block),
    Splice(Blocks),
    Remove,
}

/// What a handler wants done with an inline node. Same re-dispatch rules
/// as [`BlockAction`].
#[derive(Debug)]
pub enum InlineAction {
    Keep,
    Replace(Inline),
    Splice(Inlines),
    Remove,
}

/// A per-node handler failure.
///
/// Recoverable failures cost one node: the engine substitutes a
/// placeholder, records a diagnostic, and continues. Fatal failures
/// abort the whole render.
#[derive(Debug)]
pub struct HandlerError {
    pub message: String,
    pub fatal: bool,
}

impl HandlerError {
    pub fn recoverable(message: impl Into<String>) -> Self {
        HandlerError {
            message: message.into(),
            fatal: false,
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        HandlerError {
            message: message.into(),
            fatal: true,
        }
    }
}

/// Everything a handler may read or write besides the node itself.
pub struct HandlerContext<'a> {
    pub ctx: &'a ExecutionContext,
    pub state: &'a mut RenderState,
    pub diagnostics: &'a mut DiagnosticCollector,
    /// Name of the slot being processed.
    pub slot: &'a str,
    /// The slot's heading shift, applied during the block phase.
    pub level_shift: i64,
    path: Vec<usize>,
}

impl HandlerContext<'_> {
    /// Dotted child-index path of the current node within the slot.
    pub fn node_path(&self) -> String {
        let parts: Vec<String> = self.path.iter().map(|i| i.to_string()).collect();
        parts.join(".")
    }
}

/// A render handler. One handler may register for several
/// `(phase, kind)` pairs; block and inline callbacks default to no-ops so
/// implementors only write the side they dispatch on.
pub trait PhaseHandler: Send + Sync {
    fn name(&self) -> &'static str;

    /// The `(phase, kind)` pairs this handler runs for.
    fn registrations(&self) -> Vec<(Phase, NodeKind)>;

    fn handle_block(
        &self,
        _block: &mut Block,
        _cx: &mut HandlerContext<'_>,
    ) -> std::result::Result<BlockAction, HandlerError> {
        Ok(BlockAction::Keep)
    }

    fn handle_inline(
        &self,
        _inline: &mut Inline,
        _cx: &mut HandlerContext<'_>,
    ) -> std::result::Result<InlineAction, HandlerError> {
        Ok(InlineAction::Keep)
    }
}

enum Outcome<A> {
    Kept,
    Action(A),
    Failed,
}

/// The handler table plus the traversal that drives it.
#[derive(Default)]
pub struct PhaseEngine {
    handlers: Vec<Box<dyn PhaseHandler>>,
    table: HashMap<(Phase, NodeKind), Vec<usize>>,
}

impl PhaseEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine loaded with the built-in handler set.
    pub fn with_default_handlers() -> Self {
        let mut engine = Self::new();
        for handler in crate::handlers::default_handlers() {
            engine.register(handler);
        }
        engine
    }

    pub fn register(&mut self, handler: Box<dyn PhaseHandler>) {
        let idx = self.handlers.len();
        for (phase, kind) in handler.registrations() {
            self.table.entry((phase, kind)).or_default().push(idx);
        }
        self.handlers.push(handler);
    }

    /// Run all four phases over one slot. Cancellation is honored between
    /// phases, never inside a traversal.
    pub fn run(
        &self,
        slot: &mut SlotFragment,
        ctx: &ExecutionContext,
        state: &mut RenderState,
        diagnostics: &mut DiagnosticCollector,
        cancel: &Cancellation,
    ) -> Result<()> {
        for phase in Phase::ALL {
            if cancel.is_cancelled() {
                return Err(RenderError::Cancelled);
            }
            self.run_phase(phase, slot, ctx, state, diagnostics)?;
        }
        Ok(())
    }

    /// Run a single phase over one slot.
    pub fn run_phase(
        &self,
        phase: Phase,
        slot: &mut SlotFragment,
        ctx: &ExecutionContext,
        state: &mut RenderState,
        diagnostics: &mut DiagnosticCollector,
    ) -> Result<()> {
        tracing::debug!(phase = phase.as_str(), slot = %slot.slot_name, "phase start");
        let mut cx = HandlerContext {
            ctx,
            state,
            diagnostics,
            slot: &slot.slot_name,
            level_shift: slot.level_shift,
            path: Vec::new(),
        };
        self.process_blocks(phase, &mut slot.blocks, &mut cx)
    }

    fn matching(&self, phase: Phase, kind: NodeKind) -> impl Iterator<Item = usize> + '_ {
        self.table
            .get(&(phase, kind))
            .into_iter()
            .flatten()
            .chain(self.table.get(&(phase, NodeKind::Any)).into_iter().flatten())
            .copied()
    }

    fn process_blocks(
        &self,
        phase: Phase,
        blocks: &mut Blocks,
        cx: &mut HandlerContext<'_>,
    ) -> Result<()> {
        let mut i = 0;
        while i < blocks.len() {
            cx.path.push(i);
            let outcome = self.dispatch_block(phase, &mut blocks[i], cx)?;
            cx.path.pop();
            match outcome {
                Outcome::Kept => {
                    cx.path.push(i);
                    self.process_block_children(phase, &mut blocks[i], cx)?;
                    cx.path.pop();
                    i += 1;
                }
                Outcome::Action(BlockAction::Keep) => unreachable!("Keep handled as Kept"),
                Outcome::Action(BlockAction::Replace(block)) => {
                    blocks[i] = block;
                    // re-dispatched at the same index
                }
                Outcome::Action(BlockAction::Splice(content)) => {
                    blocks.splice(i..=i, content);
                }
                Outcome::Action(BlockAction::Remove) => {
                    blocks.remove(i);
                }
                Outcome::Failed => {
                    blocks[i] = placeholder_block();
                    i += 1;
                }
            }
        }
        Ok(())
    }

    fn process_block_children(
        &self,
        phase: Phase,
        block: &mut Block,
        cx: &mut HandlerContext<'_>,
    ) -> Result<()> {
        match block {
            Block::BlockQuote(quote) => self.process_blocks(phase, &mut quote.content, cx),
            Block::Div(div) => self.process_blocks(phase, &mut div.content, cx),
            Block::Figure(figure) => {
                self.process_inlines(phase, &mut figure.caption, cx)?;
                self.process_blocks(phase, &mut figure.content, cx)
            }
            Block::OrderedList(list) => {
                for item in &mut list.content {
                    self.process_blocks(phase, item, cx)?;
                }
                Ok(())
            }
            Block::BulletList(list) => {
                for item in &mut list.content {
                    self.process_blocks(phase, item, cx)?;
                }
                Ok(())
            }
            Block::DefinitionList(list) => {
                for (term, definitions) in &mut list.content {
                    self.process_inlines(phase, term, cx)?;
                    for definition in definitions {
                        self.process_blocks(phase, definition, cx)?;
                    }
                }
                Ok(())
            }
            Block::Plain(plain) => self.process_inlines(phase, &mut plain.content, cx),
            Block::Paragraph(para) => self.process_inlines(phase, &mut para.content, cx),
            Block::Header(header) => self.process_inlines(phase, &mut header.content, cx),
            Block::CodeBlock(_) | Block::RawBlock(_) | Block::HorizontalRule(_) => Ok(()),
        }
    }

    fn process_inlines(
        &self,
        phase: Phase,
        inlines: &mut Inlines,
        cx: &mut HandlerContext<'_>,
    ) -> Result<()> {
        let mut i = 0;
        while i < inlines.len() {
            cx.path.push(i);
            let outcome = self.dispatch_inline(phase, &mut inlines[i], cx)?;
            cx.path.pop();
            match outcome {
                Outcome::Kept => {
                    cx.path.push(i);
                    self.process_inline_children(phase, &mut inlines[i], cx)?;
                    cx.path.pop();
                    i += 1;
                }
                Outcome::Action(InlineAction::Keep) => unreachable!("Keep handled as Kept"),
                Outcome::Action(InlineAction::Replace(inline)) => {
                    inlines[i] = inline;
                }
                Outcome::Action(InlineAction::Splice(content)) => {
                    inlines.splice(i..=i, content);
                }
                Outcome::Action(InlineAction::Remove) => {
                    inlines.remove(i);
                }
                Outcome::Failed => {
                    inlines[i] = placeholder_inline();
                    i += 1;
                }
            }
        }
        Ok(())
    }

    fn process_inline_children(
        &self,
        phase: Phase,
        inline: &mut Inline,
        cx: &mut HandlerContext<'_>,
    ) -> Result<()> {
        match inline {
            Inline::Emph(e) => self.process_inlines(phase, &mut e.content, cx),
            Inline::Strong(s) => self.process_inlines(phase, &mut s.content, cx),
            Inline::Link(l) => self.process_inlines(phase, &mut l.content, cx),
            Inline::Image(i) => self.process_inlines(phase, &mut i.content, cx),
            Inline::Span(s) => self.process_inlines(phase, &mut s.content, cx),
            Inline::Cite(c) => self.process_inlines(phase, &mut c.content, cx),
            Inline::Note(n) => self.process_blocks(phase, &mut n.content, cx),
            _ => Ok(()),
        }
    }

    fn dispatch_block(
        &self,
        phase: Phase,
        block: &mut Block,
        cx: &mut HandlerContext<'_>,
    ) -> Result<Outcome<BlockAction>> {
        for idx in self.matching(phase, block.kind()) {
            let handler = &self.handlers[idx];
            match handler.handle_block(block, cx) {
                Ok(BlockAction::Keep) => continue,
                Ok(action) => return Ok(Outcome::Action(action)),
                Err(err) => return self.node_failure(err, handler.name(), cx),
            }
        }
        Ok(Outcome::Kept)
    }

    fn dispatch_inline(
        &self,
        phase: Phase,
        inline: &mut Inline,
        cx: &mut HandlerContext<'_>,
    ) -> Result<Outcome<InlineAction>> {
        for idx in self.matching(phase, inline.kind()) {
            let handler = &self.handlers[idx];
            match handler.handle_inline(inline, cx) {
                Ok(InlineAction::Keep) => continue,
                Ok(action) => return Ok(Outcome::Action(action)),
                Err(err) => return self.node_failure(err, handler.name(), cx),
            }
        }
        Ok(Outcome::Kept)
    }

    fn node_failure<A>(
        &self,
        err: HandlerError,
        handler: &str,
        cx: &mut HandlerContext<'_>,
    ) -> Result<Outcome<A>> {
        if err.fatal {
            return Err(RenderError::FatalNode {
                slot: cx.slot.to_string(),
                node_path: cx.node_path(),
                message: err.message,
            });
        }
        cx.diagnostics.push(
            DiagnosticMessageBuilder::warning("Node render failure")
                .with_code("W-RND-1")
                .problem(err.message)
                .add_detail(format!("handler `{handler}` failed"))
                .add_hint("The node was replaced by a placeholder; the render continued.")
                .at(Location::in_slot("render", cx.slot).at_node(cx.node_path()))
                .build(),
        );
        Ok(Outcome::Failed)
    }
}

fn placeholder_block() -> Block {
    Block::RawBlock(RawBlock {
        format: "latex".to_string(),
        text: "% [node omitted: render failure]\n".to_string(),
    })
}

fn placeholder_inline() -> Inline {
    Inline::RawInline(RawInline {
        format: "latex".to_string(),
        text: "[node omitted]".to_string(),
    })
}
