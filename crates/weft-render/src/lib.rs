//! Render core for Weft.
//!
//! This crate takes a frozen execution context and a normalized tree and
//! produces per-slot target output:
//!
//! - [`slots`] detaches slot subtrees and aligns heading levels
//! - [`partials`] binds exactly one renderer per node kind
//! - [`phase`] walks each slot four times (pre, block, inline, post)
//!   through a typed handler table
//! - [`fragments`] injects active fragments' output pieces
//! - [`pipeline`] wires the stages into one document render
//!
//! The pipeline is single-document-sequential; the shared [`Registry`] is
//! immutable, so independent documents can render concurrently.

pub mod cancel;
pub mod error;
pub mod fragments;
pub mod handlers;
pub mod latex;
pub mod partials;
pub mod phase;
pub mod pipeline;
pub mod slots;
pub mod state;

pub use cancel::Cancellation;
pub use error::{RenderError, Result};
pub use fragments::{FragmentConfig, FragmentInjector, InjectedPiece};
pub use partials::{PartialBinding, PartialCatalog, PartialSet, PartialSource, resolve_partials};
pub use phase::{
    BlockAction, HandlerContext, HandlerError, InlineAction, Phase, PhaseEngine, PhaseHandler,
};
pub use pipeline::{DocumentPipeline, Registry, RenderOutput, SlotOutput};
pub use slots::{SlotFragment, SlotMap, extract_slots};
pub use state::RenderState;
