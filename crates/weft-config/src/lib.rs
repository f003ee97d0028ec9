//! Attribute resolution and execution contexts for Weft.
//!
//! This crate is the configuration middle-end: it merges override sources
//! (CLI, front matter, config file, fragment and template defaults) under
//! one deterministic precedence order, enforces attribute ownership, runs
//! the two-round fragment-activation fixed point, expands placeholders,
//! and freezes the result into an immutable [`ExecutionContext`].
//!
//! # Key guarantees
//!
//! - **Ownership**: an attribute name has exactly one owner across the
//!   active template and fragments; a second owner is
//!   [`ConfigError::OwnershipConflict`], never a silent overwrite.
//! - **Precedence**: a spec's `sources` list is walked in declared order;
//!   the first present value wins.
//! - **Determinism**: resolution is a pure function of its inputs.

pub mod context;
pub mod error;
pub mod facts;
pub mod manifest;
pub mod placeholder;
pub mod registry;
pub mod resolver;
pub mod source;
pub mod spec;
pub mod value;

pub use context::{ExecutionContext, NumberingMode, SlotRequest};
pub use error::{ConfigError, Result};
pub use facts::ContentFacts;
pub use manifest::{
    FragmentManifest, InjectTarget, PieceKind, PieceSpec, SlotSelector, SlotSpec,
    TemplateManifest, Trigger, compute_partial_providers,
};
pub use placeholder::{expand_placeholders, has_placeholders};
pub use registry::AttributeRegistry;
pub use resolver::{ContextResolver, Resolution};
pub use source::{SourceLayer, SourceSet};
pub use spec::{AttrType, AttributeSpec, Owner};
pub use value::{AttrValue, RawValue};
