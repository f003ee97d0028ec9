//! The built-in handler set.
//!
//! One module per phase. [`default_handlers`] returns the full set in
//! registration order; the pipeline loads it unless a caller supplies a
//! custom engine.

mod block;
mod inline;
mod post;
mod pre;

pub use block::AlignHeadings;
pub use inline::{CollectCitations, CollectScripts};
pub use post::{MarkUnnumbered, RecordAssets, RecordHeadings, RecordIndexTerms};
pub use pre::{DropForeignRaw, ExpandTextPlaceholders, UnwrapWrappers};

use crate::phase::PhaseHandler;

pub fn default_handlers() -> Vec<Box<dyn PhaseHandler>> {
    vec![
        Box::new(DropForeignRaw),
        Box::new(UnwrapWrappers),
        Box::new(ExpandTextPlaceholders),
        Box::new(AlignHeadings),
        Box::new(CollectCitations),
        Box::new(CollectScripts),
        Box::new(MarkUnnumbered),
        Box::new(RecordHeadings),
        Box::new(RecordAssets),
        Box::new(RecordIndexTerms),
    ]
}
