//! The document root.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::block::Blocks;

/// A normalized document: metadata plus a block sequence.
///
/// The metadata map carries values promoted out of the tree (a promoted
/// title, for instance); the full front-matter override source lives with
/// the context resolver, not here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    pub meta: IndexMap<String, String>,
    pub blocks: Blocks,
}

impl Document {
    pub fn new(blocks: Blocks) -> Self {
        Document {
            meta: IndexMap::new(),
            blocks,
        }
    }
}
