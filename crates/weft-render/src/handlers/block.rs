//! Block-phase handlers.

use std::mem;

use weft_dom::NodeKind;
use weft_dom::block::{Block, Paragraph};
use weft_dom::inline::{Inline, Strong};

use crate::phase::{BlockAction, HandlerContext, HandlerError, Phase, PhaseHandler};

/// Applies the slot's heading shift so the slot's shallowest heading lands
/// on the level its spec asks for. The shift was computed per slot at
/// extraction time; slots never influence each other's levels.
///
/// When the slot's spec bounds heading depth, headings landing below the
/// bound are demoted to run-in emphasis instead of sectioning commands.
pub struct AlignHeadings;

impl PhaseHandler for AlignHeadings {
    fn name(&self) -> &'static str {
        "align-headings"
    }

    fn registrations(&self) -> Vec<(Phase, NodeKind)> {
        vec![(Phase::Block, NodeKind::Header)]
    }

    fn handle_block(
        &self,
        block: &mut Block,
        cx: &mut HandlerContext<'_>,
    ) -> Result<BlockAction, HandlerError> {
        if let Block::Header(header) = block {
            header.level += cx.level_shift;
            if let Some(bound) = depth_bound(cx) {
                if header.level > bound {
                    let content = mem::take(&mut header.content);
                    return Ok(BlockAction::Replace(Block::Paragraph(Paragraph {
                        content: vec![Inline::Strong(Strong { content })],
                    })));
                }
            }
        }
        Ok(BlockAction::Keep)
    }
}

/// Deepest effective level the slot still renders as a sectioning command.
fn depth_bound(cx: &HandlerContext<'_>) -> Option<i64> {
    let request = cx.ctx.slot_requests.get(cx.slot)?;
    let depth = request.spec.depth?;
    Some(request.spec.base_level + request.spec.offset + cx.ctx.base_level_override + depth - 1)
}
