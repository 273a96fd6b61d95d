//! Per-frame consumption of a computed table.
//!
//! Nothing here recomputes layout: drawing a frame only looks intervals up
//! against the current zoom factor.

use super::types::{ModeLayout, RowDescriptor, RowId, Side};
use crate::ir::LabelId;

/// What a renderer knows about the row it is drawing. Scoped to one row of
/// one frame and passed explicitly to every callback.
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
    pub mode: &'a str,
    pub row: &'a RowDescriptor,
    pub k: f64,
}

impl RowContext<'_> {
    pub fn id(&self) -> RowId {
        self.row.id
    }

    pub fn side(&self) -> Side {
        self.row.side
    }

    pub fn lane(&self) -> usize {
        self.row.lane
    }
}

pub trait RowRenderer {
    /// Called once per row before its labels.
    fn begin_row(&mut self, _ctx: &RowContext<'_>) {}

    fn draw_label(&mut self, ctx: &RowContext<'_>, label: &LabelId);
}

/// Hand every label visible at `k` to `renderer`, row by row. Returns the
/// number of labels drawn.
pub fn draw_frame<R: RowRenderer + ?Sized>(layout: &ModeLayout, k: f64, renderer: &mut R) -> usize {
    let mut per_row: Vec<Vec<&LabelId>> = vec![Vec::new(); layout.rows.len()];
    for (label, row) in layout.visible_at(k) {
        if let Some(bucket) = per_row.get_mut(row.0) {
            bucket.push(label);
        }
    }

    let mut drawn = 0;
    for (descriptor, labels) in layout.rows.iter().zip(per_row) {
        let ctx = RowContext {
            mode: &layout.name,
            row: descriptor,
            k,
        };
        renderer.begin_row(&ctx);
        for label in labels {
            renderer.draw_label(&ctx, label);
            drawn += 1;
        }
    }
    drawn
}
