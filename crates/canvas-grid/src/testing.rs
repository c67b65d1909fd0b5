//! Test doubles for exercising the render pipeline without real pixels.

use std::cell::RefCell;
use std::rc::Rc;

use crate::geometry::{GridCell, PixelExtent, PixelRect};
use crate::layer::DrawContext;
use crate::surface::DrawSurface;

/// One recorded surface operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceOp {
    Resized(PixelExtent),
    Cleared,
    ClearedRect(PixelRect),
}

/// A [`DrawSurface`] that records every operation instead of drawing.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<SurfaceOp>,
    extent: PixelExtent,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extent(&self) -> PixelExtent {
        self.extent
    }

    pub fn cleared_count(&self) -> usize {
        self.ops.iter().filter(|op| **op == SurfaceOp::Cleared).count()
    }

    /// All rectangles wiped by `clear_rect`, in call order.
    pub fn cleared_rects(&self) -> Vec<PixelRect> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::ClearedRect(rect) => Some(*rect),
                _ => None,
            })
            .collect()
    }
}

impl DrawSurface for RecordingSurface {
    fn resize(&mut self, extent: PixelExtent) {
        self.extent = extent;
        self.ops.push(SurfaceOp::Resized(extent));
    }

    fn clear(&mut self) {
        self.ops.push(SurfaceOp::Cleared);
    }

    fn clear_rect(&mut self, rect: PixelRect) {
        self.ops.push(SurfaceOp::ClearedRect(rect));
    }
}

/// Shared log of cell indices drawn by a per-cell callback.
pub type DrawLog = Rc<RefCell<Vec<usize>>>;

pub fn draw_log() -> DrawLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// A per-cell draw callback that appends each drawn cell index to `log`.
pub fn logging_cell_fn<S>(log: &DrawLog) -> impl FnMut(&mut S, &GridCell, &DrawContext<'_>) + 'static {
    let log = Rc::clone(log);
    move |_surface, cell, _ctx| log.borrow_mut().push(cell.index)
}

/// A whole-canvas draw callback that counts invocations in `log` (one entry
/// per call, holding the running call number).
pub fn counting_whole_fn<S>(log: &DrawLog) -> impl FnMut(&mut S, &DrawContext<'_>) + 'static {
    let log = Rc::clone(log);
    move |_surface, _ctx| {
        let next = log.borrow().len();
        log.borrow_mut().push(next);
    }
}
