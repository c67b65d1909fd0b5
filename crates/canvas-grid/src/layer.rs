//! Layer registration and dirty-cell tracking.
//!
//! Layers are registered up front through [`LayerBuilder`] and addressed by
//! index thereafter; the registry never grows or shrinks while a grid is
//! live. Each layer owns its draw callback plus the dirty state the render
//! scheduler consumes: a full-redraw flag, a per-frame flag, and two cell
//! sets (single-frame marks drain after one working frame, multi-frame marks
//! persist until explicitly unmarked).
//!
//! Position-addressed marks cannot be resolved to flat indices eagerly,
//! because the grid's column count may change between the mark and the next
//! frame. They are queued as [`GridPos`] values and resolved against the
//! live geometry at frame start.

use std::collections::HashSet;

use crate::clock::FrameClock;
use crate::error::{CanvasGridError, Result};
use crate::geometry::{GridCell, GridGeometry, GridPos};

/// Read-only frame state handed to every draw callback.
pub struct DrawContext<'a> {
    pub geometry: &'a GridGeometry,
    pub clock: &'a FrameClock,
    /// Index of the layer being drawn.
    pub layer_index: usize,
    /// Total number of registered layers.
    pub layer_count: usize,
}

/// Callback drawing a single cell onto a layer surface.
pub type CellDrawFn<S> = Box<dyn FnMut(&mut S, &GridCell, &DrawContext<'_>)>;

/// Callback drawing a whole layer surface in one pass.
pub type WholeDrawFn<S> = Box<dyn FnMut(&mut S, &DrawContext<'_>)>;

pub(crate) enum LayerDrawFn<S> {
    PerCell(CellDrawFn<S>),
    WholeCanvas(WholeDrawFn<S>),
}

/// Locator for a cell when marking dirty state: either the flat index or a
/// row/column position resolved lazily against the frame's geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellRef {
    Index(usize),
    Pos(GridPos),
}

impl From<usize> for CellRef {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<GridPos> for CellRef {
    fn from(pos: GridPos) -> Self {
        Self::Pos(pos)
    }
}

pub(crate) struct LayerState<S> {
    pub(crate) draw_fn: LayerDrawFn<S>,
    pub(crate) redraw_all: bool,
    pub(crate) redraw_per_frame: bool,
    pub(crate) single_frame: HashSet<usize>,
    pub(crate) multi_frame: HashSet<usize>,
    pending_single: Vec<GridPos>,
    pending_multi: Vec<GridPos>,
    pending_multi_removals: Vec<GridPos>,
}

impl<S> LayerState<S> {
    fn new(draw_fn: LayerDrawFn<S>) -> Self {
        Self {
            draw_fn,
            redraw_all: false,
            redraw_per_frame: false,
            single_frame: HashSet::new(),
            multi_frame: HashSet::new(),
            pending_single: Vec::new(),
            pending_multi: Vec::new(),
            pending_multi_removals: Vec::new(),
        }
    }

    pub(crate) fn is_per_cell(&self) -> bool {
        matches!(self.draw_fn, LayerDrawFn::PerCell(_))
    }

    /// True when the layer has any per-cell work queued, including
    /// position marks not yet resolved.
    pub(crate) fn has_dirty_cells(&self) -> bool {
        !self.single_frame.is_empty()
            || !self.multi_frame.is_empty()
            || !self.pending_single.is_empty()
            || !self.pending_multi.is_empty()
            || !self.pending_multi_removals.is_empty()
    }

    /// Flush position-addressed marks into the index sets using the frame's
    /// column count. Additions resolve before removals so a mark-then-unmark
    /// sequence within one frame nets out to nothing.
    pub(crate) fn resolve_pending(&mut self, cols: u32) {
        for pos in self.pending_single.drain(..) {
            self.single_frame
                .insert((pos.row * cols + pos.col) as usize);
        }
        for pos in self.pending_multi.drain(..) {
            self.multi_frame.insert((pos.row * cols + pos.col) as usize);
        }
        for pos in self.pending_multi_removals.drain(..) {
            self.multi_frame.remove(&((pos.row * cols + pos.col) as usize));
        }
    }
}

/// Collects layer draw callbacks before the grid is constructed.
///
/// Registration order is z-order: layer 0 draws below layer 1.
pub struct LayerBuilder<S> {
    layers: Vec<LayerState<S>>,
}

impl<S> LayerBuilder<S> {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Register a layer whose callback is invoked once per dirty cell.
    pub fn add_layer_drawn_per_cell<F>(mut self, draw_fn: F) -> Self
    where
        F: FnMut(&mut S, &GridCell, &DrawContext<'_>) + 'static,
    {
        self.layers
            .push(LayerState::new(LayerDrawFn::PerCell(Box::new(draw_fn))));
        self
    }

    /// Register a layer whose callback repaints the whole surface at once.
    pub fn add_layer_drawn_as_whole<F>(mut self, draw_fn: F) -> Self
    where
        F: FnMut(&mut S, &DrawContext<'_>) + 'static,
    {
        self.layers
            .push(LayerState::new(LayerDrawFn::WholeCanvas(Box::new(draw_fn))));
        self
    }

    pub fn build(self) -> LayerRegistry<S> {
        LayerRegistry {
            layers: self.layers,
        }
    }
}

impl<S> Default for LayerBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// The fixed set of layers with their dirty state.
///
/// All index-addressed operations return [`CanvasGridError::LayerOutOfBounds`]
/// for an unknown layer rather than ignoring the call.
pub struct LayerRegistry<S> {
    layers: Vec<LayerState<S>>,
}

impl<S> LayerRegistry<S> {
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    fn layer_mut(&mut self, index: usize) -> Result<&mut LayerState<S>> {
        let count = self.layers.len();
        self.layers
            .get_mut(index)
            .ok_or(CanvasGridError::LayerOutOfBounds { index, count })
    }

    /// Request a one-shot repaint of the whole layer on the next working
    /// frame. Does not touch the per-frame flag.
    pub fn schedule_full_redraw(&mut self, layer: usize) -> Result<()> {
        self.layer_mut(layer)?.redraw_all = true;
        Ok(())
    }

    /// Enable or disable unconditional repainting on every working frame.
    ///
    /// A no-op for per-cell layers, which keep dirty-set granularity.
    pub fn set_per_frame_redraw(&mut self, layer: usize, enabled: bool) -> Result<()> {
        let state = self.layer_mut(layer)?;
        if !state.is_per_cell() {
            state.redraw_per_frame = enabled;
        }
        Ok(())
    }

    /// Mark one cell dirty for exactly the next working frame.
    ///
    /// A no-op for whole-canvas layers, which have no per-cell granularity.
    pub fn mark_single_frame_dirty(&mut self, cell: impl Into<CellRef>, layer: usize) -> Result<()> {
        let state = self.layer_mut(layer)?;
        if !state.is_per_cell() {
            return Ok(());
        }
        match cell.into() {
            CellRef::Index(index) => {
                state.single_frame.insert(index);
            }
            CellRef::Pos(pos) => state.pending_single.push(pos),
        }
        Ok(())
    }

    /// Mark one cell dirty on every working frame until unmarked.
    pub fn mark_multi_frame_dirty(&mut self, cell: impl Into<CellRef>, layer: usize) -> Result<()> {
        let state = self.layer_mut(layer)?;
        if !state.is_per_cell() {
            return Ok(());
        }
        match cell.into() {
            CellRef::Index(index) => {
                state.multi_frame.insert(index);
            }
            CellRef::Pos(pos) => state.pending_multi.push(pos),
        }
        Ok(())
    }

    /// Remove a persistent dirty mark.
    pub fn unmark_multi_frame_dirty(
        &mut self,
        cell: impl Into<CellRef>,
        layer: usize,
    ) -> Result<()> {
        let state = self.layer_mut(layer)?;
        match cell.into() {
            CellRef::Index(index) => {
                state.multi_frame.remove(&index);
            }
            // Position removals must observe the same deferred resolution
            // as position adds, or an add-then-remove in one frame would
            // remove nothing.
            CellRef::Pos(pos) => state.pending_multi_removals.push(pos),
        }
        Ok(())
    }

    /// Drop every persistent dirty mark on a layer, queued ones included.
    pub fn clear_all_multi_frame_dirty(&mut self, layer: usize) -> Result<()> {
        let state = self.layer_mut(layer)?;
        state.multi_frame.clear();
        state.pending_multi.clear();
        state.pending_multi_removals.clear();
        Ok(())
    }

    /// Schedule a full redraw on every layer. Used after reconfiguration.
    pub(crate) fn mark_all_for_full_redraw(&mut self) {
        for layer in &mut self.layers {
            layer.redraw_all = true;
        }
    }

    pub(crate) fn states_mut(&mut self) -> &mut [LayerState<S>] {
        &mut self.layers
    }
}
