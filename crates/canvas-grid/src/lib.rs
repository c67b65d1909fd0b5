//! A layered 2-D grid-drawing widget for pixel canvases.
//!
//! The grid derives cell and gap rectangles from a [`GridConfig`], resolves
//! pointer coordinates to grid elements with a binary search over the gap
//! prefix sums, tracks per-layer dirty state, and repaints only what
//! changed each frame. Rendering targets anything implementing
//! [`DrawSurface`]; per-layer draw callbacks do the actual painting.
//!
//! Construction follows a builder-then-facade shape:
//!
//! ```ignore
//! let layers = LayerBuilder::new()
//!     .add_layer_drawn_per_cell(|surface, cell, ctx| { /* paint one cell */ })
//!     .add_layer_drawn_as_whole(|surface, ctx| { /* paint an overlay */ })
//!     .build();
//! let mut grid = CanvasGrid::new(GridConfig::default(), layers, surfaces)?;
//! grid.run(input_rx, |grid, event| { /* react */ }).await;
//! ```

pub mod clock;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod geometry;
pub mod grid;
pub mod layer;
mod log_init;
pub mod render;
pub mod surface;
pub mod testing;

pub use clock::FrameClock;
pub use dispatch::{EventBatch, InteractionDispatcher};
pub use error::{CanvasGridError, Result};
pub use events::{GridEvent, PointerButton, PointerId, RawInput};
pub use geometry::{
    GapSizeFn, GapSpec, GridCell, GridConfig, GridElement, GridGap, GridGapPair, GridGeometry,
    GridPos, PixelExtent, PixelPos, PixelRect,
};
pub use grid::{CanvasGrid, StopHandle};
pub use hit_test::{AxisHit, clamp_to_canvas, resolve_axis, resolve_element};
pub use layer::{CellDrawFn, CellRef, DrawContext, LayerBuilder, LayerRegistry, WholeDrawFn};
pub use log_init::{init_logger, init_logger_with_level};
pub use render::RenderScheduler;
pub use surface::{DrawSurface, PixelSurface, Rgba};

// Re-export the log crate so users can use canvas_grid::log::debug!, etc.
pub use log;
