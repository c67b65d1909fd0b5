//! Grid geometry: cells, gaps, and prefix-summed pixel offsets.
//!
//! Everything in this module is derived state. A [`GridGeometry`] is computed
//! from a [`GridConfig`] as a whole and never mutated in place; when the
//! configuration changes the owner recomputes from scratch. Correctness over
//! incremental-update cleverness.

use std::fmt;
use std::sync::Arc;

/// Sizing function for one axis: maps a gap index (`0..=rows` or `0..=cols`,
/// boundary gaps included) to that gap's pixel thickness.
pub type GapSizeFn = Arc<dyn Fn(u32) -> u32 + Send + Sync>;

/// Gap sizing: one uniform thickness, or independent per-index functions
/// for row gaps and column gaps.
#[derive(Clone)]
pub enum GapSpec {
    Uniform(u32),
    PerIndex { row_fn: GapSizeFn, col_fn: GapSizeFn },
}

impl GapSpec {
    /// Build a per-index spec from two sizing closures.
    pub fn per_index<R, C>(row_fn: R, col_fn: C) -> Self
    where
        R: Fn(u32) -> u32 + Send + Sync + 'static,
        C: Fn(u32) -> u32 + Send + Sync + 'static,
    {
        Self::PerIndex {
            row_fn: Arc::new(row_fn),
            col_fn: Arc::new(col_fn),
        }
    }

    fn row_size(&self, index: u32) -> u32 {
        match self {
            Self::Uniform(value) => *value,
            Self::PerIndex { row_fn, .. } => row_fn(index),
        }
    }

    fn col_size(&self, index: u32) -> u32 {
        match self {
            Self::Uniform(value) => *value,
            Self::PerIndex { col_fn, .. } => col_fn(index),
        }
    }
}

impl fmt::Debug for GapSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform(value) => f.debug_tuple("Uniform").field(value).finish(),
            Self::PerIndex { .. } => f.write_str("PerIndex"),
        }
    }
}

/// Grid configuration, immutable for the duration of a frame.
#[derive(Clone, Debug)]
pub struct GridConfig {
    /// Cell width in pixels (positive; callers floor fractional input).
    pub cell_width: u32,
    /// Cell height in pixels (positive; callers floor fractional input).
    pub cell_height: u32,
    pub rows: u32,
    pub cols: u32,
    pub gap: GapSpec,
    /// Target frame rate cap. `None` renders on every tick.
    pub fps_throttle: Option<f64>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_width: 20,
            cell_height: 20,
            rows: 9,
            cols: 9,
            gap: GapSpec::Uniform(1),
            fps_throttle: None,
        }
    }
}

/// A pixel position. Pointer coordinates are fractional.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PixelPos {
    pub x: f64,
    pub y: f64,
}

impl PixelPos {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The pixel dimensions of the drawing surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PixelExtent {
    pub w: u32,
    pub h: u32,
}

impl PixelExtent {
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }
}

/// An axis-aligned pixel rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// A row/column address within the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GridPos {
    pub row: u32,
    pub col: u32,
}

impl GridPos {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// One addressable grid unit with its resolved pixel rectangle.
///
/// `index == row * cols + col`; cells are ordered left-to-right,
/// top-to-bottom.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridCell {
    pub index: usize,
    pub row: u32,
    pub col: u32,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl GridCell {
    pub fn rect(&self) -> PixelRect {
        PixelRect {
            x: self.x,
            y: self.y,
            w: self.w,
            h: self.h,
        }
    }

    /// Center of the cell in pixel coordinates.
    pub fn center(&self) -> PixelPos {
        PixelPos {
            x: self.x as f64 + self.w as f64 / 2.0,
            y: self.y as f64 + self.h as f64 / 2.0,
        }
    }
}

/// One inter-cell spacing band along a single axis.
///
/// Row gaps carry their index in `row` (with `col == 0`); column gaps carry
/// it in `col` (with `row == 0`). `prefix_sum` is the running total of gap
/// thicknesses up to and including this gap; `x`/`y` is the gap's leading
/// pixel coordinate along its axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridGap {
    pub row: u32,
    pub col: u32,
    pub value: u32,
    pub prefix_sum: u32,
    pub x: u32,
    pub y: u32,
}

/// The intersection of a row gap band and a column gap band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridGapPair {
    pub row_gap: GridGap,
    pub col_gap: GridGap,
}

/// Anything a pointer coordinate can resolve to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridElement {
    Cell(GridCell),
    Gap(GridGap),
    GapPair(GridGapPair),
}

impl GridElement {
    /// Positional equality: cells and gaps compare by `(row, col)`, gap
    /// pairs by both gaps' `(row, col)`. Resolved elements are freshly
    /// constructed per event, so identity comparison is never meaningful.
    pub fn same_target(&self, other: &GridElement) -> bool {
        match (self, other) {
            (Self::Cell(a), Self::Cell(b)) => a.row == b.row && a.col == b.col,
            (Self::Gap(a), Self::Gap(b)) => a.row == b.row && a.col == b.col,
            (Self::GapPair(a), Self::GapPair(b)) => {
                a.row_gap.row == b.row_gap.row
                    && a.row_gap.col == b.row_gap.col
                    && a.col_gap.row == b.col_gap.row
                    && a.col_gap.col == b.col_gap.col
            }
            _ => false,
        }
    }
}

enum Axis {
    Row,
    Col,
}

/// Fully derived grid geometry: gap tables, cell rectangles, canvas extent.
#[derive(Clone, Debug)]
pub struct GridGeometry {
    rows: u32,
    cols: u32,
    cell_width: u32,
    cell_height: u32,
    row_gaps: Vec<GridGap>,
    col_gaps: Vec<GridGap>,
    cells: Vec<GridCell>,
    extent: PixelExtent,
}

impl GridGeometry {
    /// Compute the full geometry for a configuration.
    ///
    /// Produces `rows + 1` row gaps and `cols + 1` col gaps (boundary gaps
    /// included), then `rows * cols` cells positioned by cumulative cell
    /// extents plus the inclusive gap prefix sums.
    pub fn compute(config: &GridConfig) -> Self {
        let row_gaps = axis_gaps(config.rows, config.cell_height, Axis::Row, |i| {
            config.gap.row_size(i)
        });
        let col_gaps = axis_gaps(config.cols, config.cell_width, Axis::Col, |i| {
            config.gap.col_size(i)
        });

        let count = (config.rows as usize) * (config.cols as usize);
        let mut cells = Vec::with_capacity(count);
        for index in 0..count {
            let row = (index / config.cols as usize) as u32;
            let col = (index % config.cols as usize) as u32;
            cells.push(GridCell {
                index,
                row,
                col,
                x: col * config.cell_width + col_gaps[col as usize].prefix_sum,
                y: row * config.cell_height + row_gaps[row as usize].prefix_sum,
                w: config.cell_width,
                h: config.cell_height,
            });
        }

        let extent = PixelExtent {
            w: config.cols * config.cell_width
                + col_gaps.last().map(|g| g.prefix_sum).unwrap_or(0),
            h: config.rows * config.cell_height
                + row_gaps.last().map(|g| g.prefix_sum).unwrap_or(0),
        };

        Self {
            rows: config.rows,
            cols: config.cols,
            cell_width: config.cell_width,
            cell_height: config.cell_height,
            row_gaps,
            col_gaps,
            cells,
            extent,
        }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn cell_width(&self) -> u32 {
        self.cell_width
    }

    pub fn cell_height(&self) -> u32 {
        self.cell_height
    }

    /// All cells in index order (`0..rows*cols`).
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&GridCell> {
        self.cells.get(index)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn row_gaps(&self) -> &[GridGap] {
        &self.row_gaps
    }

    pub fn col_gaps(&self) -> &[GridGap] {
        &self.col_gaps
    }

    /// Derived canvas size: cell extents plus all gap thicknesses per axis.
    pub fn extent(&self) -> PixelExtent {
        self.extent
    }

    /// Flat index for a grid position under the current column count.
    pub fn cell_index(&self, pos: GridPos) -> usize {
        (pos.row * self.cols + pos.col) as usize
    }
}

fn axis_gaps<F>(cell_count: u32, cell_extent: u32, axis: Axis, size_of: F) -> Vec<GridGap>
where
    F: Fn(u32) -> u32,
{
    let mut gaps = Vec::with_capacity(cell_count as usize + 1);
    let mut sum = 0;
    for i in 0..=cell_count {
        let value = size_of(i);
        // Leading coordinate: the preceding cells plus the gaps before this one.
        let leading = i * cell_extent + sum;
        sum += value;
        gaps.push(match axis {
            Axis::Row => GridGap {
                row: i,
                col: 0,
                value,
                prefix_sum: sum,
                x: 0,
                y: leading,
            },
            Axis::Col => GridGap {
                row: 0,
                col: i,
                value,
                prefix_sum: sum,
                x: leading,
                y: 0,
            },
        });
    }
    gaps
}
