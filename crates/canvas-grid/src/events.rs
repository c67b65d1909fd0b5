//! Input and output event types.
//!
//! [`RawInput`] is what the embedding application feeds in, in whatever
//! order its windowing layer delivers pointer and key events. [`GridEvent`]
//! is what comes out: grid-aware events carrying the resolved element under
//! the pointer.

use crate::geometry::{GridElement, PixelExtent, PixelPos};

/// Opaque pointer identity, stable for the lifetime of a touch or button
/// hold. Mouse backends typically use a single constant id.
pub type PointerId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Auxiliary,
    Other(u8),
}

/// Device-level input as delivered by the embedding application.
#[derive(Clone, Debug, PartialEq)]
pub enum RawInput {
    PointerDown {
        pointer: PointerId,
        button: PointerButton,
        pos: PixelPos,
    },
    PointerMove {
        pointer: PointerId,
        pos: PixelPos,
    },
    PointerUp {
        pointer: PointerId,
        pos: PixelPos,
    },
    /// The pointer left the canvas. Treated as a release at the exit
    /// position.
    PointerLeave {
        pointer: PointerId,
        pos: PixelPos,
    },
    DoubleClick {
        pos: PixelPos,
    },
    ContextMenu {
        pos: PixelPos,
    },
    KeyDown {
        key: String,
    },
}

/// A grid-aware event produced by the interaction dispatcher or the facade.
///
/// Positional events carry the resolved target, the clamped pixel position,
/// and the originating pointer id and button; the raw input value itself is
/// not echoed back, since the embedder produced it.
#[derive(Clone, Debug)]
pub enum GridEvent {
    /// Pointer movement over an element. Emitted on every position change,
    /// during drags included.
    Move {
        target: GridElement,
        pos: PixelPos,
        pointer: PointerId,
    },
    /// Press and release on the same element with no drag in between.
    Click {
        target: GridElement,
        pos: PixelPos,
        pointer: PointerId,
        button: PointerButton,
    },
    DoubleClick {
        target: GridElement,
        pos: PixelPos,
    },
    /// The pointer moved off the pressed element while held down. Emitted
    /// on every subsequent move until release.
    Drag {
        from: GridElement,
        from_pos: PixelPos,
        to: GridElement,
        pos: PixelPos,
        pointer: PointerId,
        button: PointerButton,
    },
    /// Release after a drag.
    Drop {
        from: GridElement,
        to: GridElement,
        pos: PixelPos,
        pointer: PointerId,
        button: PointerButton,
    },
    ContextMenu {
        target: GridElement,
        pos: PixelPos,
    },
    KeyDown {
        key: String,
    },
    /// The derived canvas extent changed, at construction or after a
    /// reconfiguration.
    CanvasSizeChanged {
        extent: PixelExtent,
    },
}
