//! Pointer and keyboard interaction state machine.
//!
//! The dispatcher is pure state plus transitions: it never touches the
//! geometry itself. Callers resolve raw coordinates to a [`GridElement`]
//! first (the facade does this with the hit tester) and feed the resolved
//! element in. Each transition returns the grid events it produced, usually
//! zero or one, at most two for a move that also drags.
//!
//! Drag recognition is element-based, not distance-based: a press followed
//! by movement onto a different element (by row/column, not identity)
//! latches the pointer into dragging, and it stays latched even if it moves
//! back over the pressed element before release.

use std::collections::{HashMap, HashSet};

use smallvec::SmallVec;

use crate::events::{GridEvent, PointerButton, PointerId};
use crate::geometry::{GridElement, PixelPos};

/// Events produced by a single transition.
pub type EventBatch = SmallVec<[GridEvent; 2]>;

struct Press {
    element: GridElement,
    pos: PixelPos,
    button: PointerButton,
}

/// Turns resolved pointer transitions into clicks, drags, and drops.
#[derive(Default)]
pub struct InteractionDispatcher {
    presses: HashMap<PointerId, Press>,
    dragging: HashSet<PointerId>,
}

impl InteractionDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press. A press on an element some other pointer already
    /// holds is ignored, so two fingers cannot both claim one cell.
    pub fn pointer_down(
        &mut self,
        pointer: PointerId,
        button: PointerButton,
        element: GridElement,
        pos: PixelPos,
    ) -> EventBatch {
        let already_held = self
            .presses
            .values()
            .any(|press| press.element.same_target(&element));
        if !already_held {
            self.presses.insert(
                pointer,
                Press {
                    element,
                    pos,
                    button,
                },
            );
        }
        EventBatch::new()
    }

    /// Record movement. Emits a move event unconditionally, plus a drag
    /// event while the pointer is held and has left its press target.
    pub fn pointer_move(
        &mut self,
        pointer: PointerId,
        element: GridElement,
        pos: PixelPos,
    ) -> EventBatch {
        let mut events = EventBatch::new();
        events.push(GridEvent::Move {
            target: element,
            pos,
            pointer,
        });

        if let Some(press) = self.presses.get(&pointer) {
            if !element.same_target(&press.element) || self.dragging.contains(&pointer) {
                if self.dragging.insert(pointer) {
                    log::debug!("pointer {pointer} started dragging");
                }
                events.push(GridEvent::Drag {
                    from: press.element,
                    from_pos: press.pos,
                    to: element,
                    pos,
                    pointer,
                    button: press.button,
                });
            }
        }
        events
    }

    /// Record a release: a click if the pointer never dragged and released
    /// on its press target, a drop if it dragged.
    pub fn pointer_up(
        &mut self,
        pointer: PointerId,
        element: GridElement,
        pos: PixelPos,
    ) -> EventBatch {
        let mut events = EventBatch::new();
        if let Some(press) = self.presses.remove(&pointer) {
            if self.dragging.remove(&pointer) {
                events.push(GridEvent::Drop {
                    from: press.element,
                    to: element,
                    pos,
                    pointer,
                    button: press.button,
                });
            } else if element.same_target(&press.element) {
                events.push(GridEvent::Click {
                    target: element,
                    pos,
                    pointer,
                    button: press.button,
                });
            }
        }
        events
    }

    /// The pointer left the canvas while interacting. Same contract as a
    /// release at the exit position.
    pub fn pointer_leave(
        &mut self,
        pointer: PointerId,
        element: GridElement,
        pos: PixelPos,
    ) -> EventBatch {
        self.pointer_up(pointer, element, pos)
    }

    pub fn double_click(&mut self, element: GridElement, pos: PixelPos) -> EventBatch {
        let mut events = EventBatch::new();
        events.push(GridEvent::DoubleClick {
            target: element,
            pos,
        });
        events
    }

    pub fn context_menu(&mut self, element: GridElement, pos: PixelPos) -> EventBatch {
        let mut events = EventBatch::new();
        events.push(GridEvent::ContextMenu {
            target: element,
            pos,
        });
        events
    }

    pub fn key_down(&mut self, key: String) -> EventBatch {
        let mut events = EventBatch::new();
        events.push(GridEvent::KeyDown { key });
        events
    }
}
