//! Per-frame render scheduling.
//!
//! [`RenderScheduler::frame`] is the single entry point: given a timestamp
//! and the layer registry, it decides whether the frame does any work at
//! all (fps throttle, dirty state), then walks the layers in z-order and
//! repaints exactly what each layer's flags call for. The frame clock only
//! advances on frames that do work, so animation deltas measure working
//! frames rather than wall-clock ticks.

use crate::clock::FrameClock;
use crate::geometry::GridGeometry;
use crate::layer::{DrawContext, LayerDrawFn, LayerRegistry};
use crate::surface::DrawSurface;

/// Decides per frame which layers repaint, and how much of each.
pub struct RenderScheduler {
    clock: FrameClock,
    fps_throttle: Option<f64>,
    // Reused between frames to sort and dedup dirty indices.
    scratch: Vec<usize>,
}

impl RenderScheduler {
    pub fn new(fps_throttle: Option<f64>) -> Self {
        Self {
            clock: FrameClock::new(),
            fps_throttle,
            scratch: Vec::new(),
        }
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Replace the frame rate cap. `None` removes it.
    pub fn set_fps_throttle(&mut self, fps_throttle: Option<f64>) {
        self.fps_throttle = fps_throttle;
    }

    /// Run one frame at `timestamp_ms`. Returns whether any layer painted.
    ///
    /// `surfaces` must hold one surface per registered layer, in layer
    /// order; the facade enforces that at construction.
    pub fn frame<S: DrawSurface>(
        &mut self,
        timestamp_ms: f64,
        layers: &mut LayerRegistry<S>,
        geometry: &GridGeometry,
        surfaces: &mut [S],
    ) -> bool {
        if let Some(throttle) = self.fps_throttle {
            if self.clock.fps_at(timestamp_ms) >= throttle {
                log::trace!("frame at {timestamp_ms}ms skipped by fps throttle");
                return false;
            }
        }

        let states = layers.states_mut();
        // Position marks resolve against this frame's column count, before
        // the work decision: a queue that nets out to nothing must leave the
        // frame idle and the clock untouched.
        for layer in states.iter_mut() {
            layer.resolve_pending(geometry.cols());
        }
        let any_work = states.iter().any(|layer| {
            layer.redraw_all
                || layer.redraw_per_frame
                || (layer.is_per_cell() && layer.has_dirty_cells())
        });
        if !any_work {
            return false;
        }

        self.clock.advance(timestamp_ms);
        let clock = &self.clock;
        let scratch = &mut self.scratch;
        let layer_count = states.len();

        for (layer_index, (layer, surface)) in
            states.iter_mut().zip(surfaces.iter_mut()).enumerate()
        {
            let ctx = DrawContext {
                geometry,
                clock,
                layer_index,
                layer_count,
            };

            if layer.redraw_all || layer.redraw_per_frame {
                surface.clear();
                match &mut layer.draw_fn {
                    LayerDrawFn::PerCell(draw) => {
                        for cell in geometry.cells() {
                            draw(surface, cell, &ctx);
                        }
                    }
                    LayerDrawFn::WholeCanvas(draw) => draw(surface, &ctx),
                }
                layer.single_frame.clear();
                layer.redraw_all = false;
            } else if layer.is_per_cell() && layer.has_dirty_cells() {
                scratch.clear();
                scratch.extend(layer.single_frame.iter().copied());
                scratch.extend(layer.multi_frame.iter().copied());
                scratch.sort_unstable();
                scratch.dedup();
                if let LayerDrawFn::PerCell(draw) = &mut layer.draw_fn {
                    for &index in scratch.iter() {
                        // Marks can outlive a shrink of the grid.
                        let Some(cell) = geometry.cell(index) else {
                            continue;
                        };
                        surface.clear_rect(cell.rect());
                        draw(surface, cell, &ctx);
                    }
                }
                layer.single_frame.clear();
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{GapSpec, GridConfig, GridPos};
    use crate::layer::LayerBuilder;
    use crate::testing::{counting_whole_fn, draw_log, logging_cell_fn, RecordingSurface};

    fn geometry(rows: u32, cols: u32) -> GridGeometry {
        GridGeometry::compute(&GridConfig {
            cell_width: 10,
            cell_height: 10,
            rows,
            cols,
            gap: GapSpec::Uniform(1),
            fps_throttle: None,
        })
    }

    #[test]
    fn full_redraw_paints_every_cell_once_then_goes_idle() {
        let log = draw_log();
        let mut layers = LayerBuilder::new()
            .add_layer_drawn_per_cell(logging_cell_fn(&log))
            .build();
        let geometry = geometry(2, 3);
        let mut surfaces = vec![RecordingSurface::new()];
        let mut scheduler = RenderScheduler::new(None);

        layers.schedule_full_redraw(0).unwrap();
        assert!(scheduler.frame(16.0, &mut layers, &geometry, &mut surfaces));
        assert_eq!(*log.borrow(), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(surfaces[0].cleared_count(), 1);

        // The flag is one-shot.
        assert!(!scheduler.frame(32.0, &mut layers, &geometry, &mut surfaces));
        assert_eq!(log.borrow().len(), 6);
    }

    #[test]
    fn single_frame_marks_drain_and_multi_frame_marks_persist() {
        let log = draw_log();
        let mut layers = LayerBuilder::new()
            .add_layer_drawn_per_cell(logging_cell_fn(&log))
            .build();
        let geometry = geometry(3, 3);
        let mut surfaces = vec![RecordingSurface::new()];
        let mut scheduler = RenderScheduler::new(None);

        layers.mark_single_frame_dirty(1usize, 0).unwrap();
        layers.mark_multi_frame_dirty(4usize, 0).unwrap();
        assert!(scheduler.frame(16.0, &mut layers, &geometry, &mut surfaces));
        assert_eq!(*log.borrow(), vec![1, 4]);

        // Only the persistent mark survives into the next frame.
        assert!(scheduler.frame(32.0, &mut layers, &geometry, &mut surfaces));
        assert_eq!(*log.borrow(), vec![1, 4, 4]);

        layers.unmark_multi_frame_dirty(4usize, 0).unwrap();
        assert!(!scheduler.frame(48.0, &mut layers, &geometry, &mut surfaces));
    }

    #[test]
    fn overlapping_single_and_multi_marks_draw_once() {
        let log = draw_log();
        let mut layers = LayerBuilder::new()
            .add_layer_drawn_per_cell(logging_cell_fn(&log))
            .build();
        let geometry = geometry(2, 2);
        let mut surfaces = vec![RecordingSurface::new()];
        let mut scheduler = RenderScheduler::new(None);

        layers.mark_single_frame_dirty(2usize, 0).unwrap();
        layers.mark_multi_frame_dirty(2usize, 0).unwrap();
        scheduler.frame(16.0, &mut layers, &geometry, &mut surfaces);
        assert_eq!(*log.borrow(), vec![2]);
        assert_eq!(surfaces[0].cleared_rects().len(), 1);
    }

    #[test]
    fn throttle_skips_frames_that_would_exceed_the_cap() {
        let log = draw_log();
        let mut layers = LayerBuilder::new()
            .add_layer_drawn_per_cell(logging_cell_fn(&log))
            .build();
        let geometry = geometry(2, 2);
        let mut surfaces = vec![RecordingSurface::new()];
        // 30 fps cap: frames closer than ~33.3ms apart are skipped.
        let mut scheduler = RenderScheduler::new(Some(30.0));

        layers.mark_multi_frame_dirty(0usize, 0).unwrap();
        assert!(scheduler.frame(40.0, &mut layers, &geometry, &mut surfaces));
        assert_eq!(scheduler.clock().last_render_ms(), 40.0);

        // 16ms later is 62.5 fps; skipped, clock untouched.
        assert!(!scheduler.frame(56.0, &mut layers, &geometry, &mut surfaces));
        assert_eq!(scheduler.clock().last_render_ms(), 40.0);

        // 40ms after the last working frame is 25 fps; renders, and the
        // delta spans the skipped frame too.
        assert!(scheduler.frame(80.0, &mut layers, &geometry, &mut surfaces));
        assert_eq!(scheduler.clock().delta_seconds(), 0.04);
    }

    #[test]
    fn per_frame_whole_canvas_layer_repaints_every_frame() {
        let log = draw_log();
        let mut layers = LayerBuilder::new()
            .add_layer_drawn_as_whole(counting_whole_fn(&log))
            .build();
        let geometry = geometry(2, 2);
        let mut surfaces = vec![RecordingSurface::new()];
        let mut scheduler = RenderScheduler::new(None);

        layers.set_per_frame_redraw(0, true).unwrap();
        scheduler.frame(16.0, &mut layers, &geometry, &mut surfaces);
        scheduler.frame(32.0, &mut layers, &geometry, &mut surfaces);
        assert_eq!(log.borrow().len(), 2);
        assert_eq!(surfaces[0].cleared_count(), 2);

        layers.set_per_frame_redraw(0, false).unwrap();
        assert!(!scheduler.frame(48.0, &mut layers, &geometry, &mut surfaces));
    }

    #[test]
    fn per_cell_layers_never_enter_per_frame_mode() {
        let log = draw_log();
        let mut layers = LayerBuilder::new()
            .add_layer_drawn_per_cell(logging_cell_fn(&log))
            .build();
        let geometry = geometry(2, 2);
        let mut surfaces = vec![RecordingSurface::new()];
        let mut scheduler = RenderScheduler::new(None);

        layers.set_per_frame_redraw(0, true).unwrap();
        layers.schedule_full_redraw(0).unwrap();
        assert!(scheduler.frame(16.0, &mut layers, &geometry, &mut surfaces));
        assert_eq!(*log.borrow(), vec![0, 1, 2, 3]);

        // No marks, no work: the per-frame request must not repaint.
        assert!(!scheduler.frame(32.0, &mut layers, &geometry, &mut surfaces));
        assert_eq!(*log.borrow(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn stale_indices_past_the_cell_count_are_skipped() {
        let log = draw_log();
        let mut layers = LayerBuilder::new()
            .add_layer_drawn_per_cell(logging_cell_fn(&log))
            .build();
        let geometry = geometry(2, 2);
        let mut surfaces = vec![RecordingSurface::new()];
        let mut scheduler = RenderScheduler::new(None);

        layers.mark_multi_frame_dirty(99usize, 0).unwrap();
        layers.mark_single_frame_dirty(1usize, 0).unwrap();
        assert!(scheduler.frame(16.0, &mut layers, &geometry, &mut surfaces));
        assert_eq!(*log.borrow(), vec![1]);
    }

    #[test]
    fn cleared_rects_match_the_dirty_cells() {
        let log = draw_log();
        let mut layers = LayerBuilder::new()
            .add_layer_drawn_per_cell(logging_cell_fn(&log))
            .build();
        let geometry = geometry(2, 2);
        let mut surfaces = vec![RecordingSurface::new()];
        let mut scheduler = RenderScheduler::new(None);

        layers.mark_single_frame_dirty(3usize, 0).unwrap();
        scheduler.frame(16.0, &mut layers, &geometry, &mut surfaces);
        assert_eq!(
            surfaces[0].cleared_rects(),
            vec![geometry.cell(3).unwrap().rect()]
        );
    }

    #[test]
    fn mark_then_unmark_by_position_in_one_frame_paints_nothing() {
        let log = draw_log();
        let mut layers = LayerBuilder::new()
            .add_layer_drawn_per_cell(logging_cell_fn(&log))
            .build();
        let geometry = geometry(3, 3);
        let mut surfaces = vec![RecordingSurface::new()];
        let mut scheduler = RenderScheduler::new(None);

        let pos = GridPos::new(1, 1);
        layers.mark_multi_frame_dirty(pos, 0).unwrap();
        layers.unmark_multi_frame_dirty(pos, 0).unwrap();
        assert!(!scheduler.frame(16.0, &mut layers, &geometry, &mut surfaces));
        assert!(log.borrow().is_empty());
        assert!(surfaces[0].cleared_rects().is_empty());
        assert_eq!(scheduler.clock().last_render_ms(), 0.0);
    }

    #[test]
    fn queued_position_removal_alone_leaves_the_frame_idle() {
        let log = draw_log();
        let mut layers = LayerBuilder::new()
            .add_layer_drawn_per_cell(logging_cell_fn(&log))
            .build();
        let geometry = geometry(3, 3);
        let mut surfaces = vec![RecordingSurface::new()];
        let mut scheduler = RenderScheduler::new(None);

        let pos = GridPos::new(2, 0);
        layers.mark_multi_frame_dirty(pos, 0).unwrap();
        assert!(scheduler.frame(16.0, &mut layers, &geometry, &mut surfaces));

        // The queued removal is the only new state; resolving it empties the
        // persistent set, so the frame is idle and the clock stays put.
        layers.unmark_multi_frame_dirty(pos, 0).unwrap();
        assert!(!scheduler.frame(32.0, &mut layers, &geometry, &mut surfaces));
        assert_eq!(*log.borrow(), vec![6]);
        assert_eq!(scheduler.clock().last_render_ms(), 16.0);
    }

    #[test]
    fn draw_context_exposes_layer_indices_and_clock() {
        let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = std::rc::Rc::clone(&seen);
        let mut layers = LayerBuilder::<RecordingSurface>::new()
            .add_layer_drawn_as_whole(move |_, ctx| {
                sink.borrow_mut()
                    .push((ctx.layer_index, ctx.layer_count, ctx.clock.delta_seconds()));
            })
            .add_layer_drawn_per_cell(|_, _, _| {})
            .build();
        let geometry = geometry(1, 1);
        let mut surfaces = vec![RecordingSurface::new(), RecordingSurface::new()];
        let mut scheduler = RenderScheduler::new(None);

        layers.schedule_full_redraw(0).unwrap();
        scheduler.frame(20.0, &mut layers, &geometry, &mut surfaces);
        assert_eq!(*seen.borrow(), vec![(0, 2, 0.02)]);
    }
}
