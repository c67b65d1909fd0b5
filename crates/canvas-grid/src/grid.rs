//! The grid facade: configuration, input routing, frame driving.
//!
//! [`CanvasGrid`] owns the derived geometry, the layer registry, one
//! surface per layer, the render scheduler, and the interaction
//! dispatcher, and wires them together. Embedders either call
//! [`CanvasGrid::render_frame`] and [`CanvasGrid::handle_input`] from
//! their own loop, or hand control to [`CanvasGrid::run`] and receive
//! events through a callback.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

use crate::clock::FrameClock;
use crate::dispatch::InteractionDispatcher;
use crate::error::{CanvasGridError, Result};
use crate::events::{GridEvent, RawInput};
use crate::geometry::{GapSpec, GridConfig, GridElement, GridGeometry, PixelPos};
use crate::hit_test;
use crate::layer::LayerRegistry;
use crate::render::RenderScheduler;
use crate::surface::DrawSurface;

/// Target tick spacing for the driven loop, about 60 frames per second.
/// The fps throttle trims below this; the interval never renders above it.
const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

#[derive(Default)]
struct StopSignal {
    stopped: AtomicBool,
    notify: Notify,
}

/// Cloneable handle that shuts down a running [`CanvasGrid::run`] loop.
///
/// Stopping is one-way and idempotent; a handle stopped before the loop
/// starts makes the loop exit on entry.
#[derive(Clone)]
pub struct StopHandle {
    signal: Arc<StopSignal>,
}

impl StopHandle {
    pub fn stop(&self) {
        if !self.signal.stopped.swap(true, Ordering::SeqCst) {
            self.signal.notify.notify_one();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.signal.stopped.load(Ordering::SeqCst)
    }
}

/// A layered 2-D grid rendered onto caller-supplied surfaces.
pub struct CanvasGrid<S: DrawSurface> {
    config: GridConfig,
    geometry: GridGeometry,
    layers: LayerRegistry<S>,
    surfaces: Vec<S>,
    scheduler: RenderScheduler,
    dispatcher: InteractionDispatcher,
    events: VecDeque<GridEvent>,
    stop: Arc<StopSignal>,
}

impl<S: DrawSurface> CanvasGrid<S> {
    /// Build a grid from a configuration, a layer registry, and one surface
    /// per layer (in layer order).
    ///
    /// Surfaces are resized to the derived canvas extent, every layer is
    /// scheduled for a full first paint, and a
    /// [`GridEvent::CanvasSizeChanged`] carrying the initial extent is
    /// queued so embedders can size their window before the first frame.
    pub fn new(config: GridConfig, layers: LayerRegistry<S>, mut surfaces: Vec<S>) -> Result<Self> {
        if surfaces.len() != layers.len() {
            return Err(CanvasGridError::SurfaceCountMismatch {
                layers: layers.len(),
                surfaces: surfaces.len(),
            });
        }

        let geometry = GridGeometry::compute(&config);
        for surface in &mut surfaces {
            surface.resize(geometry.extent());
        }

        let mut layers = layers;
        layers.mark_all_for_full_redraw();

        let mut events = VecDeque::new();
        events.push_back(GridEvent::CanvasSizeChanged {
            extent: geometry.extent(),
        });

        let scheduler = RenderScheduler::new(config.fps_throttle);
        Ok(Self {
            config,
            geometry,
            layers,
            surfaces,
            scheduler,
            dispatcher: InteractionDispatcher::new(),
            events,
            stop: Arc::new(StopSignal::default()),
        })
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn clock(&self) -> &FrameClock {
        self.scheduler.clock()
    }

    /// The layer registry, for dirty marking and redraw scheduling.
    pub fn layers_mut(&mut self) -> &mut LayerRegistry<S> {
        &mut self.layers
    }

    /// The layer surfaces, in layer order.
    pub fn surfaces(&self) -> &[S] {
        &self.surfaces
    }

    pub fn set_rows(&mut self, rows: u32) {
        self.config.rows = rows;
        self.reconfigure();
    }

    pub fn set_cols(&mut self, cols: u32) {
        self.config.cols = cols;
        self.reconfigure();
    }

    /// Fractional widths are floored; the minimum cell width is one pixel.
    pub fn set_cell_width(&mut self, width: f64) {
        self.config.cell_width = (width.floor() as u32).max(1);
        self.reconfigure();
    }

    /// Fractional heights are floored; the minimum cell height is one pixel.
    pub fn set_cell_height(&mut self, height: f64) {
        self.config.cell_height = (height.floor() as u32).max(1);
        self.reconfigure();
    }

    pub fn set_gap(&mut self, gap: GapSpec) {
        self.config.gap = gap;
        self.reconfigure();
    }

    /// Replace the frame rate cap at runtime. Never triggers a repaint.
    pub fn set_fps_throttle(&mut self, fps_throttle: Option<f64>) {
        self.config.fps_throttle = fps_throttle;
        self.scheduler.set_fps_throttle(fps_throttle);
    }

    fn reconfigure(&mut self) {
        let geometry = GridGeometry::compute(&self.config);
        if geometry.extent() != self.geometry.extent() {
            for surface in &mut self.surfaces {
                surface.resize(geometry.extent());
            }
            self.events.push_back(GridEvent::CanvasSizeChanged {
                extent: geometry.extent(),
            });
        }
        self.geometry = geometry;
        // Any dimension change can move every cell rectangle.
        self.layers.mark_all_for_full_redraw();
        log::debug!(
            "grid reconfigured to {}x{} cells, extent {:?}",
            self.geometry.rows(),
            self.geometry.cols(),
            self.geometry.extent()
        );
    }

    fn resolve(&self, pos: PixelPos) -> (GridElement, PixelPos) {
        let clamped = hit_test::clamp_to_canvas(&self.geometry, pos);
        (hit_test::resolve_element(&self.geometry, clamped), clamped)
    }

    /// Feed one raw input event through hit testing and the interaction
    /// dispatcher. Produced grid events queue up for [`Self::poll_event`].
    pub fn handle_input(&mut self, input: RawInput) {
        let produced = match input {
            RawInput::PointerDown {
                pointer,
                button,
                pos,
            } => {
                let (element, pos) = self.resolve(pos);
                self.dispatcher.pointer_down(pointer, button, element, pos)
            }
            RawInput::PointerMove { pointer, pos } => {
                let (element, pos) = self.resolve(pos);
                self.dispatcher.pointer_move(pointer, element, pos)
            }
            RawInput::PointerUp { pointer, pos } => {
                let (element, pos) = self.resolve(pos);
                self.dispatcher.pointer_up(pointer, element, pos)
            }
            RawInput::PointerLeave { pointer, pos } => {
                let (element, pos) = self.resolve(pos);
                self.dispatcher.pointer_leave(pointer, element, pos)
            }
            RawInput::DoubleClick { pos } => {
                let (element, pos) = self.resolve(pos);
                self.dispatcher.double_click(element, pos)
            }
            RawInput::ContextMenu { pos } => {
                let (element, pos) = self.resolve(pos);
                self.dispatcher.context_menu(element, pos)
            }
            RawInput::KeyDown { key } => self.dispatcher.key_down(key),
        };
        self.events.extend(produced);
    }

    /// Run one frame at `timestamp_ms`. Returns whether any layer painted.
    pub fn render_frame(&mut self, timestamp_ms: f64) -> bool {
        self.scheduler.frame(
            timestamp_ms,
            &mut self.layers,
            &self.geometry,
            &mut self.surfaces,
        )
    }

    /// Pop the next queued grid event, if any.
    pub fn poll_event(&mut self) -> Option<GridEvent> {
        self.events.pop_front()
    }

    /// A handle that stops [`Self::run`] from another task.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            signal: Arc::clone(&self.stop),
        }
    }

    /// Drive the grid until stopped: ticks frames at roughly 60 per second,
    /// consumes raw input from `inputs`, and delivers every grid event to
    /// `on_event` with mutable access to the grid.
    ///
    /// The loop exits when a [`StopHandle`] fires or the input channel
    /// closes. A handle stopped beforehand exits before the first frame.
    pub async fn run<F>(&mut self, mut inputs: mpsc::UnboundedReceiver<RawInput>, mut on_event: F)
    where
        F: FnMut(&mut Self, GridEvent),
    {
        let stop = Arc::clone(&self.stop);
        let started = time::Instant::now();
        let mut ticker = time::interval(FRAME_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        log::debug!("render loop started with {} layers", self.layers.len());

        loop {
            if stop.stopped.load(Ordering::SeqCst) {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => {
                    let timestamp_ms = started.elapsed().as_secs_f64() * 1000.0;
                    self.render_frame(timestamp_ms);
                }
                input = inputs.recv() => {
                    match input {
                        Some(input) => self.handle_input(input),
                        None => break,
                    }
                }
                _ = stop.notify.notified() => break,
            }
            loop {
                let Some(event) = self.events.pop_front() else {
                    break;
                };
                on_event(self, event);
            }
        }
        log::debug!("render loop stopped");
    }
}
