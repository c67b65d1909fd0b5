//! Drawing-surface abstraction and a pixel-buffer implementation.
//!
//! The render scheduler only ever needs to wipe a whole layer surface or
//! the bounding rectangle of a single cell; everything else is done by the
//! embedding application's draw callbacks. [`PixelSurface`] is the concrete
//! backend shipped with the crate: a plain RGBA buffer with bounds-checked
//! writes and snapshot helpers for tests.

use crate::geometry::{PixelExtent, PixelRect};

/// The per-layer drawing target contract consumed by the render scheduler.
pub trait DrawSurface {
    /// Resize the surface to the given pixel extent, discarding contents.
    fn resize(&mut self, extent: PixelExtent);

    /// Wipe the entire surface.
    fn clear(&mut self);

    /// Wipe one rectangle, leaving the rest of the surface intact.
    fn clear_rect(&mut self, rect: PixelRect);
}

/// An RGBA color. Fully transparent pixels count as blank.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// An opaque color.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// An in-memory RGBA pixel buffer implementing [`DrawSurface`].
#[derive(Clone, Debug, Default)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl PixelSurface {
    pub fn new(extent: PixelExtent) -> Self {
        Self {
            width: extent.w,
            height: extent.h,
            pixels: vec![Rgba::TRANSPARENT; (extent.w as usize) * (extent.h as usize)],
        }
    }

    pub fn extent(&self) -> PixelExtent {
        PixelExtent {
            w: self.width,
            h: self.height,
        }
    }

    /// Writes a pixel. Out-of-bounds coordinates are a no-op.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = (y as usize) * (self.width as usize) + (x as usize);
        self.pixels[index] = color;
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = (y as usize) * (self.width as usize) + (x as usize);
        self.pixels.get(index).copied()
    }

    /// Fills a rectangle, clipped to the surface bounds.
    pub fn fill_rect(&mut self, rect: PixelRect, color: Rgba) {
        let x_end = rect.x.saturating_add(rect.w).min(self.width);
        let y_end = rect.y.saturating_add(rect.h).min(self.height);
        for y in rect.y.min(self.height)..y_end {
            let row = (y as usize) * (self.width as usize);
            for x in rect.x..x_end {
                self.pixels[row + x as usize] = color;
            }
        }
    }

    // === Test helpers ===

    /// Number of non-transparent pixels.
    pub fn filled_count(&self) -> usize {
        self.pixels.iter().filter(|p| p.a != 0).count()
    }

    /// True if every pixel inside `rect` is transparent.
    pub fn is_blank_rect(&self, rect: PixelRect) -> bool {
        let x_end = rect.x.saturating_add(rect.w).min(self.width);
        let y_end = rect.y.saturating_add(rect.h).min(self.height);
        for y in rect.y.min(self.height)..y_end {
            for x in rect.x..x_end {
                if let Some(p) = self.pixel(x, y) {
                    if p.a != 0 {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Serialize the surface to plain text: `.` for blank pixels, `#` for
    /// anything drawn. One line per pixel row.
    pub fn to_snapshot(&self) -> String {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| {
                        if self.pixel(x, y).map(|p| p.a != 0).unwrap_or(false) {
                            '#'
                        } else {
                            '.'
                        }
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl DrawSurface for PixelSurface {
    fn resize(&mut self, extent: PixelExtent) {
        self.width = extent.w;
        self.height = extent.h;
        self.pixels = vec![Rgba::TRANSPARENT; (extent.w as usize) * (extent.h as usize)];
    }

    fn clear(&mut self) {
        self.pixels.fill(Rgba::TRANSPARENT);
    }

    fn clear_rect(&mut self, rect: PixelRect) {
        self.fill_rect(rect, Rgba::TRANSPARENT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_pixel_within_bounds() {
        let mut surface = PixelSurface::new(PixelExtent::new(4, 4));
        surface.set_pixel(1, 2, Rgba::rgb(10, 20, 30));
        assert_eq!(surface.pixel(1, 2), Some(Rgba::rgb(10, 20, 30)));
        assert_eq!(surface.filled_count(), 1);
    }

    #[test]
    fn set_pixel_out_of_bounds_is_a_noop() {
        let mut surface = PixelSurface::new(PixelExtent::new(4, 4));
        surface.set_pixel(4, 0, Rgba::rgb(1, 1, 1));
        surface.set_pixel(0, 100, Rgba::rgb(1, 1, 1));
        assert_eq!(surface.filled_count(), 0);
    }

    #[test]
    fn fill_rect_clips_to_surface() {
        let mut surface = PixelSurface::new(PixelExtent::new(4, 4));
        surface.fill_rect(
            PixelRect {
                x: 2,
                y: 2,
                w: 10,
                h: 10,
            },
            Rgba::rgb(255, 0, 0),
        );
        assert_eq!(surface.filled_count(), 4);
    }

    #[test]
    fn clear_rect_wipes_only_the_rectangle() {
        let mut surface = PixelSurface::new(PixelExtent::new(4, 2));
        surface.fill_rect(
            PixelRect {
                x: 0,
                y: 0,
                w: 4,
                h: 2,
            },
            Rgba::rgb(9, 9, 9),
        );
        surface.clear_rect(PixelRect {
            x: 0,
            y: 0,
            w: 2,
            h: 2,
        });
        assert_eq!(surface.to_snapshot(), "..##\n..##");
    }

    #[test]
    fn resize_discards_contents() {
        let mut surface = PixelSurface::new(PixelExtent::new(2, 2));
        surface.set_pixel(0, 0, Rgba::rgb(1, 2, 3));
        surface.resize(PixelExtent::new(3, 3));
        assert_eq!(surface.extent(), PixelExtent::new(3, 3));
        assert_eq!(surface.filled_count(), 0);
    }
}
