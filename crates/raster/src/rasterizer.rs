//! Depth-buffered scanline fill.
//!
//! The [`Rasterizer`] owns the frame's [`ColorBuffer`] and a matching
//! [`DepthBuffer`]. Polygons arrive already projected to integer screen
//! coordinates; each one is filled with a single flat color, and depth is
//! interpolated per pixel so overlapping geometry resolves correctly.
//!
//! # Example
//!
//! ```
//! use softscene_raster::{Color, Rasterizer, ScreenVertex};
//!
//! let mut rasterizer = Rasterizer::new(64, 64);
//! rasterizer.clear();
//! rasterizer.set_color(Color::RED);
//! rasterizer.fill_convex_polygon_z_buffer(&[
//!     ScreenVertex::new(10, 10, 0),
//!     ScreenVertex::new(50, 10, 0),
//!     ScreenVertex::new(30, 50, 0),
//! ]);
//! assert_eq!(rasterizer.color_buffer().get_pixel(30, 30), Some(Color::RED));
//! ```

use tracing::debug;

use crate::clipper::MAX_POLYGON_VERTICES;
use crate::{Color, ColorBuffer, DepthBuffer};

/// A projected vertex in integer screen space.
///
/// `z` is the viewport-scaled depth; smaller is nearer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScreenVertex {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ScreenVertex {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// Horizontal extent of a polygon on one row, with the depth at each end.
#[derive(Clone, Copy, Debug)]
struct RowSpan {
    min_x: i32,
    max_x: i32,
    min_z: f64,
    max_z: f64,
}

impl RowSpan {
    const EMPTY: RowSpan = RowSpan {
        min_x: i32::MAX,
        max_x: i32::MIN,
        min_z: 0.0,
        max_z: 0.0,
    };

    #[inline]
    fn include(&mut self, x: i32, z: f64) {
        if x < self.min_x {
            self.min_x = x;
            self.min_z = z;
        }
        if x > self.max_x {
            self.max_x = x;
            self.max_z = z;
        }
    }
}

/// Scanline polygon filler writing into a color buffer with depth testing.
#[derive(Debug)]
pub struct Rasterizer {
    color_buffer: ColorBuffer,
    depth_buffer: DepthBuffer,
    color: Color,
    background: Color,
    /// Per-row span cache, one entry per buffer row.
    spans: Vec<RowSpan>,
}

impl Rasterizer {
    /// Create a rasterizer with its own `width × height` color and depth buffers.
    pub fn new(width: u32, height: u32) -> Self {
        debug!("Creating rasterizer: {}x{}", width, height);
        Self {
            color_buffer: ColorBuffer::new(width, height),
            depth_buffer: DepthBuffer::new(width, height),
            color: Color::WHITE,
            background: Color::BLACK,
            spans: vec![RowSpan::EMPTY; height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.color_buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.color_buffer.height()
    }

    pub fn color_buffer(&self) -> &ColorBuffer {
        &self.color_buffer
    }

    pub fn depth_buffer(&self) -> &DepthBuffer {
        &self.depth_buffer
    }

    /// Color used by [`clear`](Self::clear).
    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    /// Select the flat color for subsequent fills.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Start a new frame: background color everywhere, every depth far.
    pub fn clear(&mut self) {
        self.color_buffer.clear(self.background);
        self.depth_buffer.clear();
    }

    /// Fill the triangle `indices` picks out of `vertices`.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of range for `vertices`.
    pub fn fill_indexed_triangle(&mut self, vertices: &[ScreenVertex], indices: [u32; 3]) {
        let triangle = indices.map(|i| vertices[i as usize]);
        self.fill_convex_polygon_z_buffer(&triangle);
    }

    /// Fill a convex polygon with the current color.
    ///
    /// Each pixel inside the polygon takes the current color only if its
    /// interpolated depth is strictly nearer than what the depth buffer holds;
    /// the depth buffer is updated in the same step. Spans are inclusive of
    /// both ends. Parts of the polygon outside the buffer are skipped.
    ///
    /// Polygons with fewer than three vertices draw nothing.
    pub fn fill_convex_polygon_z_buffer(&mut self, vertices: &[ScreenVertex]) {
        if vertices.len() < 3 {
            return;
        }
        debug_assert!(
            vertices.len() <= MAX_POLYGON_VERTICES,
            "polygon has {} vertices",
            vertices.len()
        );

        let width = self.width() as i32;
        let height = self.height() as i32;
        if width == 0 || height == 0 {
            return;
        }

        let (mut min_y, mut max_y) = (i32::MAX, i32::MIN);
        for v in vertices {
            min_y = min_y.min(v.y);
            max_y = max_y.max(v.y);
        }
        let first_row = min_y.max(0);
        let last_row = max_y.min(height - 1);
        if first_row > last_row {
            return;
        }

        for span in &mut self.spans[first_row as usize..=last_row as usize] {
            *span = RowSpan::EMPTY;
        }

        let count = vertices.len();
        for i in 0..count {
            let a = vertices[i];
            let b = vertices[(i + 1) % count];
            self.scan_edge(a, b, first_row, last_row);
        }

        for row in first_row..=last_row {
            let span = self.spans[row as usize];
            if span.min_x > span.max_x {
                continue;
            }
            let start = span.min_x.max(0);
            let end = span.max_x.min(width - 1);
            if start > end {
                continue;
            }

            let run = span.max_x as f64 - span.min_x as f64;
            let row_offset = row as usize * width as usize;

            for x in start..=end {
                let t = if run > 0.0 {
                    (x as f64 - span.min_x as f64) / run
                } else {
                    0.0
                };
                let depth = (span.min_z + t * (span.max_z - span.min_z)).round() as i32;
                let offset = row_offset + x as usize;
                if self.depth_buffer.test_and_set(offset, depth) {
                    self.color_buffer.set_offset(offset, self.color);
                }
            }
        }
    }

    /// Record where the edge `a → b` crosses every row in `first..=last`.
    fn scan_edge(&mut self, a: ScreenVertex, b: ScreenVertex, first: i32, last: i32) {
        if a.y == b.y {
            if (first..=last).contains(&a.y) {
                let span = &mut self.spans[a.y as usize];
                span.include(a.x, a.z as f64);
                span.include(b.x, b.z as f64);
            }
            return;
        }

        let (top, bottom) = if a.y < b.y { (a, b) } else { (b, a) };
        // Far-apart vertices overflow i32 differences.
        let rows = bottom.y as f64 - top.y as f64;
        let dx = bottom.x as f64 - top.x as f64;
        let dz = bottom.z as f64 - top.z as f64;

        for y in top.y.max(first)..=bottom.y.min(last) {
            let t = (y as f64 - top.y as f64) / rows;
            let x = (top.x as f64 + t * dx).round() as i32;
            let z = top.z as f64 + t * dz;
            self.spans[y as usize].include(x, z);
        }
    }
}
