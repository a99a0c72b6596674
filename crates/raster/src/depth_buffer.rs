//! Depth buffer management.
//!
//! This module holds the per-pixel depth record used by the rasterizer to
//! resolve overlapping geometry.
//!
//! # Overview
//!
//! - [`DepthBuffer`] stores one `i32` per pixel, in the same row-major layout
//!   as [`ColorBuffer`](crate::ColorBuffer)
//! - Depth values come from screen-space z after the viewport scale, so
//!   smaller values are nearer to the viewer
//! - [`DepthBuffer::FAR`] marks a pixel nothing has been drawn to yet
//!
//! # Example
//!
//! ```
//! use softscene_raster::DepthBuffer;
//!
//! let mut depth = DepthBuffer::new(640, 480);
//! assert!(depth.test_and_set(0, 1_000));
//! assert!(!depth.test_and_set(0, 2_000));
//! depth.clear();
//! assert_eq!(depth.get(0, 0), Some(DepthBuffer::FAR));
//! ```

/// Depth buffer for depth testing.
///
/// The buffer is created once per viewport and cleared at the start of every
/// frame. A write succeeds only when the incoming depth is strictly nearer
/// than the stored one.
#[derive(Clone, Debug)]
pub struct DepthBuffer {
    /// Depth buffer width in pixels.
    width: u32,
    /// Depth buffer height in pixels.
    height: u32,
    /// Stored depths, row-major.
    values: Vec<i32>,
}

impl DepthBuffer {
    /// Depth of an untouched pixel.
    pub const FAR: i32 = i32::MAX;

    /// Creates a depth buffer with every pixel at [`FAR`](Self::FAR).
    ///
    /// # Arguments
    ///
    /// * `width` - Width in pixels
    /// * `height` - Height in pixels
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            values: vec![Self::FAR; width as usize * height as usize],
        }
    }

    /// Returns the width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resets every pixel to [`FAR`](Self::FAR).
    pub fn clear(&mut self) {
        self.values.fill(Self::FAR);
    }

    /// Returns the stored depth at `(x, y)`, or `None` outside the buffer.
    pub fn get(&self, x: u32, y: u32) -> Option<i32> {
        if x < self.width && y < self.height {
            Some(self.values[y as usize * self.width as usize + x as usize])
        } else {
            None
        }
    }

    /// Compares `depth` against the stored value at `offset` and stores it
    /// when nearer.
    ///
    /// Returns `true` when the caller should write the matching color pixel.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is outside the buffer.
    #[inline]
    pub fn test_and_set(&mut self, offset: usize, depth: i32) -> bool {
        let stored = &mut self.values[offset];
        if depth < *stored {
            *stored = depth;
            true
        } else {
            false
        }
    }
}
