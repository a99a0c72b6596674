//! Off-screen color buffer.

use crate::Color;

/// A `width × height` grid of packed colors, row-major with row 0 at the top.
#[derive(Clone, Debug)]
pub struct ColorBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl ColorBuffer {
    /// Create a buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::BLACK; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels.
    pub fn size(&self) -> usize {
        self.pixels.len()
    }

    /// Fill every pixel with `color`.
    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Linear offset of `(x, y)`, or `None` outside the buffer.
    #[inline]
    pub fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.offset(x, y).map(|i| self.pixels[i])
    }

    /// Write a pixel; coordinates outside the buffer are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if let Some(i) = self.offset(x, y) {
            self.pixels[i] = color;
        }
    }

    #[inline]
    pub(crate) fn set_offset(&mut self, offset: usize, color: Color) {
        self.pixels[offset] = color;
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// The pixels as `0x00RRGGBB` words, ready for a window back end.
    pub fn as_u32_slice(&self) -> &[u32] {
        bytemuck::cast_slice(&self.pixels[..])
    }

    /// Copy `source` into this buffer with its top-left corner at `(x, y)`,
    /// cropping whatever falls outside.
    pub fn blit(&mut self, source: &ColorBuffer, x: i32, y: i32) {
        for sy in 0..source.height {
            let ty = y + sy as i32;
            if ty < 0 || ty >= self.height as i32 {
                continue;
            }
            for sx in 0..source.width {
                let tx = x + sx as i32;
                if tx < 0 || tx >= self.width as i32 {
                    continue;
                }
                let color = source.pixels[sy as usize * source.width as usize + sx as usize];
                self.set_pixel(tx as u32, ty as u32, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_black() {
        let buffer = ColorBuffer::new(4, 3);
        assert_eq!(buffer.size(), 12);
        assert!(buffer.pixels().iter().all(|&c| c == Color::BLACK));
    }

    #[test]
    fn test_set_and_get_pixel() {
        let mut buffer = ColorBuffer::new(4, 3);
        buffer.set_pixel(3, 2, Color::RED);
        assert_eq!(buffer.get_pixel(3, 2), Some(Color::RED));
        assert_eq!(buffer.get_pixel(4, 2), None);
        assert_eq!(buffer.as_u32_slice()[2 * 4 + 3], 0x00FF_0000);
    }

    #[test]
    fn test_out_of_range_write_is_ignored() {
        let mut buffer = ColorBuffer::new(2, 2);
        buffer.set_pixel(5, 5, Color::RED);
        assert!(buffer.pixels().iter().all(|&c| c == Color::BLACK));
    }

    #[test]
    fn test_blit_crops() {
        let mut target = ColorBuffer::new(4, 4);
        let mut source = ColorBuffer::new(2, 2);
        source.clear(Color::GREEN);
        target.blit(&source, 3, -1);
        assert_eq!(target.get_pixel(3, 0), Some(Color::GREEN));
        assert_eq!(target.get_pixel(3, 1), Some(Color::BLACK));
        assert_eq!(target.get_pixel(2, 0), Some(Color::BLACK));
    }
}
