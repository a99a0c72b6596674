//! Packed 24-bit color.

use bytemuck::{Pod, Zeroable};
use serde::Deserialize;

/// An RGB color packed as `0x00RRGGBB`.
///
/// The packing matches the layout window back ends expect for a `u32`
/// framebuffer, so a slice of colors can be reinterpreted without copying.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Deserialize)]
#[serde(from = "[u8; 3]")]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    /// Base color given to imported vertices.
    pub const MID_GREY: Color = Color::rgb(127, 127, 127);

    /// Build a color from 8-bit channels.
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Color(((red as u32) << 16) | ((green as u32) << 8) | blue as u32)
    }

    /// Build a color from normalized channels; values outside `[0, 1]` saturate.
    pub fn from_f32(red: f32, green: f32, blue: f32) -> Self {
        Color::rgb(unit_to_u8(red), unit_to_u8(green), unit_to_u8(blue))
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Multiply every channel by `factor`, each channel saturating at 0 and 255.
    pub fn scaled(self, factor: f32) -> Self {
        let scale = |channel: u8| (channel as f32 * factor).clamp(0.0, 255.0) as u8;
        Color::rgb(scale(self.red()), scale(self.green()), scale(self.blue()))
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Color::rgb(r, g, b)
    }
}

fn unit_to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}
