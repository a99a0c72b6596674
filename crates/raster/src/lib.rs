//! CPU rasterization back end.
//!
//! This crate is the "hardware" the scene renders into:
//! - Packed colors and the off-screen color buffer
//! - Depth buffer
//! - Screen-space clipping strategies
//! - Depth-buffered scanline polygon fill

pub mod clipper;
mod color;
mod color_buffer;
pub mod depth_buffer;
pub mod rasterizer;

pub use clipper::{ClipMode, Clipper, MAX_POLYGON_VERTICES};
pub use color::Color;
pub use color_buffer::ColorBuffer;
pub use depth_buffer::DepthBuffer;
pub use rasterizer::{Rasterizer, ScreenVertex};
