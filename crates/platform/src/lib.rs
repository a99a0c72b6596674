//! Platform layer for the software renderer.
//!
//! This crate provides platform-specific functionality:
//! - Window management and framebuffer presentation via minifb
//! - Keyboard state and camera key bindings

mod input;
mod window;

pub use input::{InputState, Key, KeyBindings};
pub use window::Window;
