//! Window management using minifb.
//!
//! The window is the scene's [`FrameHost`]: it pumps events, owns the
//! keyboard state, and blits finished color buffers to the screen.

use minifb::{Key, WindowOptions};
use softscene_core::{Error, Result};
use softscene_raster::ColorBuffer;
use softscene_scene::{FrameHost, InputSource, SceneError, SceneResult};

use crate::input::{InputState, KeyBindings};

/// A window showing a fixed-size software framebuffer.
pub struct Window {
    window: minifb::Window,
    width: u32,
    height: u32,
    input: InputState,
}

impl Window {
    /// Create a new window with the given dimensions and title.
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self> {
        let window = minifb::Window::new(
            title,
            width as usize,
            height as usize,
            WindowOptions::default(),
        )
        .map_err(|e| Error::Window(e.to_string()))?;

        tracing::info!("Window created: {}x{}", width, height);

        Ok(Self {
            window,
            width,
            height,
            input: InputState::new(),
        })
    }

    /// Cap the presentation rate. Zero disables the cap.
    pub fn set_target_fps(&mut self, fps: usize) {
        self.window.set_target_fps(fps);
    }

    pub fn set_bindings(&mut self, bindings: KeyBindings) {
        *self.input.bindings_mut() = bindings;
    }

    /// Get the window width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the window height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the window is open and Escape is not held.
    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    pub fn input_state(&self) -> &InputState {
        &self.input
    }
}

impl FrameHost for Window {
    fn poll_events(&mut self) -> bool {
        if !self.is_open() {
            tracing::info!("Window closed");
            return false;
        }
        self.input.sync(&self.window.get_keys());
        true
    }

    fn input(&self) -> &dyn InputSource {
        &self.input
    }

    fn present(&mut self, frame: &ColorBuffer) -> SceneResult<()> {
        if frame.width() != self.width || frame.height() != self.height {
            return Err(SceneError::Present(format!(
                "frame is {}x{}, window is {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )));
        }
        self.window
            .update_with_buffer(frame.as_u32_slice(), self.width as usize, self.height as usize)
            .map_err(|e| SceneError::Present(e.to_string()))
    }
}
