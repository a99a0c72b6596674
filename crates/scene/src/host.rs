//! Contracts between the scene and whatever displays it.
//!
//! The scene never talks to a window system directly. A [`FrameHost`] pumps
//! events, exposes the current key state through [`InputSource`], and shows
//! finished frames.

use softscene_raster::ColorBuffer;

use crate::error::SceneResult;

/// Logical camera controls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CameraInput {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    ZoomIn,
    ZoomOut,
    RotateUp,
    RotateDown,
    RotateLeft,
    RotateRight,
    /// Return the camera to the origin with no rotation.
    Reset,
}

impl CameraInput {
    /// Every control, in declaration order.
    pub const ALL: [CameraInput; 11] = [
        CameraInput::MoveUp,
        CameraInput::MoveDown,
        CameraInput::MoveLeft,
        CameraInput::MoveRight,
        CameraInput::ZoomIn,
        CameraInput::ZoomOut,
        CameraInput::RotateUp,
        CameraInput::RotateDown,
        CameraInput::RotateLeft,
        CameraInput::RotateRight,
        CameraInput::Reset,
    ];
}

/// Polled key state, queried once per control per frame.
pub trait InputSource {
    /// Whether the control is held this frame.
    fn is_active(&self, input: CameraInput) -> bool;
}

/// A fixed set of held controls. Handy for scripted runs and tests.
impl<const N: usize> InputSource for [CameraInput; N] {
    fn is_active(&self, input: CameraInput) -> bool {
        self.contains(&input)
    }
}

/// Display side of the main loop.
pub trait FrameHost {
    /// Pump pending window events. Returns `false` once the user asked to quit.
    fn poll_events(&mut self) -> bool;

    /// Key state for the frame about to be updated.
    fn input(&self) -> &dyn InputSource;

    /// Show a finished frame.
    fn present(&mut self, frame: &ColorBuffer) -> SceneResult<()>;
}
