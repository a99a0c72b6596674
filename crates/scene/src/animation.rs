//! Scripted per-frame motion for lights and models.

use glam::Vec3;
use serde::Deserialize;

use crate::error::{SceneError, SceneResult};
use crate::transform::{TransformId, TransformTree};

/// Back-and-forth scalar motion between two bounds.
///
/// The direction flips when the offset has reached either bound, then the
/// offset advances one step. Starting at 0 heading up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PingPong {
    offset: f32,
    direction: f32,
}

impl Default for PingPong {
    fn default() -> Self {
        Self {
            offset: 0.0,
            direction: 1.0,
        }
    }
}

impl PingPong {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Advance one frame and return the new offset.
    pub fn advance(&mut self, step: f32, lower: f32, upper: f32) -> f32 {
        if self.offset >= upper || self.offset <= lower {
            self.direction = -self.direction;
        }
        self.offset += self.direction * step;
        self.offset
    }
}

/// Motion applied to a model's transform every update.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Animation {
    /// Bob below the resting height while turning about Y.
    Bob {
        /// How far below the resting height the model sinks.
        amplitude: f32,
        /// Per-frame step of both the bobbing and the spin angle.
        speed: f32,
    },
    /// Constant rotation about Y.
    Spin {
        /// Radians per frame.
        speed: f32,
    },
}

/// Per-instance state of an [`Animation`].
#[derive(Clone, Debug)]
pub(crate) struct Animator {
    animation: Animation,
    angle: f32,
    bob: PingPong,
    /// Position and rotation captured on the first frame.
    rest: Option<(Vec3, Vec3)>,
}

impl Animator {
    pub(crate) fn new(animation: Animation) -> Self {
        Self {
            animation,
            angle: 0.0,
            bob: PingPong::new(),
            rest: None,
        }
    }

    pub(crate) fn animation(&self) -> Animation {
        self.animation
    }

    pub(crate) fn apply(&mut self, id: TransformId, transforms: &mut TransformTree) -> SceneResult<()> {
        let transform = transforms
            .get_mut(id)
            .ok_or_else(|| SceneError::UnknownNode(format!("{id:?}")))?;
        let (position, rotation) =
            *self
                .rest
                .get_or_insert((transform.position(), transform.rotation()));

        match self.animation {
            Animation::Bob { amplitude, speed } => {
                self.angle += speed;
                let offset = self.bob.advance(speed, -amplitude, 0.0);
                transform.set_position(position + Vec3::new(0.0, offset, 0.0));
                transform.set_rotation(Vec3::new(0.0, self.angle * 0.8, 0.0));
            }
            Animation::Spin { speed } => {
                self.angle += speed;
                transform.set_rotation(Vec3::new(rotation.x, rotation.y + self.angle, rotation.z));
            }
        }
        Ok(())
    }
}
