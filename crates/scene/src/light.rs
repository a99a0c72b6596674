//! Point light with a Lambertian falloff.

use glam::{Mat4, Vec3};
use serde::Deserialize;

use crate::animation::PingPong;
use crate::error::{SceneError, SceneResult};
use crate::transform::{TransformId, TransformTree};

/// Vertical ping-pong applied to the light every update.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Oscillation {
    pub step: f32,
    pub lower: f32,
    pub upper: f32,
}

impl Default for Oscillation {
    fn default() -> Self {
        Self {
            step: 0.02,
            lower: -0.5,
            upper: 0.7,
        }
    }
}

/// Light parameters.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LightSettings {
    /// Diffuse strength.
    pub intensity: f32,
    /// Minimum intensity any surface receives.
    pub ambient: f32,
    /// Set to `None` for a static light.
    pub oscillation: Option<Oscillation>,
}

impl Default for LightSettings {
    fn default() -> Self {
        Self {
            intensity: 4.0,
            ambient: 0.3,
            oscillation: Some(Oscillation::default()),
        }
    }
}

/// A point light.
#[derive(Clone, Debug)]
pub struct Light {
    transform: TransformId,
    intensity: f32,
    ambient: f32,
    oscillation: Option<Oscillation>,
    motion: PingPong,
    rest: Option<Vec3>,
    /// World matrix of the current frame, later moved into view space.
    frame_matrix: Mat4,
}

impl Light {
    /// Create a light. `ambient` is clamped into `[0, 1]`.
    pub fn new(transform: TransformId, settings: LightSettings) -> Self {
        Self {
            transform,
            intensity: settings.intensity,
            ambient: settings.ambient.clamp(0.0, 1.0),
            oscillation: settings.oscillation,
            motion: PingPong::new(),
            rest: None,
            frame_matrix: Mat4::IDENTITY,
        }
    }

    pub fn transform(&self) -> TransformId {
        self.transform
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn ambient(&self) -> f32 {
        self.ambient
    }

    /// Advance the oscillation and refresh the per-frame matrix from the
    /// light's world matrix.
    pub fn update(&mut self, transforms: &mut TransformTree) -> SceneResult<()> {
        if let Some(osc) = self.oscillation {
            let transform = transforms
                .get_mut(self.transform)
                .ok_or_else(|| SceneError::UnknownNode(format!("{:?}", self.transform)))?;
            let rest = *self.rest.get_or_insert(transform.position());
            let y = self.motion.advance(osc.step, osc.lower, osc.upper);
            transform.set_position(Vec3::new(rest.x, y, rest.z));
        }
        self.frame_matrix = transforms.world_matrix(self.transform)?;
        Ok(())
    }

    /// Move the per-frame matrix into view space: `matrix = view × matrix`.
    ///
    /// This is not idempotent. Call it once per frame, after [`update`](Self::update).
    pub fn apply_view_transform(&mut self, view: Mat4) {
        self.frame_matrix = view * self.frame_matrix;
    }

    /// Position taken from the per-frame matrix.
    pub fn position(&self) -> Vec3 {
        self.frame_matrix.w_axis.truncate()
    }

    /// Lambertian intensity at `point` with surface `normal`, in `[ambient, 1]`.
    pub fn calculate_light_intensity(&self, point: Vec3, normal: Vec3) -> f32 {
        let l = (self.position() - point).normalize_or_zero();
        let total = self.ambient + self.intensity * l.dot(normal);
        if total.is_nan() {
            return self.ambient;
        }
        total.clamp(self.ambient, 1.0)
    }
}
