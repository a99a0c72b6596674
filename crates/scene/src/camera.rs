//! Camera for rendering the scene.

use glam::{Mat4, Vec2, Vec3};
use serde::Deserialize;

use crate::error::{SceneError, SceneResult};
use crate::host::{CameraInput, InputSource};
use crate::transform::{TransformId, TransformTree};

/// Lens and control parameters, fixed at construction.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Distance moved per frame while a movement control is held.
    pub movement_speed: f32,
    /// Radians turned per frame while a rotation control is held.
    pub rotation_speed: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            near: 1.5,
            far: 100.0,
            movement_speed: 0.1,
            rotation_speed: 0.005,
        }
    }
}

/// Accumulated camera pose driven by input.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Pose {
    position: Vec3,
    /// Pitch (x) and yaw (y).
    rotation: Vec2,
}

/// A perspective camera bound to a transform.
#[derive(Clone, Debug)]
pub struct Camera {
    transform: TransformId,
    settings: CameraSettings,
    perspective: Mat4,
    /// Seeded from the transform on the first update.
    pose: Option<Pose>,
}

impl Camera {
    /// Create a camera for a viewport with the given aspect ratio.
    pub fn new(transform: TransformId, settings: CameraSettings, aspect: f32) -> Self {
        let perspective = Mat4::perspective_rh_gl(
            settings.fov_degrees.to_radians(),
            aspect,
            settings.near,
            settings.far,
        );
        Self {
            transform,
            settings,
            perspective,
            pose: None,
        }
    }

    pub fn transform(&self) -> TransformId {
        self.transform
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// The perspective matrix alone.
    pub fn perspective_matrix(&self) -> Mat4 {
        self.perspective
    }

    /// Apply held controls to the camera transform.
    pub fn update(&mut self, transforms: &mut TransformTree, input: &dyn InputSource) -> SceneResult<()> {
        let transform = transforms
            .get_mut(self.transform)
            .ok_or_else(|| SceneError::UnknownNode(format!("{:?}", self.transform)))?;

        let pose = self.pose.get_or_insert_with(|| Pose {
            position: transform.position(),
            rotation: transform.rotation().truncate(),
        });

        let step = self.settings.movement_speed;
        let turn = self.settings.rotation_speed;
        for control in CameraInput::ALL {
            if !input.is_active(control) {
                continue;
            }
            match control {
                CameraInput::MoveUp => pose.position.y -= step,
                CameraInput::MoveDown => pose.position.y += step,
                CameraInput::MoveLeft => pose.position.x -= step,
                CameraInput::MoveRight => pose.position.x += step,
                CameraInput::ZoomOut => pose.position.z += step,
                CameraInput::ZoomIn => pose.position.z -= step,
                CameraInput::RotateUp => pose.rotation.x -= turn,
                CameraInput::RotateDown => pose.rotation.x += turn,
                CameraInput::RotateRight => pose.rotation.y -= turn,
                CameraInput::RotateLeft => pose.rotation.y += turn,
                CameraInput::Reset => {}
            }
        }
        if input.is_active(CameraInput::Reset) {
            pose.position = Vec3::ZERO;
            pose.rotation = Vec2::ZERO;
        }

        transform.set_position(pose.position);
        transform.set_rotation(pose.rotation.extend(0.0));
        Ok(())
    }

    /// Get the view matrix: the inverse of the camera's world matrix.
    pub fn view_matrix(&self, transforms: &TransformTree) -> SceneResult<Mat4> {
        Ok(transforms.world_matrix(self.transform)?.inverse())
    }

    /// Get the combined view-projection matrix (`perspective × view`).
    ///
    /// Model matrices are appended on the right by the caller.
    pub fn projection_matrix(&self, transforms: &TransformTree) -> SceneResult<Mat4> {
        Ok(self.perspective * self.view_matrix(transforms)?)
    }
}
