//! Models: a transform plus the meshes drawn with it.

use glam::Mat4;
use softscene_raster::{ClipMode, Rasterizer};

use crate::animation::{Animation, Animator};
use crate::error::SceneResult;
use crate::light::Light;
use crate::mesh::{Mesh, MeshStats};
use crate::transform::{TransformId, TransformTree};

/// Matrices and targets shared by every model in one frame.
pub struct RenderContext<'a> {
    pub transforms: &'a TransformTree,
    pub view: Mat4,
    /// `perspective × view`.
    pub view_projection: Mat4,
    /// Light already moved into view space.
    pub light: &'a Light,
    pub rasterizer: &'a mut Rasterizer,
    pub clip_mode: ClipMode,
}

/// An ordered collection of meshes sharing one transform.
#[derive(Clone, Debug)]
pub struct Model {
    transform: TransformId,
    meshes: Vec<Mesh>,
    animator: Option<Animator>,
}

impl Model {
    pub fn new(transform: TransformId, meshes: Vec<Mesh>) -> Self {
        Self {
            transform,
            meshes,
            animator: None,
        }
    }

    /// Attach a per-frame motion.
    pub fn with_animation(mut self, animation: Animation) -> Self {
        self.animator = Some(Animator::new(animation));
        self
    }

    /// Replace the per-frame motion, restarting it from the current pose.
    pub fn set_animation(&mut self, animation: Option<Animation>) {
        self.animator = animation.map(Animator::new);
    }

    pub fn transform(&self) -> TransformId {
        self.transform
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn animation(&self) -> Option<Animation> {
        self.animator.as_ref().map(Animator::animation)
    }

    pub fn update(&mut self, transforms: &mut TransformTree) -> SceneResult<()> {
        match &mut self.animator {
            Some(animator) => animator.apply(self.transform, transforms),
            None => Ok(()),
        }
    }

    /// Render every mesh with this model's world matrix.
    ///
    /// Stops at the first failing mesh.
    pub fn render(&mut self, ctx: &mut RenderContext<'_>) -> SceneResult<MeshStats> {
        let world = ctx.transforms.world_matrix(self.transform)?;
        let transform = ctx.view_projection * world;
        let model_view = ctx.view * world;

        let mut stats = MeshStats::default();
        for mesh in &mut self.meshes {
            stats += mesh.render(transform, model_view, ctx.light, ctx.rasterizer, ctx.clip_mode)?;
        }
        Ok(stats)
    }
}
