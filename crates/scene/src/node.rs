//! Scene entities.

use crate::camera::Camera;
use crate::error::SceneResult;
use crate::host::InputSource;
use crate::light::Light;
use crate::mesh::MeshStats;
use crate::model::{Model, RenderContext};
use crate::transform::{TransformId, TransformTree};

/// Anything that lives in a scene.
#[derive(Clone, Debug)]
pub enum Node {
    Camera(Camera),
    Light(Light),
    Model(Model),
}

impl Node {
    /// The transform this node owns.
    pub fn transform(&self) -> TransformId {
        match self {
            Node::Camera(camera) => camera.transform(),
            Node::Light(light) => light.transform(),
            Node::Model(model) => model.transform(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Node::Camera(_) => "camera",
            Node::Light(_) => "light",
            Node::Model(_) => "model",
        }
    }

    pub fn update(&mut self, transforms: &mut TransformTree, input: &dyn InputSource) -> SceneResult<()> {
        match self {
            Node::Camera(camera) => camera.update(transforms, input),
            Node::Light(light) => light.update(transforms),
            Node::Model(model) => model.update(transforms),
        }
    }

    /// Draw the node. Cameras and lights draw nothing.
    pub fn render(&mut self, ctx: &mut RenderContext<'_>) -> SceneResult<MeshStats> {
        match self {
            Node::Model(model) => model.render(ctx),
            Node::Camera(_) | Node::Light(_) => Ok(MeshStats::default()),
        }
    }
}
