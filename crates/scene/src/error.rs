//! Error types for the scene graph and vertex pipeline.

use softscene_resources::ResourceError;
use thiserror::Error;

use crate::transform::TransformId;

/// Error type for scene operations.
#[derive(Error, Debug)]
pub enum SceneError {
    /// A node or transform key that is not (or no longer) in the scene.
    #[error("Unknown node: {0}")]
    UnknownNode(String),

    /// Parenting would make a transform its own ancestor.
    #[error("Cyclic transform hierarchy at {0:?}")]
    CyclicHierarchy(TransformId),

    /// An ancestor chain would be longer than the hierarchy limit.
    #[error("Transform hierarchy at {id:?} deeper than {limit} levels")]
    HierarchyTooDeep {
        /// Transform whose chain is too long.
        id: TransformId,
        /// The limit that was exceeded.
        limit: usize,
    },

    /// A vertex projected to a clip-space `w` that cannot be divided by.
    #[error("Vertex {index} has degenerate clip-space w = {w}")]
    DegenerateVertex {
        /// Vertex index within the mesh.
        index: usize,
        /// The offending `w`.
        w: f32,
    },

    /// `render_frame` was called without an active camera.
    #[error("Scene has no active camera")]
    MissingCamera,

    /// `render_frame` was called without an active light.
    #[error("Scene has no active light")]
    MissingLight,

    /// Mesh data handed to the scene failed validation.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(#[from] ResourceError),

    /// The frame host could not show a frame.
    #[error("Failed to present frame: {0}")]
    Present(String),
}

/// Result type alias for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

impl From<SceneError> for softscene_core::Error {
    fn from(err: SceneError) -> Self {
        softscene_core::Error::Scene(err.to_string())
    }
}
