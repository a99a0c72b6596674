//! Error types for resource loading.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for resource loading operations.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// Failed to load a glTF file.
    #[error("Failed to load glTF file '{path}': {message}")]
    GltfLoad {
        /// Path to the file that failed to load.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// A primitive is not a plain triangle list.
    #[error("Mesh '{mesh}' is not triangulated ({detail})")]
    NonTriangleFaces {
        /// Name of the offending mesh.
        mesh: String,
        /// What was found instead.
        detail: String,
    },

    /// An index points past the end of the vertex arrays.
    #[error("Index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// The bad index.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// Normal and position arrays disagree in length.
    #[error("Mesh has {positions} positions but {normals} normals")]
    NormalCountMismatch {
        /// Number of positions.
        positions: usize,
        /// Number of normals.
        normals: usize,
    },

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
}

/// Result type alias for resource operations.
pub type ResourceResult<T> = Result<T, ResourceError>;
