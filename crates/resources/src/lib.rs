//! Resource loading.
//!
//! This crate turns external assets into plain mesh data:
//! - glTF model loading
//! - Procedural shapes (cube, octahedron)

mod error;
pub mod model;
mod procedural;

pub use error::{ResourceError, ResourceResult};
pub use model::{MeshData, ModelData};
