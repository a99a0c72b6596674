//! Scene graph and CPU vertex pipeline.
//!
//! This crate provides scene management:
//! - Transform hierarchy in a key-based arena
//! - Camera, point light, and models with optional animation
//! - The per-mesh vertex pipeline feeding the rasterizer
//! - The frame loop and the contract with whatever displays it

mod animation;
pub mod camera;
mod error;
mod host;
pub mod light;
pub mod mesh;
pub mod model;
mod node;
mod scene;
pub mod transform;

pub use animation::{Animation, PingPong};
pub use camera::{Camera, CameraSettings};
pub use error::{SceneError, SceneResult};
pub use host::{CameraInput, FrameHost, InputSource};
pub use light::{Light, LightSettings, Oscillation};
pub use mesh::{DEPTH_SCALE, Mesh, MeshStats, is_front_face};
pub use model::{Model, RenderContext};
pub use node::Node;
pub use scene::{CameraId, FrameStats, LightId, ModelId, NodeId, Scene};
pub use transform::{Transform, TransformId, TransformTree};
