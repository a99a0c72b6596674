//! Scene description: what the demo shows and how it is set up.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use glam::Vec3;
use serde::Deserialize;
use softscene_raster::{ClipMode, Color};
use softscene_resources::{MeshData, ModelData};
use softscene_scene::{Animation, CameraSettings, LightSettings, Mesh, Scene, Transform};
use tracing::{info, warn};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Zero leaves the frame rate uncapped.
    pub target_fps: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "softscene".to_string(),
            width: 800,
            height: 800,
            target_fps: 60,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    #[serde(flatten)]
    pub settings: CameraSettings,
    pub position: [f32; 3],
    /// Euler angles in radians.
    pub rotation: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            settings: CameraSettings::default(),
            position: [0.0, -3.0, 0.0],
            rotation: [0.5, 0.0, 0.0],
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    #[serde(flatten)]
    pub settings: LightSettings,
    pub position: [f32; 3],
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            settings: LightSettings::default(),
            position: [0.0, 3.0, 0.0],
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub clip_mode: ClipMode,
    pub background: Color,
}

/// Built-in geometry.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Cube { half_extent: f32 },
    Octahedron { radius: f32 },
}

impl Shape {
    fn mesh(self) -> MeshData {
        match self {
            Shape::Cube { half_extent } => MeshData::cube(half_extent),
            Shape::Octahedron { radius } => MeshData::octahedron(radius),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    /// glTF file, relative to the configuration file.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Used when there is no `path`, or when loading it fails.
    #[serde(default)]
    pub shape: Option<Shape>,
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default)]
    pub rotation: [f32; 3],
    /// Uniform factor multiplied into the default scale of 1.
    #[serde(default = "unit_scale")]
    pub scale: f32,
    /// Name of another model this one is attached to.
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub animation: Option<Animation>,
    /// Base color; mid grey when absent.
    #[serde(default)]
    pub color: Option<Color>,
}

fn unit_scale() -> f32 {
    1.0
}

impl ModelConfig {
    fn shape(name: &str, shape: Shape) -> Self {
        Self {
            name: name.to_string(),
            path: None,
            shape: Some(shape),
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: 1.0,
            parent: None,
            animation: None,
            color: None,
        }
    }

    /// Load or generate the geometry.
    fn meshes(&self, base_dir: &Path) -> Result<Vec<Mesh>> {
        let data = match (&self.path, self.shape) {
            (Some(path), fallback) => {
                let full = base_dir.join(path);
                match ModelData::load(&full) {
                    Ok(data) => data,
                    Err(e) => match fallback {
                        Some(shape) => {
                            warn!("{}: {}, using built-in {:?}", self.name, e, shape);
                            ModelData::from_meshes(vec![shape.mesh()])
                        }
                        None => {
                            return Err(e).with_context(|| format!("loading model '{}'", self.name));
                        }
                    },
                }
            }
            (None, Some(shape)) => ModelData::from_meshes(vec![shape.mesh()]),
            (None, None) => bail!("model '{}' has neither a path nor a shape", self.name),
        };

        let meshes = Mesh::from_model(&data)
            .with_context(|| format!("preparing model '{}'", self.name))?;
        Ok(match self.color {
            Some(color) => meshes.into_iter().map(|m| m.with_color(color)).collect(),
            None => meshes,
        })
    }

    fn transform(&self) -> Transform {
        let mut transform = Transform::new()
            .with_position(Vec3::from(self.position))
            .with_rotation(Vec3::from(self.rotation));
        transform.scale_by(self.scale);
        transform
    }
}

/// Everything needed to build the demo scene.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub light: LightConfig,
    pub render: RenderConfig,
    #[serde(rename = "model")]
    pub models: Vec<ModelConfig>,
}

impl Default for SceneConfig {
    /// A spinning island with a bobbing ship and two clouds, all built-in shapes.
    fn default() -> Self {
        let island = ModelConfig {
            position: [0.0, 2.0, -7.0],
            animation: Some(Animation::Spin { speed: 0.005 }),
            color: Some(Color::rgb(70, 160, 80)),
            ..ModelConfig::shape("island", Shape::Octahedron { radius: 2.5 })
        };
        let ship = ModelConfig {
            position: [3.0, -1.0, 0.0],
            parent: Some("island".to_string()),
            animation: Some(Animation::Bob {
                amplitude: 0.5,
                speed: 0.01,
            }),
            color: Some(Color::rgb(150, 90, 40)),
            ..ModelConfig::shape("ship", Shape::Cube { half_extent: 0.4 })
        };
        let clouds = [("cloud1", [4.0, -3.0, 0.0]), ("cloud2", [-5.0, -2.5, 0.0])].map(
            |(name, position)| ModelConfig {
                position,
                parent: Some("island".to_string()),
                color: Some(Color::WHITE),
                ..ModelConfig::shape(name, Shape::Cube { half_extent: 0.6 })
            },
        );

        let mut models = vec![island, ship];
        models.extend(clouds);
        Self {
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            light: LightConfig::default(),
            render: RenderConfig::default(),
            models,
        }
    }
}

impl SceneConfig {
    /// Create the scene described by this configuration.
    ///
    /// Relative model paths are resolved against `base_dir`.
    pub fn build_scene(&self, base_dir: &Path) -> Result<Scene> {
        let mut scene = Scene::new(self.window.width, self.window.height);
        scene.set_clip_mode(self.render.clip_mode);
        scene.set_background(self.render.background);

        scene.add_camera(
            "camera",
            Transform::new()
                .with_position(Vec3::from(self.camera.position))
                .with_rotation(Vec3::from(self.camera.rotation)),
            self.camera.settings,
        );
        scene.add_light(
            "light",
            Transform::new().with_position(Vec3::from(self.light.position)),
            self.light.settings,
        );

        for model in &self.models {
            let meshes = model.meshes(base_dir)?;
            let Some(id) = scene.add_model(&model.name, model.transform(), meshes) else {
                continue;
            };
            if let Some(model_mut) = scene.model_mut(id) {
                model_mut.set_animation(model.animation);
            }
        }

        // Parents may be declared after their children.
        for model in &self.models {
            let Some(parent) = &model.parent else {
                continue;
            };
            let child = scene
                .node_by_name(&model.name)
                .with_context(|| format!("model '{}' was not added", model.name))?;
            let Some(parent_id) = scene.node_by_name(parent) else {
                bail!("model '{}' has unknown parent '{}'", model.name, parent);
            };
            scene
                .set_parent(child, Some(parent_id))
                .with_context(|| format!("attaching '{}' to '{}'", model.name, parent))?;
        }

        info!(
            "Scene ready: {} nodes, {} models",
            scene.len(),
            self.models.len()
        );
        Ok(scene)
    }
}
