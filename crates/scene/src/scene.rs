//! The scene: node registry, per-frame update/render, and the main loop.

use std::collections::HashMap;

use slotmap::{SecondaryMap, SlotMap, new_key_type};
use softscene_core::Timer;
use softscene_raster::{ClipMode, Color, ColorBuffer, Rasterizer};
use tracing::{debug, info, trace, warn};

use crate::camera::{Camera, CameraSettings};
use crate::error::{SceneError, SceneResult};
use crate::host::{FrameHost, InputSource};
use crate::light::{Light, LightSettings};
use crate::mesh::{Mesh, MeshStats};
use crate::model::{Model, RenderContext};
use crate::node::Node;
use crate::transform::{Transform, TransformId, TransformTree};

/// Frames between two frame-rate reports.
const FPS_REPORT_INTERVAL: u32 = 120;

new_key_type! {
    /// Key of a [`Node`] inside a [`Scene`].
    pub struct NodeId;
}

/// Handle to a node known to be a [`Camera`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CameraId(NodeId);

/// Handle to a node known to be a [`Light`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LightId(NodeId);

/// Handle to a node known to be a [`Model`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModelId(NodeId);

macro_rules! impl_node_handle {
    ($($handle:ident),*) => {$(
        impl $handle {
            pub fn node(self) -> NodeId {
                self.0
            }
        }
    )*};
}

impl_node_handle!(CameraId, LightId, ModelId);

/// Result of one [`Scene::render_frame`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Models rendered without error.
    pub models: usize,
    /// Models whose render failed and were skipped.
    pub failed: usize,
    /// Triangle counters summed over all models.
    pub mesh: MeshStats,
}

/// Owns every node, their transforms, and the rasterizer they draw into.
#[derive(Debug)]
pub struct Scene {
    transforms: TransformTree,
    nodes: SlotMap<NodeId, Node>,
    names: SecondaryMap<NodeId, String>,
    by_name: HashMap<String, NodeId>,
    /// Insertion order, used for update and render.
    order: Vec<NodeId>,
    active_camera: Option<CameraId>,
    active_light: Option<LightId>,
    rasterizer: Rasterizer,
    clip_mode: ClipMode,
    exit: bool,
}

impl Scene {
    /// Create an empty scene rendering at `width × height`.
    pub fn new(width: u32, height: u32) -> Self {
        info!("Creating scene {}x{}", width, height);
        Self {
            transforms: TransformTree::new(),
            nodes: SlotMap::with_key(),
            names: SecondaryMap::new(),
            by_name: HashMap::new(),
            order: Vec::new(),
            active_camera: None,
            active_light: None,
            rasterizer: Rasterizer::new(width, height),
            clip_mode: ClipMode::default(),
            exit: false,
        }
    }

    pub fn width(&self) -> u32 {
        self.rasterizer.width()
    }

    pub fn height(&self) -> u32 {
        self.rasterizer.height()
    }

    /// Width over height of the render target.
    pub fn aspect_ratio(&self) -> f32 {
        self.width() as f32 / self.height().max(1) as f32
    }

    pub fn transforms(&self) -> &TransformTree {
        &self.transforms
    }

    pub fn transforms_mut(&mut self) -> &mut TransformTree {
        &mut self.transforms
    }

    pub fn rasterizer(&self) -> &Rasterizer {
        &self.rasterizer
    }

    pub fn color_buffer(&self) -> &ColorBuffer {
        self.rasterizer.color_buffer()
    }

    pub fn clip_mode(&self) -> ClipMode {
        self.clip_mode
    }

    pub fn set_clip_mode(&mut self, mode: ClipMode) {
        self.clip_mode = mode;
    }

    pub fn set_background(&mut self, color: Color) {
        self.rasterizer.set_background(color);
    }

    /// Register a node under a unique name.
    ///
    /// The node's transform must already be in [`transforms`](Self::transforms).
    /// Returns `None` and keeps the existing node if the name is taken.
    pub fn add_node(&mut self, name: &str, node: Node) -> Option<NodeId> {
        if self.by_name.contains_key(name) {
            warn!("Node '{}' already exists, ignoring the new {}", name, node.kind());
            return None;
        }
        let kind = node.kind();
        let is_camera = matches!(node, Node::Camera(_));
        let is_light = matches!(node, Node::Light(_));

        let id = self.nodes.insert(node);
        self.names.insert(id, name.to_string());
        self.by_name.insert(name.to_string(), id);
        self.order.push(id);

        if is_camera && self.active_camera.is_none() {
            self.active_camera = Some(CameraId(id));
        }
        if is_light && self.active_light.is_none() {
            self.active_light = Some(LightId(id));
        }
        debug!("Added {} '{}'", kind, name);
        Some(id)
    }

    /// Allocate `transform` and register the node built around it.
    fn add_with_transform(
        &mut self,
        name: &str,
        transform: Transform,
        build: impl FnOnce(TransformId) -> Node,
    ) -> Option<NodeId> {
        if self.by_name.contains_key(name) {
            warn!("Node '{}' already exists, ignoring the new one", name);
            return None;
        }
        let transform_id = self.transforms.insert(transform);
        self.add_node(name, build(transform_id))
    }

    /// Add a camera whose aspect ratio matches the render target.
    pub fn add_camera(
        &mut self,
        name: &str,
        transform: Transform,
        settings: CameraSettings,
    ) -> Option<CameraId> {
        let aspect = self.aspect_ratio();
        self.add_with_transform(name, transform, |id| {
            Node::Camera(Camera::new(id, settings, aspect))
        })
        .map(CameraId)
    }

    pub fn add_light(
        &mut self,
        name: &str,
        transform: Transform,
        settings: LightSettings,
    ) -> Option<LightId> {
        self.add_with_transform(name, transform, |id| Node::Light(Light::new(id, settings)))
            .map(LightId)
    }

    /// Add a model made of `meshes`. Animate it with [`Model::set_animation`]
    /// through [`model_mut`](Self::model_mut).
    pub fn add_model(&mut self, name: &str, transform: Transform, meshes: Vec<Mesh>) -> Option<ModelId> {
        self.add_with_transform(name, transform, |id| Node::Model(Model::new(id, meshes)))
            .map(ModelId)
    }

    /// Parent one node's transform to another's, or detach it with `None`.
    pub fn set_parent(&mut self, child: NodeId, parent: Option<NodeId>) -> SceneResult<()> {
        let child_transform = self
            .node(child)
            .ok_or_else(|| SceneError::UnknownNode(format!("{child:?}")))?
            .transform();
        let parent_transform = match parent {
            Some(p) => Some(
                self.node(p)
                    .ok_or_else(|| SceneError::UnknownNode(format!("{p:?}")))?
                    .transform(),
            ),
            None => None,
        };
        self.transforms.set_parent(child_transform, parent_transform)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn camera(&self, id: CameraId) -> Option<&Camera> {
        match self.nodes.get(id.0) {
            Some(Node::Camera(camera)) => Some(camera),
            _ => None,
        }
    }

    pub fn camera_mut(&mut self, id: CameraId) -> Option<&mut Camera> {
        match self.nodes.get_mut(id.0) {
            Some(Node::Camera(camera)) => Some(camera),
            _ => None,
        }
    }

    pub fn light(&self, id: LightId) -> Option<&Light> {
        match self.nodes.get(id.0) {
            Some(Node::Light(light)) => Some(light),
            _ => None,
        }
    }

    pub fn light_mut(&mut self, id: LightId) -> Option<&mut Light> {
        match self.nodes.get_mut(id.0) {
            Some(Node::Light(light)) => Some(light),
            _ => None,
        }
    }

    pub fn model(&self, id: ModelId) -> Option<&Model> {
        match self.nodes.get(id.0) {
            Some(Node::Model(model)) => Some(model),
            _ => None,
        }
    }

    pub fn model_mut(&mut self, id: ModelId) -> Option<&mut Model> {
        match self.nodes.get_mut(id.0) {
            Some(Node::Model(model)) => Some(model),
            _ => None,
        }
    }

    pub fn camera_by_name(&self, name: &str) -> Option<CameraId> {
        let id = self.node_by_name(name)?;
        matches!(self.nodes.get(id), Some(Node::Camera(_))).then_some(CameraId(id))
    }

    pub fn light_by_name(&self, name: &str) -> Option<LightId> {
        let id = self.node_by_name(name)?;
        matches!(self.nodes.get(id), Some(Node::Light(_))).then_some(LightId(id))
    }

    pub fn model_by_name(&self, name: &str) -> Option<ModelId> {
        let id = self.node_by_name(name)?;
        matches!(self.nodes.get(id), Some(Node::Model(_))).then_some(ModelId(id))
    }

    pub fn active_camera(&self) -> Option<CameraId> {
        self.active_camera
    }

    pub fn active_light(&self) -> Option<LightId> {
        self.active_light
    }

    pub fn set_active_camera(&mut self, id: CameraId) {
        self.active_camera = Some(id);
    }

    pub fn set_active_light(&mut self, id: LightId) {
        self.active_light = Some(id);
    }

    /// Update every node in insertion order.
    ///
    /// A node that fails to update is logged and skipped. Returns how many
    /// nodes failed.
    pub fn update(&mut self, input: &dyn InputSource) -> usize {
        let mut failed = 0;
        for &id in &self.order {
            let Some(node) = self.nodes.get_mut(id) else {
                continue;
            };
            if let Err(e) = node.update(&mut self.transforms, input) {
                warn!(
                    "Skipping update of '{}': {}",
                    self.names.get(id).map(String::as_str).unwrap_or("?"),
                    e
                );
                failed += 1;
            }
        }
        failed
    }

    /// Clear the target and draw every model from the active camera.
    ///
    /// A model that fails to render is logged and skipped.
    ///
    /// # Errors
    /// - [`SceneError::MissingCamera`] / [`SceneError::MissingLight`] if
    ///   there is no active camera or light
    /// - Transform errors of the camera itself
    pub fn render_frame(&mut self) -> SceneResult<FrameStats> {
        self.rasterizer.clear();

        let camera = self
            .active_camera
            .and_then(|id| self.camera(id))
            .ok_or(SceneError::MissingCamera)?;
        let view = camera.view_matrix(&self.transforms)?;
        let view_projection = camera.projection_matrix(&self.transforms)?;

        let light = {
            let light = self
                .active_light
                .and_then(|id| match self.nodes.get_mut(id.0) {
                    Some(Node::Light(light)) => Some(light),
                    _ => None,
                })
                .ok_or(SceneError::MissingLight)?;
            light.apply_view_transform(view);
            light.clone()
        };

        let mut ctx = RenderContext {
            transforms: &self.transforms,
            view,
            view_projection,
            light: &light,
            rasterizer: &mut self.rasterizer,
            clip_mode: self.clip_mode,
        };

        let mut stats = FrameStats::default();
        for &id in &self.order {
            let Some(node) = self.nodes.get_mut(id) else {
                continue;
            };
            if !matches!(node, Node::Model(_)) {
                continue;
            }
            match node.render(&mut ctx) {
                Ok(mesh_stats) => {
                    trace!(
                        "Rendered '{}': {} of {} triangles drawn",
                        self.names.get(id).map(String::as_str).unwrap_or("?"),
                        mesh_stats.drawn,
                        mesh_stats.triangles
                    );
                    stats.models += 1;
                    stats.mesh += mesh_stats;
                }
                Err(e) => {
                    warn!(
                        "Skipping model '{}': {}",
                        self.names.get(id).map(String::as_str).unwrap_or("?"),
                        e
                    );
                    stats.failed += 1;
                }
            }
        }
        Ok(stats)
    }

    /// Stop [`run`](Self::run) at the top of its next iteration.
    pub fn request_exit(&mut self) {
        self.exit = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit
    }

    /// Run the frame loop until the host closes or an exit is requested.
    pub fn run<H: FrameHost + ?Sized>(&mut self, host: &mut H) -> SceneResult<()> {
        self.exit = false;
        let mut timer = Timer::new();
        info!("Entering main loop");

        loop {
            if self.exit {
                break;
            }
            if !host.poll_events() {
                self.request_exit();
                continue;
            }

            self.update(host.input());
            let stats = self.render_frame()?;
            host.present(self.rasterizer.color_buffer())?;

            timer.tick();
            if timer.window_frames() >= FPS_REPORT_INTERVAL {
                let fps = timer.take_window_fps();
                debug!(
                    "{:.1} fps, triangles: {} drawn, {} culled, {} clipped",
                    fps, stats.mesh.drawn, stats.mesh.culled, stats.mesh.clipped
                );
            }
        }

        info!(
            "Main loop finished after {} frames ({:.1}s)",
            timer.frame_count(),
            timer.elapsed().as_secs_f32()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Animation;
    use crate::host::CameraInput;
    use glam::Vec3;
    use softscene_resources::MeshData;

    fn cube_meshes() -> Vec<Mesh> {
        vec![Mesh::from_data(&MeshData::cube(1.0)).unwrap()]
    }

    fn basic_scene() -> Scene {
        let mut scene = Scene::new(64, 64);
        scene.add_camera(
            "camera",
            Transform::new().with_position(Vec3::new(0.0, 0.0, 6.0)),
            CameraSettings::default(),
        );
        scene.add_light(
            "light",
            Transform::new().with_position(Vec3::new(0.0, 0.0, 6.0)),
            LightSettings {
                oscillation: None,
                ..Default::default()
            },
        );
        scene
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let mut scene = basic_scene();
        let first = scene.add_model("box", Transform::new(), cube_meshes());
        let transforms_before = scene.transforms().len();
        let second = scene.add_model("box", Transform::new(), Vec::new());

        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(scene.model_by_name("box"), first);
        assert_eq!(scene.model(first.unwrap()).unwrap().meshes().len(), 1);
        assert_eq!(scene.transforms().len(), transforms_before);
    }

    #[test]
    fn test_typed_lookups() {
        let scene = basic_scene();
        assert!(scene.camera_by_name("camera").is_some());
        assert!(scene.light_by_name("camera").is_none());
        assert!(scene.model_by_name("nothing").is_none());
        assert_eq!(scene.active_camera(), scene.camera_by_name("camera"));
        assert_eq!(scene.active_light(), scene.light_by_name("light"));
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn test_first_camera_stays_active() {
        let mut scene = basic_scene();
        let second = scene
            .add_camera("other", Transform::new(), CameraSettings::default())
            .unwrap();
        assert_ne!(scene.active_camera(), Some(second));
        scene.set_active_camera(second);
        assert_eq!(scene.active_camera(), Some(second));
    }

    #[test]
    fn test_render_without_camera_or_light() {
        let mut scene = Scene::new(8, 8);
        assert!(matches!(scene.render_frame(), Err(SceneError::MissingCamera)));
        scene.add_camera("camera", Transform::new(), CameraSettings::default());
        assert!(matches!(scene.render_frame(), Err(SceneError::MissingLight)));
    }

    #[test]
    fn test_render_cube() {
        let mut scene = basic_scene();
        scene.add_model("box", Transform::new(), cube_meshes());
        assert_eq!(scene.update(&[] as &[CameraInput; 0]), 0);

        let stats = scene.render_frame().unwrap();
        assert_eq!(stats.models, 1);
        assert_eq!(stats.failed, 0);
        assert_eq!(stats.mesh.triangles, 12);
        assert!(stats.mesh.drawn > 0 && stats.mesh.culled > 0);
        assert_ne!(scene.color_buffer().get_pixel(32, 32), Some(Color::BLACK));
    }

    #[test]
    fn test_failing_model_does_not_abort_frame() {
        let mut scene = basic_scene();
        // Sits on the camera plane, so its vertices project with w <= 0.
        scene.add_model(
            "behind",
            Transform::new().with_position(Vec3::new(0.0, 0.0, 6.0)),
            cube_meshes(),
        );
        scene.add_model("box", Transform::new(), cube_meshes());
        assert_eq!(scene.update(&[] as &[CameraInput; 0]), 0);

        let stats = scene.render_frame().unwrap();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.models, 1);
    }

    #[test]
    fn test_set_parent_by_node() {
        let mut scene = basic_scene();
        let island = scene
            .add_model("island", Transform::new().with_position(Vec3::X), Vec::new())
            .unwrap();
        let ship = scene.add_model("ship", Transform::new(), Vec::new()).unwrap();
        scene.set_parent(ship.node(), Some(island.node())).unwrap();

        let ship_transform = scene.model(ship).unwrap().transform();
        let p = scene
            .transforms()
            .world_matrix(ship_transform)
            .unwrap()
            .transform_point3(Vec3::ZERO);
        assert_eq!(p, Vec3::X);

        assert!(matches!(
            scene.set_parent(island.node(), Some(ship.node())),
            Err(SceneError::CyclicHierarchy(_))
        ));
    }

    struct ScriptedHost {
        frames_left: usize,
        presented: usize,
    }

    impl FrameHost for ScriptedHost {
        fn poll_events(&mut self) -> bool {
            if self.frames_left == 0 {
                return false;
            }
            self.frames_left -= 1;
            true
        }

        fn input(&self) -> &dyn InputSource {
            &[CameraInput::ZoomOut]
        }

        fn present(&mut self, frame: &ColorBuffer) -> SceneResult<()> {
            assert_eq!(frame.width(), 64);
            self.presented += 1;
            Ok(())
        }
    }

    #[test]
    fn test_failing_update_does_not_stop_run() {
        let mut scene = basic_scene();
        let broken = scene
            .add_model("broken", Transform::new(), cube_meshes())
            .unwrap();
        scene
            .model_mut(broken)
            .unwrap()
            .set_animation(Some(Animation::Spin { speed: 0.1 }));
        let orphaned = scene.model(broken).unwrap().transform();
        scene.transforms_mut().remove(orphaned);
        scene.add_model("box", Transform::new(), cube_meshes());

        assert_eq!(scene.update(&[] as &[CameraInput; 0]), 1);

        let mut host = ScriptedHost {
            frames_left: 10,
            presented: 0,
        };
        scene.run(&mut host).unwrap();
        assert_eq!(host.presented, 10);
    }

    #[test]
    fn test_run_until_host_closes() {
        let mut scene = basic_scene();
        scene.add_model("box", Transform::new(), cube_meshes());
        let mut host = ScriptedHost {
            frames_left: 5,
            presented: 0,
        };

        scene.run(&mut host).unwrap();

        assert_eq!(host.presented, 5);
        assert!(scene.exit_requested());
        let camera = scene.camera(scene.active_camera().unwrap()).unwrap();
        let z = scene.transforms().get(camera.transform()).unwrap().position().z;
        assert!((z - (6.0 + 5.0 * camera.settings().movement_speed)).abs() < 1e-4);
    }
}
