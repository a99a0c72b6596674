//! Per-mesh vertex pipeline.
//!
//! Each frame a mesh takes its immutable source geometry through
//! model → clip → screen space, shades every vertex against the light,
//! drops back faces, clips to the viewport, and hands the surviving
//! polygons to the rasterizer with one flat color per face.

use std::ops::AddAssign;

use glam::{Mat4, Vec2, Vec3, Vec4};
use softscene_raster::clipper::filter_on_screen;
use softscene_raster::{ClipMode, Clipper, Color, MAX_POLYGON_VERTICES, Rasterizer, ScreenVertex};
use softscene_resources::{MeshData, ModelData};

use crate::error::{SceneError, SceneResult};
use crate::light::Light;

/// Scale applied to NDC depth before it is stored as an integer.
pub const DEPTH_SCALE: f32 = 1e8;

/// Smallest clip-space `w` accepted by the perspective divide.
const W_EPSILON: f32 = 1e-6;

/// Counters for one render of one or more meshes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeshStats {
    /// Triangles considered.
    pub triangles: usize,
    /// Dropped by the back-face test.
    pub culled: usize,
    /// Front-facing but not visible after clipping.
    pub clipped: usize,
    /// Submitted to the rasterizer.
    pub drawn: usize,
}

impl AddAssign for MeshStats {
    fn add_assign(&mut self, rhs: Self) {
        self.triangles += rhs.triangles;
        self.culled += rhs.culled;
        self.clipped += rhs.clipped;
        self.drawn += rhs.drawn;
    }
}

/// Whether a projected triangle is front facing.
///
/// Uses the z component of `(v1 - v0) × (v2 - v0)`; negative means
/// clockwise, which is the front-face convention of Y-flipped meshes.
pub fn is_front_face(v0: Vec2, v1: Vec2, v2: Vec2) -> bool {
    (v1 - v0).perp_dot(v2 - v0) < 0.0
}

/// Screen mapping `translate(w/2, h/2, 0) × scale(w/2, h/2, DEPTH_SCALE)`.
///
/// Half sizes use integer division.
pub fn viewport_matrix(width: u32, height: u32) -> Mat4 {
    let half_width = (width / 2) as f32;
    let half_height = (height / 2) as f32;
    Mat4::from_translation(Vec3::new(half_width, half_height, 0.0))
        * Mat4::from_scale(Vec3::new(half_width, half_height, DEPTH_SCALE))
}

/// A renderable triangle mesh with its scratch buffers.
#[derive(Clone, Debug)]
pub struct Mesh {
    original_vertices: Vec<Vec4>,
    original_normals: Vec<Vec4>,
    original_indices: Vec<u32>,
    original_colors: Vec<Color>,

    transformed_vertices: Vec<Vec4>,
    display_vertices: Vec<ScreenVertex>,
    transformed_colors: Vec<Color>,

    /// Computed on the first render; the viewport size never changes.
    viewport: Option<Mat4>,
    clipper: Clipper,
    polygon: Vec<ScreenVertex>,
}

impl Mesh {
    /// Build a mesh from imported data, colored mid grey.
    ///
    /// # Errors
    /// [`SceneError::InvalidMesh`] if the data fails validation.
    pub fn from_data(data: &MeshData) -> SceneResult<Self> {
        data.validate()?;
        let count = data.vertex_count();
        Ok(Self {
            original_vertices: data.positions.iter().map(|p| p.extend(1.0)).collect(),
            original_normals: data.normals.iter().map(|n| n.extend(0.0)).collect(),
            original_indices: data.indices.clone(),
            original_colors: vec![Color::MID_GREY; count],
            transformed_vertices: vec![Vec4::ZERO; count],
            display_vertices: vec![ScreenVertex::default(); count],
            transformed_colors: vec![Color::BLACK; count],
            viewport: None,
            clipper: Clipper::new(),
            polygon: Vec::with_capacity(MAX_POLYGON_VERTICES),
        })
    }

    /// Convert every mesh of an imported model.
    pub fn from_model(data: &ModelData) -> SceneResult<Vec<Self>> {
        data.meshes.iter().map(Self::from_data).collect()
    }

    /// Replace the base color of every vertex.
    pub fn with_color(mut self, color: Color) -> Self {
        self.original_colors.fill(color);
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.original_vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.original_indices.len() / 3
    }

    /// Run the vertex pipeline and submit visible faces.
    ///
    /// # Arguments
    /// * `transform` - model to clip space (`projection × view × model`)
    /// * `model_view` - model to camera space, used for normals
    ///
    /// # Errors
    /// [`SceneError::DegenerateVertex`] if a vertex lands at `w <= ε`. Nothing
    /// is drawn in that case.
    pub fn render(
        &mut self,
        transform: Mat4,
        model_view: Mat4,
        light: &Light,
        rasterizer: &mut Rasterizer,
        clip_mode: ClipMode,
    ) -> SceneResult<MeshStats> {
        let width = rasterizer.width();
        let height = rasterizer.height();
        let viewport = *self
            .viewport
            .get_or_insert_with(|| viewport_matrix(width, height));

        for index in 0..self.original_vertices.len() {
            let clip = transform * self.original_vertices[index];
            if !(clip.w > W_EPSILON) || !clip.w.is_finite() {
                return Err(SceneError::DegenerateVertex { index, w: clip.w });
            }
            let projected = (clip.truncate() / clip.w).extend(1.0);
            self.transformed_vertices[index] = projected;

            let screen = viewport * projected;
            self.display_vertices[index] =
                ScreenVertex::new(screen.x as i32, screen.y as i32, screen.z as i32);

            let normal = (model_view * self.original_normals[index])
                .truncate()
                .normalize_or_zero();
            let intensity = light.calculate_light_intensity(projected.truncate(), normal);
            self.transformed_colors[index] = self.original_colors[index].scaled(intensity);
        }

        let mut stats = MeshStats::default();
        for face in self.original_indices.chunks_exact(3) {
            stats.triangles += 1;
            let corners = [face[0], face[1], face[2]].map(|i| i as usize);
            let [v0, v1, v2] = corners.map(|i| self.transformed_vertices[i].truncate().truncate());
            if !is_front_face(v0, v1, v2) {
                stats.culled += 1;
                continue;
            }

            let triangle = corners.map(|i| self.display_vertices[i]);
            let visible = match clip_mode {
                ClipMode::ScreenMembership => {
                    filter_on_screen(&triangle, width, height, &mut self.polygon) >= 3
                }
                ClipMode::Polygon => {
                    self.clipper.clip(&triangle, width, height, &mut self.polygon);
                    self.polygon.len() >= 3
                }
            };
            if !visible {
                stats.clipped += 1;
                continue;
            }

            rasterizer.set_color(self.transformed_colors[corners[0]]);
            match clip_mode {
                ClipMode::ScreenMembership => rasterizer.fill_convex_polygon_z_buffer(&triangle),
                ClipMode::Polygon => rasterizer.fill_convex_polygon_z_buffer(&self.polygon),
            }
            stats.drawn += 1;
        }
        Ok(stats)
    }
}
