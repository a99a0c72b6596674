//! Imported mesh geometry.
//!
//! Everything in this module is plain data: positions, normals and a
//! flattened triangle index list per mesh. The renderer consumes it as is.
//!
//! # Axis convention
//!
//! Screen rows grow downwards while model space has +Y up, so every mesh is
//! mirrored on Y when it enters the renderer ([`MeshData::flip_y`]). The
//! mirror also reverses the winding of every face, which is what the
//! clockwise front-face test downstream expects.

use std::path::Path;

use glam::Vec3;
use tracing::{debug, info, warn};

use crate::error::{ResourceError, ResourceResult};

/// A triangulated mesh.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    /// Optional name taken from the source file.
    pub name: String,
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Per-vertex normals, same length as `positions`.
    pub normals: Vec<Vec3>,
    /// Triangle list, three indices per face.
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Build a mesh from parallel arrays, checking that they are consistent.
    ///
    /// # Errors
    /// - [`ResourceError::NormalCountMismatch`] if the array lengths differ
    /// - [`ResourceError::NonTriangleFaces`] if `indices.len()` is not a multiple of 3
    /// - [`ResourceError::IndexOutOfRange`] if an index has no vertex
    pub fn new(
        name: impl Into<String>,
        positions: Vec<Vec3>,
        normals: Vec<Vec3>,
        indices: Vec<u32>,
    ) -> ResourceResult<Self> {
        let mesh = Self {
            name: name.into(),
            positions,
            normals,
            indices,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check the invariants listed on [`MeshData::new`].
    pub fn validate(&self) -> ResourceResult<()> {
        if self.normals.len() != self.positions.len() {
            return Err(ResourceError::NormalCountMismatch {
                positions: self.positions.len(),
                normals: self.normals.len(),
            });
        }
        if self.indices.len() % 3 != 0 {
            return Err(ResourceError::NonTriangleFaces {
                mesh: self.name.clone(),
                detail: format!("{} indices", self.indices.len()),
            });
        }
        let vertex_count = self.vertex_count();
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(ResourceError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }
        Ok(())
    }

    /// Mirror the mesh on the Y axis (positions and normals).
    pub fn flip_y(&mut self) {
        for p in &mut self.positions {
            p.y = -p.y;
        }
        for n in &mut self.normals {
            n.y = -n.y;
        }
    }

    /// Area-weighted vertex normals computed from the faces.
    ///
    /// Used when a source file carries no normals. Vertices that belong to
    /// no face get +Z.
    pub fn face_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
        let mut normals = vec![Vec3::ZERO; positions.len()];
        for face in indices.chunks_exact(3) {
            let [a, b, c] = [face[0], face[1], face[2]].map(|i| i as usize);
            if a >= positions.len() || b >= positions.len() || c >= positions.len() {
                continue;
            }
            let n = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
            normals[a] += n;
            normals[b] += n;
            normals[c] += n;
        }
        normals
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Z))
            .collect()
    }
}

/// A model: an ordered list of meshes.
#[derive(Clone, Debug, Default)]
pub struct ModelData {
    /// Meshes in this model
    pub meshes: Vec<MeshData>,
    /// Axis-aligned bounding box minimum
    pub aabb_min: Vec3,
    /// Axis-aligned bounding box maximum
    pub aabb_max: Vec3,
}

impl ModelData {
    /// Wrap already-built meshes, computing the bounding box.
    pub fn from_meshes(meshes: Vec<MeshData>) -> Self {
        let mut aabb_min = Vec3::splat(f32::MAX);
        let mut aabb_max = Vec3::splat(f32::MIN);
        for p in meshes.iter().flat_map(|m| m.positions.iter()) {
            aabb_min = aabb_min.min(*p);
            aabb_max = aabb_max.max(*p);
        }
        if aabb_min.x > aabb_max.x {
            aabb_min = Vec3::ZERO;
            aabb_max = Vec3::ZERO;
        }
        Self {
            meshes,
            aabb_min,
            aabb_max,
        }
    }

    /// Load a model from a glTF file.
    ///
    /// Every triangle primitive of every mesh becomes one [`MeshData`],
    /// already Y-flipped. A file with no meshes yields an empty model.
    ///
    /// # Arguments
    /// * `path` - Path to the .gltf or .glb file
    ///
    /// # Errors
    /// - [`ResourceError::FileNotFound`] if `path` does not exist
    /// - [`ResourceError::GltfLoad`] if the file cannot be parsed
    /// - [`ResourceError::NonTriangleFaces`] for points/lines/strips/fans
    pub fn load(path: &Path) -> ResourceResult<Self> {
        if !path.exists() {
            return Err(ResourceError::FileNotFound(path.to_path_buf()));
        }

        let (document, buffers, _images) =
            gltf::import(path).map_err(|e| ResourceError::GltfLoad {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let mut meshes = Vec::new();
        for mesh in document.meshes() {
            let mesh_name = mesh.name().unwrap_or("unnamed").to_string();
            for (p, primitive) in mesh.primitives().enumerate() {
                let name = format!("{mesh_name}#{p}");
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    return Err(ResourceError::NonTriangleFaces {
                        mesh: name,
                        detail: format!("{:?} primitive", primitive.mode()),
                    });
                }

                let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
                let positions: Vec<Vec3> = match reader.read_positions() {
                    Some(iter) => iter.map(Vec3::from).collect(),
                    None => {
                        warn!("Skipping primitive {} without positions", name);
                        continue;
                    }
                };
                let indices: Vec<u32> = reader
                    .read_indices()
                    .map(|iter| iter.into_u32().collect())
                    .unwrap_or_else(|| (0..positions.len() as u32).collect());
                let normals: Vec<Vec3> = match reader.read_normals() {
                    Some(iter) => iter.map(Vec3::from).collect(),
                    None => {
                        debug!("Primitive {} has no normals, generating them", name);
                        MeshData::face_normals(&positions, &indices)
                    }
                };

                let mut data = MeshData::new(name, positions, normals, indices)?;
                data.flip_y();
                meshes.push(data);
            }
        }

        if meshes.is_empty() {
            warn!("glTF file '{}' contains no meshes", path.display());
        }

        let model = Self::from_meshes(meshes);
        info!(
            "Loaded '{}': {} meshes, {} triangles",
            path.display(),
            model.meshes.len(),
            model.triangle_count()
        );
        Ok(model)
    }

    /// Total triangle count over all meshes.
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(MeshData::triangle_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> (Vec<Vec3>, Vec<u32>) {
        (
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    #[test]
    fn test_new_valid_mesh() {
        let (positions, indices) = quad();
        let normals = vec![Vec3::Z; 4];
        let mesh = MeshData::new("quad", positions, normals, indices).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_rejects_partial_face() {
        let (positions, _) = quad();
        let err = MeshData::new("bad", positions, vec![Vec3::Z; 4], vec![0, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, ResourceError::NonTriangleFaces { .. }));
    }

    #[test]
    fn test_rejects_index_out_of_range() {
        let (positions, _) = quad();
        let err = MeshData::new("bad", positions, vec![Vec3::Z; 4], vec![0, 1, 9]).unwrap_err();
        assert!(matches!(
            err,
            ResourceError::IndexOutOfRange {
                index: 9,
                vertex_count: 4
            }
        ));
    }

    #[test]
    fn test_rejects_normal_mismatch() {
        let (positions, indices) = quad();
        let err = MeshData::new("bad", positions, vec![Vec3::Z; 3], indices).unwrap_err();
        assert!(matches!(err, ResourceError::NormalCountMismatch { .. }));
    }

    #[test]
    fn test_flip_y() {
        let mut mesh = MeshData::new(
            "tri",
            vec![Vec3::new(1.0, 2.0, 3.0); 3],
            vec![Vec3::Y; 3],
            vec![0, 1, 2],
        )
        .unwrap();
        mesh.flip_y();
        assert_eq!(mesh.positions[0], Vec3::new(1.0, -2.0, 3.0));
        assert_eq!(mesh.normals[0], Vec3::NEG_Y);
    }

    #[test]
    fn test_face_normals_ccw_quad_points_at_viewer() {
        let (positions, indices) = quad();
        let normals = MeshData::face_normals(&positions, &indices);
        for n in normals {
            assert!((n - Vec3::Z).length() < 1e-6, "got {n:?}");
        }
    }

    #[test]
    fn test_model_bounds() {
        let (positions, indices) = quad();
        let mesh = MeshData::new("quad", positions, vec![Vec3::Z; 4], indices).unwrap();
        let model = ModelData::from_meshes(vec![mesh]);
        assert_eq!(model.aabb_min, Vec3::ZERO);
        assert_eq!(model.aabb_max, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(model.triangle_count(), 2);
    }

    #[test]
    fn test_empty_model_bounds() {
        let model = ModelData::from_meshes(Vec::new());
        assert!(model.meshes.is_empty());
        assert_eq!(model.aabb_min, Vec3::ZERO);
        assert_eq!(model.aabb_max, Vec3::ZERO);
    }

    #[test]
    fn test_load_missing_file() {
        let err = ModelData::load(Path::new("no/such/model.glb")).unwrap_err();
        assert!(matches!(err, ResourceError::FileNotFound(_)));
    }
}
