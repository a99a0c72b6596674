//! Procedural meshes.
//!
//! Faces are wound counter-clockwise seen from outside in model space and
//! then Y-flipped like imported meshes, so they render with the same rules.

use glam::Vec3;

use crate::model::MeshData;

/// (normal, u, v) with `u.cross(v) == normal`.
const CUBE_FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Z, Vec3::Y),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::X, Vec3::NEG_Z),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
];

impl MeshData {
    /// Axis-aligned cube centred on the origin with flat face normals.
    pub fn cube(half_extent: f32) -> Self {
        let mut positions = Vec::with_capacity(24);
        let mut normals = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (n, u, v) in CUBE_FACES {
            let base = positions.len() as u32;
            let c = n * half_extent;
            let (u, v) = (u * half_extent, v * half_extent);
            positions.extend([c - u - v, c + u - v, c + u + v, c - u + v]);
            normals.extend([n; 4]);
            indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        let mut mesh = Self {
            name: "cube".to_string(),
            positions,
            normals,
            indices,
        };
        mesh.flip_y();
        mesh
    }

    /// Regular octahedron with vertices at distance `radius` on each axis.
    pub fn octahedron(radius: f32) -> Self {
        let mut positions = Vec::with_capacity(24);
        let mut normals = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(24);

        for sx in [1.0f32, -1.0] {
            for sy in [1.0f32, -1.0] {
                for sz in [1.0f32, -1.0] {
                    let a = Vec3::X * sx * radius;
                    let mut b = Vec3::Y * sy * radius;
                    let mut c = Vec3::Z * sz * radius;
                    let n = Vec3::new(sx, sy, sz).normalize();
                    if (b - a).cross(c - a).dot(n) < 0.0 {
                        std::mem::swap(&mut b, &mut c);
                    }
                    let base = positions.len() as u32;
                    positions.extend([a, b, c]);
                    normals.extend([n; 3]);
                    indices.extend([base, base + 1, base + 2]);
                }
            }
        }

        let mut mesh = Self {
            name: "octahedron".to_string(),
            positions,
            normals,
            indices,
        };
        mesh.flip_y();
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Winding after the flip must be clockwise seen from outside, i.e. the
    /// face normal from the cross product points inwards.
    fn assert_flipped_winding(mesh: &MeshData) {
        for face in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [face[0], face[1], face[2]].map(|i| mesh.positions[i as usize]);
            let stored = mesh.normals[face[0] as usize];
            let geometric = (b - a).cross(c - a);
            assert!(geometric.dot(stored) < 0.0, "face {face:?}");
        }
    }

    #[test]
    fn test_cube_counts() {
        let cube = MeshData::cube(1.0);
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.triangle_count(), 12);
        assert!(cube.validate().is_ok());
    }

    #[test]
    fn test_cube_extent() {
        let cube = MeshData::cube(2.0);
        for p in &cube.positions {
            assert_eq!(p.abs().max_element(), 2.0);
        }
    }

    #[test]
    fn test_cube_winding() {
        assert_flipped_winding(&MeshData::cube(1.0));
    }

    #[test]
    fn test_octahedron_counts() {
        let oct = MeshData::octahedron(1.0);
        assert_eq!(oct.vertex_count(), 24);
        assert_eq!(oct.triangle_count(), 8);
        assert!(oct.validate().is_ok());
    }

    #[test]
    fn test_octahedron_winding() {
        assert_flipped_winding(&MeshData::octahedron(3.0));
    }
}
