//! Transform component for scene objects.
//!
//! This module provides the [`Transform`] struct for representing position,
//! rotation, and scale of scene objects, and the [`TransformTree`] arena that
//! owns every transform in a scene. Hierarchies are expressed with
//! non-owning parent keys into the arena.
//!
//! # Example
//!
//! ```
//! use softscene_scene::{Transform, TransformTree};
//! use glam::Vec3;
//!
//! let mut tree = TransformTree::new();
//! let parent = tree.insert(Transform::new().with_position(Vec3::new(1.0, 0.0, 0.0)));
//! let child = tree.insert(Transform::new().with_position(Vec3::new(0.0, 1.0, 0.0)));
//! tree.set_parent(child, Some(parent)).unwrap();
//!
//! // The world position of the child is (1.0, 1.0, 0.0)
//! let world = tree.world_matrix(child).unwrap();
//! assert!((world.transform_point3(Vec3::ZERO) - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-5);
//! ```

use glam::{Mat4, Vec3};
use slotmap::{SlotMap, new_key_type};

use crate::error::{SceneError, SceneResult};

new_key_type! {
    /// Key of a [`Transform`] inside a [`TransformTree`].
    pub struct TransformId;
}

/// Longest ancestor chain `world_matrix` will follow.
pub const MAX_HIERARCHY_DEPTH: usize = 64;

/// Position, rotation, and scale of a node, relative to its parent if any.
#[derive(Clone, Debug, PartialEq)]
pub struct Transform {
    position: Vec3,
    /// Euler angles in radians, applied X then Y then Z.
    rotation: Vec3,
    scale: Vec3,
    parent: Option<TransformId>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            parent: None,
        }
    }
}

impl Transform {
    /// Create a new transform at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transform with the given position.
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Create a transform with the given Euler rotation (radians).
    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Create a transform with the given scale.
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Replace the position.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Replace the Euler rotation (radians).
    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
    }

    /// Replace the scale.
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    /// Multiply the current scale by a uniform factor.
    ///
    /// Unlike the other setters this does not replace the value: calling
    /// `scale_by(0.5)` twice leaves the transform at a quarter of its size.
    pub fn scale_by(&mut self, factor: f32) {
        self.scale *= factor;
    }

    /// The parent key, if any. Only [`TransformTree::set_parent`] changes it.
    pub fn parent(&self) -> Option<TransformId> {
        self.parent
    }

    /// Check if this transform has a parent.
    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    /// Get the local transformation matrix.
    ///
    /// `translate × scale × rotate_x × rotate_y × rotate_z`, not accounting
    /// for any parent transforms.
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_scale(self.scale)
            * Mat4::from_rotation_x(self.rotation.x)
            * Mat4::from_rotation_y(self.rotation.y)
            * Mat4::from_rotation_z(self.rotation.z)
    }
}

/// Arena owning every transform of a scene.
#[derive(Debug, Default)]
pub struct TransformTree {
    transforms: SlotMap<TransformId, Transform>,
}

impl TransformTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a transform and return its key.
    ///
    /// Any parent set on `transform` is discarded; use [`set_parent`](Self::set_parent).
    pub fn insert(&mut self, mut transform: Transform) -> TransformId {
        transform.parent = None;
        self.transforms.insert(transform)
    }

    /// Remove a transform. Its children become roots.
    pub fn remove(&mut self, id: TransformId) -> Option<Transform> {
        let removed = self.transforms.remove(id)?;
        for (_, t) in self.transforms.iter_mut() {
            if t.parent == Some(id) {
                t.parent = None;
            }
        }
        Some(removed)
    }

    pub fn get(&self, id: TransformId) -> Option<&Transform> {
        self.transforms.get(id)
    }

    pub fn get_mut(&mut self, id: TransformId) -> Option<&mut Transform> {
        self.transforms.get_mut(id)
    }

    pub fn contains(&self, id: TransformId) -> bool {
        self.transforms.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Rewire the parent link of `child`.
    ///
    /// Only the back-reference changes; the child's local values are kept,
    /// so its world placement moves with the new parent.
    ///
    /// # Errors
    /// - [`SceneError::UnknownNode`] if either key is not in the tree
    /// - [`SceneError::CyclicHierarchy`] if `child` is `parent` or one of its ancestors
    /// - [`SceneError::HierarchyTooDeep`] if `child` or one of its descendants
    ///   would end up with more than [`MAX_HIERARCHY_DEPTH`] ancestors
    pub fn set_parent(&mut self, child: TransformId, parent: Option<TransformId>) -> SceneResult<()> {
        if !self.contains(child) {
            return Err(SceneError::UnknownNode(format!("{child:?}")));
        }
        if let Some(parent) = parent {
            if !self.contains(parent) {
                return Err(SceneError::UnknownNode(format!("{parent:?}")));
            }
            // Ancestors `child` would have after the link.
            let mut ancestors = 0;
            let mut cursor = Some(parent);
            while let Some(id) = cursor {
                if id == child {
                    return Err(SceneError::CyclicHierarchy(child));
                }
                ancestors += 1;
                if ancestors > MAX_HIERARCHY_DEPTH {
                    break;
                }
                cursor = self.transforms.get(id).and_then(|t| t.parent);
            }
            if ancestors + self.height_below(child) > MAX_HIERARCHY_DEPTH {
                return Err(SceneError::HierarchyTooDeep {
                    id: child,
                    limit: MAX_HIERARCHY_DEPTH,
                });
            }
        }
        if let Some(t) = self.transforms.get_mut(child) {
            t.parent = parent;
        }
        Ok(())
    }

    /// Longest parent chain from any descendant up to `root`, 0 for a leaf.
    fn height_below(&self, root: TransformId) -> usize {
        self.transforms
            .keys()
            .filter_map(|id| {
                let mut cursor = Some(id);
                let mut steps = 0;
                while let Some(current) = cursor {
                    if current == root {
                        return Some(steps);
                    }
                    if steps > MAX_HIERARCHY_DEPTH {
                        return None;
                    }
                    cursor = self.transforms.get(current).and_then(|t| t.parent);
                    steps += 1;
                }
                None
            })
            .max()
            .unwrap_or(0)
    }

    /// Get the world transformation matrix.
    ///
    /// `parent.world × local`, walking the whole ancestor chain on every
    /// call. Nothing is cached.
    ///
    /// # Errors
    /// - [`SceneError::UnknownNode`] if `id` or an ancestor is missing
    /// - [`SceneError::HierarchyTooDeep`] if the chain exceeds [`MAX_HIERARCHY_DEPTH`]
    pub fn world_matrix(&self, id: TransformId) -> SceneResult<Mat4> {
        let transform = self
            .transforms
            .get(id)
            .ok_or_else(|| SceneError::UnknownNode(format!("{id:?}")))?;

        let mut world = transform.local_matrix();
        let mut cursor = transform.parent;
        let mut depth = 0;
        while let Some(parent_id) = cursor {
            depth += 1;
            if depth > MAX_HIERARCHY_DEPTH {
                return Err(SceneError::HierarchyTooDeep {
                    id,
                    limit: MAX_HIERARCHY_DEPTH,
                });
            }
            let parent = self
                .transforms
                .get(parent_id)
                .ok_or_else(|| SceneError::UnknownNode(format!("{parent_id:?}")))?;
            world = parent.local_matrix() * world;
            cursor = parent.parent;
        }
        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn approx_eq_vec3(a: Vec3, b: Vec3) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
    }

    fn approx_eq_mat4(a: Mat4, b: Mat4) -> bool {
        a.to_cols_array()
            .iter()
            .zip(b.to_cols_array().iter())
            .all(|(x, y)| (x - y).abs() < 1e-3)
    }

    fn world_pos(tree: &TransformTree, id: TransformId) -> Vec3 {
        tree.world_matrix(id).unwrap().transform_point3(Vec3::ZERO)
    }

    #[test]
    fn test_transform_default() {
        let t = Transform::default();
        assert_eq!(t.position(), Vec3::ZERO);
        assert_eq!(t.rotation(), Vec3::ZERO);
        assert_eq!(t.scale(), Vec3::ONE);
        assert!(!t.has_parent());
        assert_eq!(t.local_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_transform_builder() {
        let t = Transform::new()
            .with_position(Vec3::new(1.0, 2.0, 3.0))
            .with_scale(Vec3::splat(2.0));

        assert_eq!(t.position(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.scale(), Vec3::splat(2.0));
    }

    #[test]
    fn test_setters_replace() {
        let mut t = Transform::new().with_position(Vec3::ONE);
        t.set_position(Vec3::new(0.0, 5.0, 0.0));
        t.set_scale(Vec3::splat(3.0));
        t.set_scale(Vec3::splat(2.0));
        assert_eq!(t.position(), Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(t.scale(), Vec3::splat(2.0));
    }

    #[test]
    fn test_scale_by_multiplies() {
        let mut t = Transform::new().with_scale(Vec3::new(2.0, 4.0, 8.0));
        t.scale_by(0.5);
        t.scale_by(0.5);
        assert_eq!(t.scale(), Vec3::new(0.5, 1.0, 2.0));
    }

    #[test]
    fn test_local_matrix_order() {
        // Scale applies before translation.
        let t = Transform::new()
            .with_position(Vec3::new(10.0, 0.0, 0.0))
            .with_scale(Vec3::splat(2.0));
        let p = t.local_matrix().transform_point3(Vec3::X);
        assert!(approx_eq_vec3(p, Vec3::new(12.0, 0.0, 0.0)), "got {:?}", p);
    }

    #[test]
    fn test_local_matrix_rotation_z_applies_first() {
        // rotate_z then rotate_x: X -> Y -> Z
        let t = Transform::new().with_rotation(Vec3::new(
            std::f32::consts::FRAC_PI_2,
            0.0,
            std::f32::consts::FRAC_PI_2,
        ));
        let p = t.local_matrix().transform_vector3(Vec3::X);
        assert!(approx_eq_vec3(p, Vec3::Z), "got {:?}", p);
    }

    // Hierarchical transform tests

    #[test]
    fn test_set_parent() {
        let mut tree = TransformTree::new();
        let parent = tree.insert(Transform::new().with_position(Vec3::new(1.0, 0.0, 0.0)));
        let child = tree.insert(Transform::new().with_position(Vec3::new(0.0, 2.0, 0.0)));

        assert!(!tree.get(child).unwrap().has_parent());
        tree.set_parent(child, Some(parent)).unwrap();
        assert_eq!(tree.get(child).unwrap().parent(), Some(parent));
    }

    #[test]
    fn test_clear_parent() {
        let mut tree = TransformTree::new();
        let parent = tree.insert(Transform::new());
        let child = tree.insert(Transform::new());
        tree.set_parent(child, Some(parent)).unwrap();

        tree.set_parent(child, None).unwrap();
        assert!(!tree.get(child).unwrap().has_parent());
    }

    #[test]
    fn test_world_matrix_without_parent() {
        let mut tree = TransformTree::new();
        let t = Transform::new()
            .with_position(Vec3::new(1.0, 2.0, 3.0))
            .with_scale(Vec3::splat(2.0));
        let local = t.local_matrix();
        let id = tree.insert(t);

        // Without parent, world matrix equals local matrix
        assert_eq!(tree.world_matrix(id).unwrap(), local);
    }

    #[test]
    fn test_world_matrix_with_parent_translation() {
        let mut tree = TransformTree::new();
        let parent = tree.insert(Transform::new().with_position(Vec3::new(10.0, 0.0, 0.0)));
        let child = tree.insert(Transform::new().with_position(Vec3::new(0.0, 5.0, 0.0)));
        tree.set_parent(child, Some(parent)).unwrap();

        let p = world_pos(&tree, child);
        assert!(
            approx_eq_vec3(p, Vec3::new(10.0, 5.0, 0.0)),
            "Expected (10, 5, 0), got {:?}",
            p
        );
    }

    #[test]
    fn test_world_matrix_with_parent_scale() {
        let mut tree = TransformTree::new();
        let parent = tree.insert(Transform::new().with_scale(Vec3::splat(2.0)));
        let child = tree.insert(Transform::new().with_position(Vec3::new(1.0, 0.0, 0.0)));
        tree.set_parent(child, Some(parent)).unwrap();

        let p = world_pos(&tree, child);
        assert!(
            approx_eq_vec3(p, Vec3::new(2.0, 0.0, 0.0)),
            "Expected (2, 0, 0), got {:?}",
            p
        );
    }

    #[test]
    fn test_world_matrix_with_parent_rotation() {
        // Parent rotated 90 degrees around Y axis
        let mut tree = TransformTree::new();
        let parent = tree.insert(
            Transform::new().with_rotation(Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0)),
        );
        let child = tree.insert(Transform::new().with_position(Vec3::new(1.0, 0.0, 0.0)));
        tree.set_parent(child, Some(parent)).unwrap();

        let p = world_pos(&tree, child);
        assert!(
            approx_eq_vec3(p, Vec3::new(0.0, 0.0, -1.0)),
            "Expected (0, 0, -1), got {:?}",
            p
        );
    }

    #[test]
    fn test_world_matrix_nested_hierarchy() {
        let mut tree = TransformTree::new();
        let grandparent = tree.insert(Transform::new().with_position(Vec3::new(100.0, 0.0, 0.0)));
        let parent = tree.insert(Transform::new().with_position(Vec3::new(10.0, 0.0, 0.0)));
        let child = tree.insert(Transform::new().with_position(Vec3::new(1.0, 0.0, 0.0)));
        tree.set_parent(parent, Some(grandparent)).unwrap();
        tree.set_parent(child, Some(parent)).unwrap();

        let p = world_pos(&tree, child);
        assert!(
            approx_eq_vec3(p, Vec3::new(111.0, 0.0, 0.0)),
            "Expected (111, 0, 0), got {:?}",
            p
        );
    }

    #[test]
    fn test_world_matrix_is_product_of_locals() {
        let mut tree = TransformTree::new();
        let locals = [
            Transform::new()
                .with_position(Vec3::new(1.0, -2.0, 3.0))
                .with_rotation(Vec3::new(0.3, 0.0, 0.0)),
            Transform::new()
                .with_scale(Vec3::new(2.0, 1.0, 0.5))
                .with_rotation(Vec3::new(0.0, 1.1, 0.0)),
            Transform::new()
                .with_position(Vec3::new(0.0, 4.0, 0.0))
                .with_rotation(Vec3::new(0.0, 0.0, -0.7)),
            Transform::new().with_position(Vec3::new(-1.0, 0.0, 2.0)),
        ];
        let mut expected = Mat4::IDENTITY;
        let mut previous = None;
        let mut leaf = None;
        for t in locals {
            expected *= t.local_matrix();
            let id = tree.insert(t);
            tree.set_parent(id, previous).unwrap();
            previous = Some(id);
            leaf = Some(id);
        }

        let world = tree.world_matrix(leaf.unwrap()).unwrap();
        assert!(approx_eq_mat4(world, expected), "{world:?} != {expected:?}");
    }

    #[test]
    fn test_changing_leaf_does_not_touch_ancestors() {
        let mut tree = TransformTree::new();
        let root = tree.insert(Transform::new().with_position(Vec3::new(5.0, 0.0, 0.0)));
        let leaf = tree.insert(Transform::new());
        tree.set_parent(leaf, Some(root)).unwrap();

        let root_before = tree.world_matrix(root).unwrap();
        let leaf_before = tree.world_matrix(leaf).unwrap();

        tree.get_mut(leaf).unwrap().set_position(Vec3::new(0.0, 1.0, 0.0));

        assert_eq!(tree.world_matrix(root).unwrap(), root_before);
        assert_ne!(tree.world_matrix(leaf).unwrap(), leaf_before);
    }

    #[test]
    fn test_set_parent_rejects_cycle() {
        let mut tree = TransformTree::new();
        let a = tree.insert(Transform::new());
        let b = tree.insert(Transform::new());
        let c = tree.insert(Transform::new());
        tree.set_parent(b, Some(a)).unwrap();
        tree.set_parent(c, Some(b)).unwrap();

        let err = tree.set_parent(a, Some(c)).unwrap_err();
        assert!(matches!(err, SceneError::CyclicHierarchy(id) if id == a));
        assert!(matches!(
            tree.set_parent(a, Some(a)),
            Err(SceneError::CyclicHierarchy(_))
        ));
        // The refused link left the tree intact.
        assert!(tree.world_matrix(c).is_ok());
    }

    /// Insert `len` transforms, each parented to the one before it.
    fn chain(tree: &mut TransformTree, len: usize) -> Vec<TransformId> {
        let mut ids: Vec<TransformId> = Vec::with_capacity(len);
        for _ in 0..len {
            let id = tree.insert(Transform::new().with_position(Vec3::X));
            if let Some(&last) = ids.last() {
                tree.set_parent(id, Some(last)).unwrap();
            }
            ids.push(id);
        }
        ids
    }

    #[test]
    fn test_chain_at_depth_limit() {
        let mut tree = TransformTree::new();
        let ids = chain(&mut tree, MAX_HIERARCHY_DEPTH + 1);
        let leaf = *ids.last().unwrap();

        let world = tree.world_matrix(leaf).unwrap();
        let expected = (MAX_HIERARCHY_DEPTH + 1) as f32;
        assert!(approx_eq(world.transform_point3(Vec3::ZERO).x, expected));
    }

    #[test]
    fn test_set_parent_rejects_chain_past_limit() {
        let mut tree = TransformTree::new();
        let ids = chain(&mut tree, MAX_HIERARCHY_DEPTH + 1);
        let leaf = *ids.last().unwrap();
        let extra = tree.insert(Transform::new());

        let err = tree.set_parent(extra, Some(leaf)).unwrap_err();
        assert!(matches!(
            err,
            SceneError::HierarchyTooDeep { id, limit } if id == extra && limit == MAX_HIERARCHY_DEPTH
        ));
        assert!(!tree.get(extra).unwrap().has_parent());
    }

    #[test]
    fn test_set_parent_counts_descendants() {
        let mut tree = TransformTree::new();
        let upper = chain(&mut tree, 40);
        let lower = chain(&mut tree, 40);

        // Hanging the lower chain under the upper leaf would put its own
        // leaf 79 levels deep.
        let err = tree.set_parent(lower[0], Some(upper[39])).unwrap_err();
        assert!(matches!(err, SceneError::HierarchyTooDeep { .. }));
        assert!(tree.world_matrix(lower[39]).is_ok());

        tree.set_parent(lower[0], Some(upper[20])).unwrap();
        assert!(tree.world_matrix(lower[39]).is_ok());
    }

    #[test]
    fn test_unknown_keys() {
        let mut tree = TransformTree::new();
        let a = tree.insert(Transform::new());
        let gone = tree.insert(Transform::new());
        tree.remove(gone);

        assert!(tree.get(gone).is_none());
        assert!(matches!(
            tree.world_matrix(gone),
            Err(SceneError::UnknownNode(_))
        ));
        assert!(matches!(
            tree.set_parent(a, Some(gone)),
            Err(SceneError::UnknownNode(_))
        ));
    }

    #[test]
    fn test_remove_orphans_children() {
        let mut tree = TransformTree::new();
        let parent = tree.insert(Transform::new().with_position(Vec3::X));
        let child = tree.insert(Transform::new());
        tree.set_parent(child, Some(parent)).unwrap();

        tree.remove(parent);
        assert!(!tree.get(child).unwrap().has_parent());
        assert_eq!(world_pos(&tree, child), Vec3::ZERO);
    }

    #[test]
    fn test_insert_ignores_stale_parent() {
        let mut tree = TransformTree::new();
        let parent = tree.insert(Transform::new());
        let child = tree.insert(Transform::new());
        tree.set_parent(child, Some(parent)).unwrap();

        let copy = tree.get(child).unwrap().clone();
        let id = tree.insert(copy);
        assert!(!tree.get(id).unwrap().has_parent());
    }
}
