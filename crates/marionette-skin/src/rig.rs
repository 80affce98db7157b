//! Rig data: bones with cached normal transforms and per-vertex blend
//! slots.
//!
//! Slot storage is a flat vertex-major arena sized once at construction:
//! vertex `v` owns `slots[v * n_blend .. (v + 1) * n_blend]`. Bones are
//! referenced by index only; the rig owns them.

use log::warn;
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

use marionette_core::error::RigError;

/// Inverse-transpose of the upper-left 3x3 of `transform`.
///
/// Applied to normals instead of the transform itself so a non-uniform
/// scale does not distort them. A singular linear part falls back to
/// identity.
fn normal_transform_of(transform: &Matrix4<f32>) -> Matrix3<f32> {
    let linear: Matrix3<f32> = transform.fixed_view::<3, 3>(0, 0).into_owned();
    match linear.try_inverse() {
        Some(inverse) => inverse.transpose(),
        None => {
            warn!("skin: singular bone transform, using identity normal transform");
            Matrix3::identity()
        }
    }
}

// ---------------------------------------------------------------------------
// Bone
// ---------------------------------------------------------------------------

/// A bone: a world-space rigid transform plus its derived normal
/// transform, and optionally a parent bone index.
///
/// The normal transform is recomputed on every transform change and is
/// never stale.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    transform: Matrix4<f32>,
    normal_transform: Matrix3<f32>,
    parent: Option<usize>,
}

impl Bone {
    /// Create a root bone with the given world transform.
    pub fn new(transform: Matrix4<f32>) -> Self {
        Self {
            normal_transform: normal_transform_of(&transform),
            transform,
            parent: None,
        }
    }

    /// Create a bone parented to `parent`.
    pub fn with_parent(transform: Matrix4<f32>, parent: usize) -> Self {
        Self {
            parent: Some(parent),
            ..Self::new(transform)
        }
    }

    /// Replace the transform, rederiving the normal transform.
    pub fn set_transform(&mut self, transform: Matrix4<f32>) {
        self.normal_transform = normal_transform_of(&transform);
        self.transform = transform;
    }

    /// The world-space transform.
    pub fn transform(&self) -> &Matrix4<f32> {
        &self.transform
    }

    /// The cached inverse-transpose normal transform.
    pub fn normal_transform(&self) -> &Matrix3<f32> {
        &self.normal_transform
    }

    /// Parent bone index, if any.
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }
}

// ---------------------------------------------------------------------------
// Blend slots and skinned output
// ---------------------------------------------------------------------------

/// One blend contribution: a bone index, a weight, and the vertex's rest
/// position expressed in that bone's rest frame.
///
/// Weights are applied exactly as given; whether they sum to 1 is the rig
/// constructor's concern, not the skinning transform's.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendSlot {
    pub bone: usize,
    pub weight: f32,
    pub rest_pos: Point3<f32>,
}

/// A posed vertex produced by the skinning transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkinnedVertex {
    /// World-space position (affine: translation included).
    pub position: Point3<f32>,
    /// Unit world-space normal, or zero if the blended sum was exactly
    /// zero.
    pub normal: Vector3<f32>,
}

// ---------------------------------------------------------------------------
// Rig
// ---------------------------------------------------------------------------

/// A bone hierarchy plus the per-vertex blend assignments binding a mesh
/// to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Rig {
    pub(crate) bones: Vec<Bone>,
    pub(crate) slots: Vec<BlendSlot>,
    pub(crate) rest_normals: Vec<Vector3<f32>>,
    pub(crate) n_blend: usize,
}

impl Rig {
    /// Bind a rest mesh to a single identity bone with weight 1.
    ///
    /// This is the load-time state before any animation: skinning a fresh
    /// rest bind reproduces the input positions and normals exactly.
    ///
    /// # Errors
    ///
    /// [`RigError::DimensionMismatch`] if `positions` and `normals`
    /// disagree in length.
    pub fn bind_rest(
        positions: &[Point3<f32>],
        normals: &[Vector3<f32>],
    ) -> Result<Self, RigError> {
        if normals.len() != positions.len() {
            return Err(RigError::DimensionMismatch {
                what: "rest normals",
                expected: positions.len(),
                got: normals.len(),
            });
        }
        let slots = positions
            .iter()
            .map(|&rest_pos| BlendSlot {
                bone: 0,
                weight: 1.0,
                rest_pos,
            })
            .collect();
        Ok(Self {
            bones: vec![Bone::new(Matrix4::identity())],
            slots,
            rest_normals: normals.to_vec(),
            n_blend: 1,
        })
    }

    /// Assemble a rig from parts, validating every dimension.
    ///
    /// `slots` is vertex-major with exactly `n_blend` entries per vertex.
    ///
    /// # Errors
    ///
    /// [`RigError::DimensionMismatch`] if `n_blend` is zero, the slot
    /// count is not `rest_normals.len() * n_blend`, or any slot names a
    /// bone index outside `bones`.
    pub fn from_parts(
        bones: Vec<Bone>,
        slots: Vec<BlendSlot>,
        rest_normals: Vec<Vector3<f32>>,
        n_blend: usize,
    ) -> Result<Self, RigError> {
        if n_blend == 0 {
            return Err(RigError::DimensionMismatch {
                what: "n_blend",
                expected: 1,
                got: 0,
            });
        }
        let expected = rest_normals.len() * n_blend;
        if slots.len() != expected {
            return Err(RigError::DimensionMismatch {
                what: "blend slots",
                expected,
                got: slots.len(),
            });
        }
        if let Some(slot) = slots.iter().find(|s| s.bone >= bones.len()) {
            return Err(RigError::DimensionMismatch {
                what: "bone index",
                expected: bones.len(),
                got: slot.bone,
            });
        }
        Ok(Self {
            bones,
            slots,
            rest_normals,
            n_blend,
        })
    }

    /// Number of bones.
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.rest_normals.len()
    }

    /// Blend slots per vertex.
    pub fn n_blend(&self) -> usize {
        self.n_blend
    }

    /// The bones, indexable by [`BlendSlot::bone`].
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// Rest-pose normals, one per vertex.
    pub fn rest_normals(&self) -> &[Vector3<f32>] {
        &self.rest_normals
    }

    /// The blend slots of vertex `v`.
    ///
    /// # Panics
    ///
    /// Panics if `v >= self.vertex_count()`.
    pub fn slots(&self, v: usize) -> &[BlendSlot] {
        assert!(v < self.vertex_count(), "vertex index out of range");
        &self.slots[v * self.n_blend..(v + 1) * self.n_blend]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f32, y: f32, z: f32) -> Point3<f32> {
        Point3::new(x, y, z)
    }

    #[test]
    fn bone_new_identity_has_identity_normal_transform() {
        let bone = Bone::new(Matrix4::identity());
        assert_eq!(*bone.normal_transform(), Matrix3::identity());
        assert!(bone.parent().is_none());
    }

    #[test]
    fn bone_normal_transform_tracks_set_transform() {
        let mut bone = Bone::new(Matrix4::identity());
        // Non-uniform scale: normals must pick up the inverse scale.
        bone.set_transform(Matrix4::new_nonuniform_scaling(&Vector3::new(2.0, 1.0, 1.0)));
        assert_relative_eq!(bone.normal_transform()[(0, 0)], 0.5, epsilon = 1e-6);
        assert_relative_eq!(bone.normal_transform()[(1, 1)], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn bone_singular_transform_falls_back_to_identity() {
        let bone = Bone::new(Matrix4::new_nonuniform_scaling(&Vector3::new(
            0.0, 1.0, 1.0,
        )));
        assert_eq!(*bone.normal_transform(), Matrix3::identity());
    }

    #[test]
    fn bone_translation_does_not_affect_normal_transform() {
        let bone = Bone::new(Matrix4::new_translation(&Vector3::new(5.0, -2.0, 3.0)));
        assert_eq!(*bone.normal_transform(), Matrix3::identity());
    }

    #[test]
    fn bone_with_parent() {
        let bone = Bone::with_parent(Matrix4::identity(), 3);
        assert_eq!(bone.parent(), Some(3));
    }

    #[test]
    fn bind_rest_is_single_identity_bone() {
        let rig = Rig::bind_rest(
            &[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)],
            &[Vector3::z(), Vector3::z()],
        )
        .unwrap();
        assert_eq!(rig.bone_count(), 1);
        assert_eq!(rig.vertex_count(), 2);
        assert_eq!(rig.n_blend(), 1);
        assert_eq!(rig.slots(1)[0].bone, 0);
        assert!((rig.slots(1)[0].weight - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn bind_rest_rejects_mismatched_normals() {
        let err = Rig::bind_rest(&[p(0.0, 0.0, 0.0)], &[]).unwrap_err();
        assert_eq!(
            err,
            RigError::DimensionMismatch {
                what: "rest normals",
                expected: 1,
                got: 0
            }
        );
    }

    #[test]
    fn from_parts_rejects_bad_slot_count() {
        let bones = vec![Bone::new(Matrix4::identity())];
        let err = Rig::from_parts(bones, vec![], vec![Vector3::z()], 2).unwrap_err();
        assert_eq!(
            err,
            RigError::DimensionMismatch {
                what: "blend slots",
                expected: 2,
                got: 0
            }
        );
    }

    #[test]
    fn from_parts_rejects_out_of_range_bone() {
        let bones = vec![Bone::new(Matrix4::identity())];
        let slots = vec![BlendSlot {
            bone: 1,
            weight: 1.0,
            rest_pos: p(0.0, 0.0, 0.0),
        }];
        let err = Rig::from_parts(bones, slots, vec![Vector3::z()], 1).unwrap_err();
        assert_eq!(
            err,
            RigError::DimensionMismatch {
                what: "bone index",
                expected: 1,
                got: 1
            }
        );
    }

    #[test]
    fn from_parts_rejects_zero_n_blend() {
        let err = Rig::from_parts(vec![], vec![], vec![], 0).unwrap_err();
        assert!(matches!(
            err,
            RigError::DimensionMismatch { what: "n_blend", .. }
        ));
    }

    #[test]
    #[should_panic(expected = "vertex index out of range")]
    fn slots_out_of_range_panics() {
        let rig = Rig::bind_rest(&[p(0.0, 0.0, 0.0)], &[Vector3::z()]).unwrap();
        let _ = rig.slots(1);
    }
}
