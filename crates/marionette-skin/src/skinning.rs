//! The linear-blend skinning transform: pose updates, per-vertex posing,
//! and atomic rig rebinds.

use nalgebra::{Matrix4, Point3, Vector3};

use marionette_core::error::RigError;

use crate::rig::{BlendSlot, Bone, Rig, SkinnedVertex};

/// Payload for an atomic rig rebind.
///
/// All per-slot arrays are vertex-major with `vertex_count * n_blend`
/// entries: slot `k` of vertex `v` lives at `v * n_blend + k`.
#[derive(Debug, Clone)]
pub struct RigUpdate {
    /// Rest position per slot, expressed in that slot's bone rest frame.
    pub rest_positions: Vec<Point3<f32>>,
    /// Bone index per slot.
    pub bone_ids: Vec<usize>,
    /// Weight per slot, applied as given.
    pub weights: Vec<f32>,
    /// One world transform per bone.
    pub bone_transforms: Vec<Matrix4<f32>>,
}

impl Rig {
    /// Replace every bone's world transform, rederiving each normal
    /// transform.
    ///
    /// All-or-nothing: on a count mismatch no bone is touched.
    ///
    /// # Errors
    ///
    /// [`RigError::BoneCountMismatch`] if `transforms.len()` differs from
    /// the rig's bone count.
    pub fn update_bone_pose(&mut self, transforms: &[Matrix4<f32>]) -> Result<(), RigError> {
        if transforms.len() != self.bones.len() {
            return Err(RigError::BoneCountMismatch {
                expected: self.bones.len(),
                got: transforms.len(),
            });
        }
        for (bone, transform) in self.bones.iter_mut().zip(transforms.iter()) {
            bone.set_transform(*transform);
        }
        Ok(())
    }

    /// Pose a single vertex: weighted blend of each slot's bone transform
    /// applied to the slot's rest position, and of each bone's normal
    /// transform applied to the rest normal.
    ///
    /// The blended normal is renormalized to unit length; it is the zero
    /// vector only when the blended sum itself is exactly zero. A single
    /// slot with weight 1 reduces to one rigid transform application.
    ///
    /// # Panics
    ///
    /// Panics if `v >= self.vertex_count()`.
    pub fn skin_vertex(&self, v: usize) -> SkinnedVertex {
        let rest_normal = self.rest_normals[v];
        let mut position = Vector3::zeros();
        let mut normal = Vector3::zeros();
        for slot in self.slots(v) {
            let bone = &self.bones[slot.bone];
            position += bone.transform().transform_point(&slot.rest_pos).coords * slot.weight;
            normal += (bone.normal_transform() * rest_normal) * slot.weight;
        }
        SkinnedVertex {
            position: Point3::from(position),
            normal: normal.try_normalize(0.0).unwrap_or_else(Vector3::zeros),
        }
    }

    /// Pose every vertex. Deterministic and idempotent for a fixed pose.
    pub fn skin_mesh(&self) -> Vec<SkinnedVertex> {
        (0..self.vertex_count()).map(|v| self.skin_vertex(v)).collect()
    }

    /// Atomically rebind the rig: rest positions in local bone frames,
    /// blend-slot bone assignments, weights, and bone transforms together.
    ///
    /// The vertex count and `n_blend` are fixed at construction; every
    /// per-slot array must therefore have `vertex_count * n_blend`
    /// entries, and every bone index must name one of the supplied
    /// transforms. On any mismatch the previous state is left unchanged.
    ///
    /// Parent links survive a rebind that keeps the bone count; a rebind
    /// that changes it supplies a fresh, parentless bone set.
    ///
    /// # Errors
    ///
    /// [`RigError::DimensionMismatch`] naming the offending array.
    pub fn update_rig(&mut self, update: RigUpdate) -> Result<(), RigError> {
        let expected = self.vertex_count() * self.n_blend;
        if update.rest_positions.len() != expected {
            return Err(RigError::DimensionMismatch {
                what: "rest positions",
                expected,
                got: update.rest_positions.len(),
            });
        }
        if update.bone_ids.len() != expected {
            return Err(RigError::DimensionMismatch {
                what: "bone ids",
                expected,
                got: update.bone_ids.len(),
            });
        }
        if update.weights.len() != expected {
            return Err(RigError::DimensionMismatch {
                what: "weights",
                expected,
                got: update.weights.len(),
            });
        }
        if let Some(&bad) = update
            .bone_ids
            .iter()
            .find(|&&id| id >= update.bone_transforms.len())
        {
            return Err(RigError::DimensionMismatch {
                what: "bone index",
                expected: update.bone_transforms.len(),
                got: bad,
            });
        }

        // Validation done; commit.
        let bones: Vec<Bone> = if update.bone_transforms.len() == self.bones.len() {
            self.bones
                .iter()
                .zip(update.bone_transforms.iter())
                .map(|(old, &transform)| match old.parent() {
                    Some(parent) => Bone::with_parent(transform, parent),
                    None => Bone::new(transform),
                })
                .collect()
        } else {
            update
                .bone_transforms
                .iter()
                .map(|&transform| Bone::new(transform))
                .collect()
        };

        self.slots = update
            .rest_positions
            .iter()
            .zip(update.bone_ids.iter())
            .zip(update.weights.iter())
            .map(|((&rest_pos, &bone), &weight)| BlendSlot {
                bone,
                weight,
                rest_pos,
            })
            .collect();
        self.bones = bones;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
