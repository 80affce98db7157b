//! Rig construction from exported skeleton data.
//!
//! A DCC armature export supplies joints (world rest position, optional
//! parent) and a sparse weight list per vertex. Binding selects the
//! strongest influences per vertex, expresses each vertex in its bones'
//! rest frames, and seeds bone transforms with the rest translations so
//! the freshly bound rig reproduces the rest mesh exactly.

use nalgebra::{Matrix4, Point3, Vector3};

use marionette_core::error::RigError;

use crate::rig::{BlendSlot, Bone, Rig};

/// A skeleton joint used for binding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BindJoint {
    /// World-space rest position (the bone's frame origin).
    pub rest_pos: Point3<f32>,
    /// Parent joint index, if any.
    pub parent: Option<usize>,
}

impl BindJoint {
    /// A root joint at `rest_pos`.
    pub fn root(rest_pos: Point3<f32>) -> Self {
        Self {
            rest_pos,
            parent: None,
        }
    }

    /// A joint at `rest_pos` parented to `parent`.
    pub fn child(rest_pos: Point3<f32>, parent: usize) -> Self {
        Self {
            rest_pos,
            parent: Some(parent),
        }
    }
}

/// Bind a rest mesh to a skeleton with up to `n_blend` bone influences
/// per vertex.
///
/// For each vertex the `n_blend` largest weights are kept and
/// renormalized to sum to 1. The skinning transform applies weights as
/// given, so normalization is this constructor's job. A vertex with no
/// weights at all binds fully to joint 0; a vertex with fewer than
/// `n_blend` weights pads the remaining slots with zero weight.
///
/// # Errors
///
/// [`RigError::DimensionMismatch`] if the skeleton is empty, the
/// per-vertex arrays disagree in length, `n_blend` is zero, or a weight
/// names a joint outside the skeleton.
pub fn bind_skeleton(
    joints: &[BindJoint],
    vertex_weights: &[Vec<(usize, f32)>],
    rest_positions: &[Point3<f32>],
    rest_normals: &[Vector3<f32>],
    n_blend: usize,
) -> Result<Rig, RigError> {
    if joints.is_empty() {
        return Err(RigError::DimensionMismatch {
            what: "joints",
            expected: 1,
            got: 0,
        });
    }
    if vertex_weights.len() != rest_positions.len() {
        return Err(RigError::DimensionMismatch {
            what: "vertex weights",
            expected: rest_positions.len(),
            got: vertex_weights.len(),
        });
    }
    if rest_normals.len() != rest_positions.len() {
        return Err(RigError::DimensionMismatch {
            what: "rest normals",
            expected: rest_positions.len(),
            got: rest_normals.len(),
        });
    }
    if let Some(&(bone, _)) = vertex_weights
        .iter()
        .flatten()
        .find(|&&(bone, _)| bone >= joints.len())
    {
        return Err(RigError::DimensionMismatch {
            what: "bone index",
            expected: joints.len(),
            got: bone,
        });
    }

    let mut slots = Vec::with_capacity(rest_positions.len() * n_blend);
    for (weights, &world_pos) in vertex_weights.iter().zip(rest_positions.iter()) {
        let mut picked = weights.clone();
        picked.sort_by(|a, b| b.1.total_cmp(&a.1));
        picked.truncate(n_blend);
        if picked.is_empty() {
            picked.push((0, 1.0));
        }

        let total: f32 = picked.iter().map(|(_, w)| w).sum();
        while picked.len() < n_blend {
            // Pad with zero-weight copies of the strongest influence.
            picked.push((picked[0].0, 0.0));
        }

        for (bone, weight) in picked {
            let weight = if total > 0.0 { weight / total } else { weight };
            slots.push(BlendSlot {
                bone,
                weight,
                rest_pos: Point3::from(world_pos - joints[bone].rest_pos),
            });
        }
    }

    let bones = joints
        .iter()
        .map(|joint| {
            let transform = Matrix4::new_translation(&joint.rest_pos.coords);
            match joint.parent {
                Some(parent) => Bone::with_parent(transform, parent),
                None => Bone::new(transform),
            }
        })
        .collect();

    Rig::from_parts(bones, slots, rest_normals.to_vec(), n_blend)
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

    fn two_joint_skeleton() -> Vec<BindJoint> {
        vec![
            BindJoint::root(p(0.0, 0.0, 0.0)),
            BindJoint::child(p(2.0, 0.0, 0.0), 0),
        ]
    }

    #[test]
    fn bound_rig_reproduces_rest_mesh() {
        let joints = two_joint_skeleton();
        let rest_positions = vec![p(0.5, 0.0, 0.0), p(1.5, 0.5, 0.0), p(2.5, 0.0, 0.0)];
        let rest_normals = vec![Vector3::y(); 3];
        let weights = vec![
            vec![(0, 1.0)],
            vec![(0, 0.5), (1, 0.5)],
            vec![(1, 1.0)],
        ];

        let rig = bind_skeleton(&joints, &weights, &rest_positions, &rest_normals, 2).unwrap();
        assert_eq!(rig.bone_count(), 2);
        assert_eq!(rig.n_blend(), 2);

        let out = rig.skin_mesh();
        for (v, &rest) in rest_positions.iter().enumerate() {
            assert_relative_eq!(out[v].position.x, rest.x, epsilon = 1e-6);
            assert_relative_eq!(out[v].position.y, rest.y, epsilon = 1e-6);
            assert_relative_eq!(out[v].normal.y, 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn keeps_strongest_influences_and_renormalizes() {
        let joints = vec![
            BindJoint::root(p(0.0, 0.0, 0.0)),
            BindJoint::child(p(1.0, 0.0, 0.0), 0),
            BindJoint::child(p(2.0, 0.0, 0.0), 1),
        ];
        // Three influences but n_blend = 2: the 0.1 tail is dropped and
        // the kept 0.6/0.3 renormalize over the full 1.0 sum.
        let weights = vec![vec![(0, 0.6), (1, 0.3), (2, 0.1)]];

        let rig = bind_skeleton(
            &joints,
            &weights,
            &[p(0.0, 0.0, 0.0)],
            &[Vector3::z()],
            2,
        )
        .unwrap();

        let slots = rig.slots(0);
        assert_eq!(slots[0].bone, 0);
        assert_eq!(slots[1].bone, 1);
        assert_relative_eq!(slots[0].weight, 0.6, epsilon = 1e-6);
        assert_relative_eq!(slots[1].weight, 0.3, epsilon = 1e-6);
    }

    #[test]
    fn unweighted_vertex_binds_to_joint_zero() {
        let joints = two_joint_skeleton();
        let rig = bind_skeleton(
            &joints,
            &[vec![]],
            &[p(0.5, 0.0, 0.0)],
            &[Vector3::z()],
            1,
        )
        .unwrap();

        let slot = rig.slots(0)[0];
        assert_eq!(slot.bone, 0);
        assert!((slot.weight - 1.0).abs() < f32::EPSILON);
        assert_eq!(rig.skin_vertex(0).position, p(0.5, 0.0, 0.0));
    }

    #[test]
    fn sparse_vertex_pads_with_zero_weight() {
        let joints = two_joint_skeleton();
        let rig = bind_skeleton(
            &joints,
            &[vec![(1, 0.25)]],
            &[p(2.0, 0.0, 0.0)],
            &[Vector3::z()],
            4,
        )
        .unwrap();

        let slots = rig.slots(0);
        assert_eq!(slots.len(), 4);
        assert_relative_eq!(slots[0].weight, 1.0, epsilon = 1e-6);
        for slot in &slots[1..] {
            assert_eq!(slot.bone, 1);
            assert_eq!(slot.weight, 0.0);
        }
    }

    #[test]
    fn rejects_empty_skeleton() {
        let err = bind_skeleton(&[], &[], &[], &[], 1).unwrap_err();
        assert!(matches!(
            err,
            RigError::DimensionMismatch { what: "joints", .. }
        ));
    }

    #[test]
    fn rejects_dangling_joint_reference() {
        let joints = two_joint_skeleton();
        let err = bind_skeleton(
            &joints,
            &[vec![(5, 1.0)]],
            &[p(0.0, 0.0, 0.0)],
            &[Vector3::z()],
            1,
        )
        .unwrap_err();
        assert_eq!(
            err,
            RigError::DimensionMismatch {
                what: "bone index",
                expected: 2,
                got: 5
            }
        );
    }

    #[test]
    fn rejects_mismatched_vertex_arrays() {
        let joints = two_joint_skeleton();
        let err = bind_skeleton(&joints, &[vec![]], &[], &[], 1).unwrap_err();
        assert!(matches!(
            err,
            RigError::DimensionMismatch {
                what: "vertex weights",
                ..
            }
        ));
    }

    #[test]
    fn parent_links_carry_into_bones() {
        let joints = two_joint_skeleton();
        let rig = bind_skeleton(
            &joints,
            &[vec![(0, 1.0)]],
            &[p(0.0, 0.0, 0.0)],
            &[Vector3::z()],
            1,
        )
        .unwrap();
        assert_eq!(rig.bones()[0].parent(), None);
        assert_eq!(rig.bones()[1].parent(), Some(0));
    }
}
