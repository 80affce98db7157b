//! Rig fixtures.

use nalgebra::{Point3, Vector3};

use marionette_skin::{bind_skeleton, BindJoint, Rig};

/// Rest geometry shared by the rig fixtures: `n` vertices spaced one
/// unit apart along +X, all normals +Z.
pub fn strip_rest(n: usize) -> (Vec<Point3<f32>>, Vec<Vector3<f32>>) {
    let positions = (0..n).map(|i| Point3::new(i as f32, 0.0, 0.0)).collect();
    let normals = vec![Vector3::z(); n];
    (positions, normals)
}

/// A strip of `n` vertices rest-bound to a single identity bone.
pub fn single_bone_rig(n: usize) -> Rig {
    let (positions, normals) = strip_rest(n);
    Rig::bind_rest(&positions, &normals).expect("rest bind fixture is valid")
}

/// A four-vertex strip bound to two bones with two blend slots per
/// vertex: joint 0 at the origin, joint 1 at x = 3, and weights fading
/// linearly from the first joint to the second.
pub fn two_bone_rig() -> Rig {
    let (positions, normals) = strip_rest(4);
    let joints = vec![
        BindJoint::root(Point3::new(0.0, 0.0, 0.0)),
        BindJoint::child(Point3::new(3.0, 0.0, 0.0), 0),
    ];
    let weights = vec![
        vec![(0, 1.0)],
        vec![(0, 2.0 / 3.0), (1, 1.0 / 3.0)],
        vec![(0, 1.0 / 3.0), (1, 2.0 / 3.0)],
        vec![(1, 1.0)],
    ];
    bind_skeleton(&joints, &weights, &positions, &normals, 2)
        .expect("two-bone fixture binds")
}
