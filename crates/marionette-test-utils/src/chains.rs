//! Chain fixtures.

use nalgebra::Point3;

use marionette_ik::Chain;

/// A straight chain of `n_joints` along +X from the origin, with every
/// segment `seg` long.
///
/// # Panics
///
/// Panics if the parameters describe an invalid chain (fewer than 2
/// joints or a non-positive `seg`).
pub fn straight_chain(n_joints: usize, seg: f32) -> Chain {
    let joints = (0..n_joints)
        .map(|i| Point3::new(i as f32 * seg, 0.0, 0.0))
        .collect();
    Chain::new(joints).expect("straight fixture chain is valid")
}

/// An L-shaped three-joint chain: one unit segment along +X, one along
/// +Y.
pub fn bent_chain() -> Chain {
    Chain::new(vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
    ])
    .expect("bent fixture chain is valid")
}
