//! Fixed-length joint chains.
//!
//! A [`Chain`] is an ordered list of joint positions connected by segments
//! whose lengths are computed once from the initial positions and never
//! change afterwards. The first joint is the anchor; the last is the end
//! effector.

use nalgebra::{Point3, Vector3};

use marionette_core::error::ChainError;

/// Norm below which two points are treated as coincident when normalizing
/// a step direction.
pub(crate) const DEGENERATE_NORM: f32 = 1e-6;

/// An ordered chain of joints with fixed segment lengths.
///
/// The chain exclusively owns its joint positions; the solver mutates them
/// in place. Targets are supplied per solve and never stored here.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    /// Joint positions, anchor first.
    joints: Vec<Point3<f32>>,
    /// N-1 segment lengths for N joints, constant after construction.
    segment_lengths: Vec<f32>,
    /// Direction used when a solve step degenerates (coincident points).
    fallback_dir: Vector3<f32>,
}

impl Chain {
    /// Build a chain from initial joint positions.
    ///
    /// Segment lengths are the distances between consecutive joints and
    /// are fixed from here on.
    ///
    /// # Errors
    ///
    /// [`ChainError::TooFewJoints`] for fewer than 2 joints, and
    /// [`ChainError::NonPositiveSegment`] if any two consecutive joints
    /// coincide (or a coordinate is non-finite).
    pub fn new(joints: Vec<Point3<f32>>) -> Result<Self, ChainError> {
        if joints.len() < 2 {
            return Err(ChainError::TooFewJoints { got: joints.len() });
        }

        let segment_lengths: Vec<f32> = joints
            .windows(2)
            .map(|pair| nalgebra::distance(&pair[0], &pair[1]))
            .collect();
        for (index, &length) in segment_lengths.iter().enumerate() {
            if !(length > 0.0) || !length.is_finite() {
                return Err(ChainError::NonPositiveSegment { index, length });
            }
        }

        // Initial anchor-to-end direction, used as the degenerate-step
        // fallback. A chain folded exactly onto its anchor has no span;
        // any fixed axis works then.
        let span = joints[joints.len() - 1] - joints[0];
        let fallback_dir = span.try_normalize(DEGENERATE_NORM).unwrap_or_else(Vector3::x);

        Ok(Self {
            joints,
            segment_lengths,
            fallback_dir,
        })
    }

    /// Forward-kinematics constructor: a planar arm in the XY plane.
    ///
    /// `angles[k]` is relative to the previous segment's heading (angles
    /// accumulate), measured from the +X axis in radians.
    ///
    /// # Panics
    ///
    /// Panics if `lengths.len() != angles.len()`.
    ///
    /// # Errors
    ///
    /// Same as [`Chain::new`].
    pub fn from_planar_angles(
        anchor: Point3<f32>,
        lengths: &[f32],
        angles: &[f32],
    ) -> Result<Self, ChainError> {
        assert_eq!(
            lengths.len(),
            angles.len(),
            "lengths and angles must pair up"
        );

        let mut joints = Vec::with_capacity(lengths.len() + 1);
        joints.push(anchor);
        let mut heading = 0.0f32;
        for (&length, &angle) in lengths.iter().zip(angles.iter()) {
            heading += angle;
            let dir = Vector3::new(heading.cos(), heading.sin(), 0.0);
            let prev = joints[joints.len() - 1];
            joints.push(prev + dir * length);
        }
        Self::new(joints)
    }

    /// Re-check the chain preconditions (joint count, segment lengths).
    ///
    /// Construction already enforces these; the solver re-checks so that
    /// an invalid chain fails before any mutation.
    pub fn validate(&self) -> Result<(), ChainError> {
        if self.joints.len() < 2 {
            return Err(ChainError::TooFewJoints {
                got: self.joints.len(),
            });
        }
        for (index, &length) in self.segment_lengths.iter().enumerate() {
            if !(length > 0.0) || !length.is_finite() {
                return Err(ChainError::NonPositiveSegment { index, length });
            }
        }
        Ok(())
    }

    /// Number of joints.
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// Whether the chain has no joints (never true once constructed).
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Current joint positions, anchor first. Read-only view for drivers
    /// and debug plotting.
    pub fn joints(&self) -> &[Point3<f32>] {
        &self.joints
    }

    /// Fixed segment lengths (N-1 entries for N joints).
    pub fn segment_lengths(&self) -> &[f32] {
        &self.segment_lengths
    }

    /// The anchor (first joint).
    pub fn anchor(&self) -> Point3<f32> {
        self.joints[0]
    }

    /// The end effector (last joint).
    pub fn end_effector(&self) -> Point3<f32> {
        self.joints[self.joints.len() - 1]
    }

    /// Sum of all segment lengths: the arm's maximum reach from the anchor.
    pub fn total_reach(&self) -> f32 {
        self.segment_lengths.iter().sum()
    }

    /// Distance from the end effector to `target`.
    pub fn distance_to(&self, target: &Point3<f32>) -> f32 {
        nalgebra::distance(&self.end_effector(), target)
    }

    /// Direction fallback for degenerate solve steps.
    pub(crate) fn fallback_dir(&self) -> Vector3<f32> {
        self.fallback_dir
    }

    /// Split borrow for the solver: mutable joints plus the fixed lengths.
    pub(crate) fn parts_mut(&mut self) -> (&mut [Point3<f32>], &[f32]) {
        (&mut self.joints, &self.segment_lengths)
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
    fn new_computes_segment_lengths() {
        let chain = Chain::new(vec![p(0.0, 0.0, 0.0), p(3.0, 0.0, 0.0), p(3.0, 4.0, 0.0)])
            .unwrap();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.segment_lengths(), &[3.0, 4.0]);
        assert_relative_eq!(chain.total_reach(), 7.0);
    }

    #[test]
    fn new_rejects_short_chain() {
        assert_eq!(
            Chain::new(vec![p(1.0, 2.0, 3.0)]),
            Err(ChainError::TooFewJoints { got: 1 })
        );
        assert_eq!(Chain::new(vec![]), Err(ChainError::TooFewJoints { got: 0 }));
    }

    #[test]
    fn new_rejects_coincident_joints() {
        let err = Chain::new(vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 0.0, 0.0)])
            .unwrap_err();
        assert!(matches!(
            err,
            ChainError::NonPositiveSegment { index: 1, .. }
        ));
    }

    #[test]
    fn anchor_and_end_effector() {
        let chain = Chain::new(vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)]).unwrap();
        assert_eq!(chain.anchor(), p(0.0, 0.0, 0.0));
        assert_eq!(chain.end_effector(), p(1.0, 0.0, 0.0));
    }

    #[test]
    fn distance_to_target() {
        let chain = Chain::new(vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)]).unwrap();
        assert_relative_eq!(chain.distance_to(&p(1.0, 1.0, 0.0)), 1.0);
    }

    #[test]
    fn planar_angles_zero_is_straight_x() {
        let chain =
            Chain::from_planar_angles(p(0.0, 0.0, 0.0), &[2.0, 1.0, 1.0], &[0.0, 0.0, 0.0])
                .unwrap();
        assert_eq!(chain.len(), 4);
        assert_relative_eq!(chain.end_effector().x, 4.0, epsilon = 1e-6);
        assert_relative_eq!(chain.end_effector().y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn planar_angles_accumulate() {
        // First segment along +X, second bent 90 degrees to +Y.
        let chain = Chain::from_planar_angles(
            p(0.0, 0.0, 0.0),
            &[1.0, 1.0],
            &[0.0, std::f32::consts::FRAC_PI_2],
        )
        .unwrap();
        assert_relative_eq!(chain.joints()[1].x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(chain.end_effector().x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(chain.end_effector().y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn planar_angles_elevated_anchor() {
        // Anchor off the origin, like an arm mounted on a wall.
        let chain =
            Chain::from_planar_angles(p(10.0, 300.0, 0.0), &[50.0], &[0.0]).unwrap();
        assert_eq!(chain.anchor(), p(10.0, 300.0, 0.0));
        assert_relative_eq!(chain.end_effector().x, 60.0, epsilon = 1e-4);
    }

    #[test]
    fn validate_accepts_constructed_chain() {
        let chain = Chain::new(vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)]).unwrap();
        assert!(chain.validate().is_ok());
    }

    #[test]
    fn fallback_dir_is_unit_span() {
        let chain = Chain::new(vec![p(0.0, 0.0, 0.0), p(0.0, 2.0, 0.0)]).unwrap();
        assert_relative_eq!(chain.fallback_dir().y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn folded_chain_falls_back_to_x_axis() {
        // A -> B -> A: positive segments, zero anchor-to-end span.
        let chain = Chain::new(vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 0.0, 0.0)]);
        let chain = chain.unwrap();
        assert_relative_eq!(chain.fallback_dir().x, 1.0, epsilon = 1e-6);
    }
}
