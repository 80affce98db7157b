//! FABRIK (Forward-And-Backward Reaching Inverse Kinematics) solver.
//!
//! Iteratively repositions chain joints so the end effector approaches a
//! target while every segment keeps its fixed length. One iteration is a
//! backward pass (end joint snapped to the target, walking toward the
//! anchor) followed by a forward pass (anchor restored, walking back out).

use log::debug;
use nalgebra::{Point3, Vector3};

use marionette_core::config::IkConfig;
use marionette_core::error::ChainError;

use crate::chain::{Chain, DEGENERATE_NORM};

/// Configuration for the FABRIK solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FabrikConfig {
    /// End-effector distance below which a solve converges (world units).
    pub tolerance: f32,
    /// Maximum backward/forward passes per solve. Also the wall-clock
    /// bound: an unreachable target runs the full budget.
    pub max_iterations: u32,
}

impl Default for FabrikConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-4,
            max_iterations: 100,
        }
    }
}

impl From<IkConfig> for FabrikConfig {
    fn from(config: IkConfig) -> Self {
        Self {
            tolerance: config.tolerance,
            max_iterations: config.max_iterations,
        }
    }
}

/// Result of a FABRIK solve.
///
/// Not converging is a reportable outcome, not an error: an animation
/// driver routinely accepts the best-effort pose for an unreachable
/// target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveReport {
    /// Whether the end effector reached the target within tolerance.
    pub converged: bool,
    /// Number of full passes used.
    pub iterations: u32,
    /// Final end-effector distance to the target.
    pub error: f32,
}

/// FABRIK solver.
pub struct FabrikSolver {
    config: FabrikConfig,
}

impl FabrikSolver {
    /// Create a new solver with the given configuration.
    pub const fn new(config: FabrikConfig) -> Self {
        Self { config }
    }

    /// Create a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(FabrikConfig::default())
    }

    /// Access the solver configuration.
    pub const fn config(&self) -> &FabrikConfig {
        &self.config
    }

    /// Solve toward `target`, mutating `chain` joint positions in place.
    ///
    /// Iterates full passes until the end effector is within tolerance of
    /// the target or the iteration budget runs out. Segment lengths are
    /// preserved exactly by every pass.
    ///
    /// # Errors
    ///
    /// [`ChainError`] if the chain preconditions do not hold; the chain is
    /// not touched in that case.
    pub fn solve(
        &self,
        chain: &mut Chain,
        target: &Point3<f32>,
    ) -> Result<SolveReport, ChainError> {
        chain.validate()?;

        let mut error = chain.distance_to(target);
        if error <= self.config.tolerance {
            return Ok(SolveReport {
                converged: true,
                iterations: 0,
                error,
            });
        }

        for iteration in 1..=self.config.max_iterations {
            full_pass(chain, target);
            error = chain.distance_to(target);
            if error <= self.config.tolerance {
                debug!("fabrik: converged in {iteration} passes (error {error:e})");
                return Ok(SolveReport {
                    converged: true,
                    iterations: iteration,
                    error,
                });
            }
        }

        debug!(
            "fabrik: iteration budget {} exhausted (error {error:e})",
            self.config.max_iterations
        );
        Ok(SolveReport {
            converged: false,
            iterations: self.config.max_iterations,
            error,
        })
    }

    /// Run a single backward+forward pass and return the resulting
    /// end-effector distance to `target`.
    ///
    /// This is the granularity an interactive driver steps at (one pass
    /// per input event); [`FabrikSolver::solve`] loops it.
    ///
    /// # Errors
    ///
    /// [`ChainError`] if the chain preconditions do not hold.
    pub fn step(&self, chain: &mut Chain, target: &Point3<f32>) -> Result<f32, ChainError> {
        chain.validate()?;
        full_pass(chain, target);
        Ok(chain.distance_to(target))
    }
}

/// Place a joint at exactly `length` from `from`, along the line from
/// `from` toward the joint's old position `toward`. Coincident points get
/// the `fallback` direction instead of a zero division.
fn place_at_distance(
    from: Point3<f32>,
    toward: Point3<f32>,
    length: f32,
    fallback: Vector3<f32>,
) -> Point3<f32> {
    let dir = (toward - from)
        .try_normalize(DEGENERATE_NORM)
        .unwrap_or(fallback);
    from + dir * length
}

/// One full FABRIK pass: backward then forward.
fn full_pass(chain: &mut Chain, target: &Point3<f32>) {
    let fallback = chain.fallback_dir();
    let anchor = chain.anchor();
    let (joints, lengths) = chain.parts_mut();
    let n = joints.len();

    // Backward: the end joint reaches the target; each earlier joint is
    // pulled to its fixed distance from the joint after it. Walking
    // end-to-anchor means the fallback points against the chain direction.
    joints[n - 1] = *target;
    for i in (0..n - 1).rev() {
        joints[i] = place_at_distance(joints[i + 1], joints[i], lengths[i], -fallback);
    }

    // Forward: the anchor snaps back to its original position; each later
    // joint is pushed to its fixed distance from the joint before it.
    joints[0] = anchor;
    for i in 0..n - 1 {
        joints[i + 1] = place_at_distance(joints[i], joints[i + 1], lengths[i], fallback);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
