//! Bevy integration for the FABRIK solver.
//!
//! Provides [`MarionetteIkPlugin`] which adds a solve system that walks
//! [`ArmRegistry`] each frame, runs the solver on every arm with an active
//! goal, and stores the resulting [`SolveReport`] for the driver to read
//! back.
//!
//! # Usage
//!
//! 1. Add [`MarionetteCorePlugin`](marionette_core::MarionetteCorePlugin)
//!    and [`MarionetteIkPlugin`] to your app.
//! 2. Register arms with [`ArmRegistry::insert`].
//! 3. Set goals with [`ArmRegistry::set_goal`]; read joint positions back
//!    through [`ArmRegistry::get`].
//!
//! The solve system runs in [`MarionetteSet::Solve`], before skinning in
//! [`MarionetteSet::Skin`].

use std::collections::HashMap;

use bevy::prelude::*;
use log::warn;
use nalgebra::Point3;

use marionette_core::schedule::MarionetteSet;
use marionette_core::types::ArmId;

use crate::chain::Chain;
use crate::solver::{FabrikConfig, FabrikSolver, SolveReport};

/// Bevy plugin that adds FABRIK solving each frame.
pub struct MarionetteIkPlugin;

impl Plugin for MarionetteIkPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ArmRegistry>()
            .init_resource::<IkSolverSettings>()
            .add_systems(Update, fabrik_solve_system.in_set(MarionetteSet::Solve));
    }
}

/// Per-arm state: the chain plus its current goal and last solve report.
#[derive(Debug)]
pub struct ArmEntry {
    /// The chain, mutated in place by each solve.
    pub chain: Chain,
    /// Current target. `None` means the arm is idle.
    pub goal: Option<Point3<f32>>,
    /// Report from the most recent solve, if any.
    pub report: Option<SolveReport>,
}

/// Resource mapping [`ArmId`] to solvable chains.
#[derive(Resource, Debug, Default)]
pub struct ArmRegistry {
    arms: HashMap<ArmId, ArmEntry>,
}

impl ArmRegistry {
    /// Register a chain under `id`, replacing any previous arm.
    pub fn insert(&mut self, id: ArmId, chain: Chain) {
        self.arms.insert(
            id,
            ArmEntry {
                chain,
                goal: None,
                report: None,
            },
        );
    }

    /// Set the target for an arm. No-op for an unknown id.
    pub fn set_goal(&mut self, id: ArmId, target: Point3<f32>) {
        if let Some(entry) = self.arms.get_mut(&id) {
            entry.goal = Some(target);
        }
    }

    /// Clear the target for an arm (stop solving it).
    pub fn clear_goal(&mut self, id: ArmId) {
        if let Some(entry) = self.arms.get_mut(&id) {
            entry.goal = None;
        }
    }

    /// Get a reference to an arm entry.
    pub fn get(&self, id: ArmId) -> Option<&ArmEntry> {
        self.arms.get(&id)
    }

    /// Get a mutable reference to an arm entry.
    pub fn get_mut(&mut self, id: ArmId) -> Option<&mut ArmEntry> {
        self.arms.get_mut(&id)
    }

    /// Remove an arm, returning its entry.
    pub fn remove(&mut self, id: ArmId) -> Option<ArmEntry> {
        self.arms.remove(&id)
    }

    /// Number of registered arms.
    pub fn len(&self) -> usize {
        self.arms.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }
}

/// Resource for solver configuration.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct IkSolverSettings(pub FabrikConfig);

/// System that solves every arm with an active goal.
///
/// The goal stays set after a solve: a driver that drags the target just
/// keeps overwriting it, and idle arms cost nothing once converged
/// (zero-iteration solves).
#[allow(clippy::needless_pass_by_value)]
pub fn fabrik_solve_system(
    mut registry: ResMut<ArmRegistry>,
    settings: Res<IkSolverSettings>,
) {
    let solver = FabrikSolver::new(settings.0);

    for (id, entry) in &mut registry.arms {
        let Some(goal) = entry.goal else {
            continue;
        };
        match solver.solve(&mut entry.chain, &goal) {
            Ok(report) => entry.report = Some(report),
            Err(err) => warn!("ik: {id} skipped: {err}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
