//! Inverse kinematics for marionette arms.
//!
//! Provides fixed-length joint chains, a FABRIK
//! (Forward-And-Backward Reaching Inverse Kinematics) solver, and a Bevy
//! plugin that runs solves each frame for registered arms.
//!
//! # Architecture
//!
//! ```text
//! joint positions ──► Chain ──► FabrikSolver ──► updated joint positions
//! ```
//!
//! A [`Chain`] is built once from initial joint positions; its segment
//! lengths are fixed from that moment on. The solver then mutates joint
//! positions in place, taking a target point per solve and reporting
//! whether the end effector reached it.

pub mod chain;
pub mod plugin;
pub mod solver;

pub use chain::Chain;
pub use plugin::{ArmEntry, ArmRegistry, IkSolverSettings, MarionetteIkPlugin};
pub use solver::{FabrikConfig, FabrikSolver, SolveReport};
