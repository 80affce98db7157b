//! Shared test fixtures for the marionette crates.
//!
//! Provides canonical chains and rigs so test suites agree on geometry:
//! straight chains along +X, a strip mesh with +Z normals, and one- and
//! two-bone bindings of that strip.

pub mod chains;
pub mod rigs;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use chains::{bent_chain, straight_chain};
pub use rigs::{single_bone_rig, strip_rest, two_bone_rig};
