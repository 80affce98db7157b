//! Frame ordering for the marionette systems.
//!
//! The driver writes goals and poses; within a frame, IK solves run before
//! skinning so a rig posed from freshly solved joints is skinned in the
//! same update.

use bevy::prelude::*;

/// System sets for the marionette pipeline, ordered within [`Update`].
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarionetteSet {
    /// FABRIK solves for registered arms.
    Solve,
    /// Skinning recompute for registered rigs.
    Skin,
}

/// Core plugin: configures the set ordering shared by the ik and skin
/// plugins. Add this before either of them.
pub struct MarionetteCorePlugin;

impl Plugin for MarionetteCorePlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (MarionetteSet::Solve, MarionetteSet::Skin).chain(),
        );
    }
}
