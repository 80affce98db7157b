//! Bevy integration for the skinning transform.
//!
//! Provides [`MarionetteSkinPlugin`] which adds an update system that
//! applies poses queued on [`RigRegistry`] and recomputes each rig's
//! posed vertices. The driver reads them back through
//! [`RigRegistry::skinned`] and uploads them wherever it likes; nothing
//! here talks to a GPU.
//!
//! The update system runs in [`MarionetteSet::Skin`], after IK solves in
//! [`MarionetteSet::Solve`].

use std::collections::HashMap;

use bevy::prelude::*;
use log::warn;
use nalgebra::Matrix4;

use marionette_core::schedule::MarionetteSet;
use marionette_core::types::RigId;

use crate::rig::{Rig, SkinnedVertex};

/// Bevy plugin that adds skinning recompute each frame.
pub struct MarionetteSkinPlugin;

impl Plugin for MarionetteSkinPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RigRegistry>()
            .add_systems(Update, skin_update_system.in_set(MarionetteSet::Skin));
    }
}

/// Per-rig state: the rig, a queued pose, and the last posed outputs.
#[derive(Debug)]
pub struct RigEntry {
    /// The rig itself.
    pub rig: Rig,
    /// Pose queued by the driver, consumed on the next update.
    pending_pose: Option<Vec<Matrix4<f32>>>,
    /// Posed outputs from the most recent update (seeded from the rest
    /// pose at registration).
    skinned: Vec<SkinnedVertex>,
}

impl RigEntry {
    /// The posed vertices from the most recent update.
    pub fn skinned(&self) -> &[SkinnedVertex] {
        &self.skinned
    }
}

/// Resource mapping [`RigId`] to registered rigs.
#[derive(Resource, Debug, Default)]
pub struct RigRegistry {
    rigs: HashMap<RigId, RigEntry>,
}

impl RigRegistry {
    /// Register a rig under `id`, replacing any previous one. The
    /// current pose is skinned immediately so outputs are readable
    /// before the first frame.
    pub fn insert(&mut self, id: RigId, rig: Rig) {
        let skinned = rig.skin_mesh();
        self.rigs.insert(
            id,
            RigEntry {
                rig,
                pending_pose: None,
                skinned,
            },
        );
    }

    /// Queue a pose for a rig, replacing any not-yet-applied pose.
    /// No-op for an unknown id.
    pub fn set_pose(&mut self, id: RigId, transforms: Vec<Matrix4<f32>>) {
        if let Some(entry) = self.rigs.get_mut(&id) {
            entry.pending_pose = Some(transforms);
        }
    }

    /// The posed vertices of a rig, if registered.
    pub fn skinned(&self, id: RigId) -> Option<&[SkinnedVertex]> {
        self.rigs.get(&id).map(RigEntry::skinned)
    }

    /// Get a reference to a rig entry.
    pub fn get(&self, id: RigId) -> Option<&RigEntry> {
        self.rigs.get(&id)
    }

    /// Get a mutable reference to a rig entry.
    pub fn get_mut(&mut self, id: RigId) -> Option<&mut RigEntry> {
        self.rigs.get_mut(&id)
    }

    /// Remove a rig, returning its entry.
    pub fn remove(&mut self, id: RigId) -> Option<RigEntry> {
        self.rigs.remove(&id)
    }

    /// Number of registered rigs.
    pub fn len(&self) -> usize {
        self.rigs.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.rigs.is_empty()
    }
}

/// System that applies queued poses and refreshes posed outputs.
///
/// A rejected pose (bone count mismatch) keeps the rig's previous pose
/// and outputs; the mismatch is logged, not swallowed silently.
pub fn skin_update_system(mut registry: ResMut<RigRegistry>) {
    for (id, entry) in &mut registry.rigs {
        let Some(pose) = entry.pending_pose.take() else {
            continue;
        };
        match entry.rig.update_bone_pose(&pose) {
            Ok(()) => entry.skinned = entry.rig.skin_mesh(),
            Err(err) => warn!("skin: {id} pose rejected: {err}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
