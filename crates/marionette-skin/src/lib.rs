//! Skeletal linear-blend skinning for marionette rigs.
//!
//! Provides the rig data model (bones with cached normal transforms,
//! per-vertex blend slots), the skinning transform itself, a binding
//! helper that builds rigs from exported skeleton data, and a Bevy plugin
//! that recomputes posed vertices each frame.
//!
//! # Architecture
//!
//! ```text
//! skeleton + weights ──► bind ──► Rig ──► update_bone_pose ──► skin_mesh
//!                                              │
//!                                              └──► SkinnedVertex stream
//! ```
//!
//! The rig owns its bones; vertices reference bones by index only. Posed
//! positions and normals are derived on demand and never stored in the
//! rig, so reposing is just another `update_bone_pose` + `skin_mesh`.

pub mod bind;
pub mod plugin;
pub mod rig;
pub mod skinning;

pub use bind::{bind_skeleton, BindJoint};
pub use plugin::{MarionetteSkinPlugin, RigEntry, RigRegistry};
pub use rig::{BlendSlot, Bone, Rig, SkinnedVertex};
pub use skinning::RigUpdate;
