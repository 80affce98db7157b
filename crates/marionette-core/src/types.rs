use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Registry IDs
// ---------------------------------------------------------------------------

/// Identifier for an IK arm registered with the solve plugin.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ArmId(pub u32);

impl std::fmt::Display for ArmId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "arm{}", self.0)
    }
}

/// Identifier for a skin rig registered with the skinning plugin.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RigId(pub u32);

impl std::fmt::Display for RigId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rig{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display() {
        assert_eq!(ArmId(3).to_string(), "arm3");
        assert_eq!(RigId(0).to_string(), "rig0");
    }

    #[test]
    fn ids_are_hashable_keys() {
        let mut map = std::collections::HashMap::new();
        map.insert(ArmId(1), "left");
        map.insert(ArmId(2), "right");
        assert_eq!(map[&ArmId(1)], "left");
        assert_eq!(map[&ArmId(2)], "right");
    }
}
