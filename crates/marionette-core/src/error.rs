use thiserror::Error;

/// Top-level error type for the marionette crates.
#[derive(Debug, Error)]
pub enum MarionetteError {
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("Rig error: {0}")]
    Rig(#[from] RigError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Kinematic chain precondition violations.
///
/// Copy + static payloads for cheap propagation in the solve path.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ChainError {
    #[error("Chain too short: {got} joints (need at least 2)")]
    TooFewJoints { got: usize },

    #[error("Non-positive segment length at index {index}: {length}")]
    NonPositiveSegment { index: usize, length: f32 },
}

/// Rig pose-update and rebind violations.
///
/// Both variants are precondition checks: the failing operation performs
/// no partial mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RigError {
    #[error("Bone count mismatch: expected {expected}, got {got}")]
    BoneCountMismatch { expected: usize, got: usize },

    #[error("Dimension mismatch in {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid tolerance: {0} (must be > 0)")]
    InvalidTolerance(f32),

    #[error("Invalid max_iterations: must be >= 1")]
    InvalidMaxIterations,

    #[error("Invalid n_blend: {0} (must be >= 1)")]
    InvalidBlendCount(usize),

    #[error("Invalid max_bones: {0} (must be >= 1)")]
    InvalidMaxBones(usize),
}
