use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_tolerance() -> f32 {
    1e-4
}
const fn default_max_iterations() -> u32 {
    100
}
const fn default_n_blend() -> usize {
    1
}
const fn default_max_bones() -> usize {
    20
}

// ---------------------------------------------------------------------------
// IkConfig
// ---------------------------------------------------------------------------

/// IK solver settings (`[ik]` section).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IkConfig {
    /// End-effector distance below which a solve converges (world units).
    #[serde(default = "default_tolerance")]
    pub tolerance: f32,

    /// Backward/forward pass cap per solve (default: 100).
    /// This is also the wall-clock bound: there is no other cancellation.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

impl Default for IkConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
        }
    }
}

impl IkConfig {
    /// Validate settings. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tolerance > 0.0) {
            return Err(ConfigError::InvalidTolerance(self.tolerance));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::InvalidMaxIterations);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SkinConfig
// ---------------------------------------------------------------------------

/// Skinning settings (`[skin]` section).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkinConfig {
    /// Blend slots per vertex (default: 1 = single-bone binding).
    #[serde(default = "default_n_blend")]
    pub n_blend: usize,

    /// Upper bound on bones per rig (default: 20). Matches the driver's
    /// uniform budget for bone transforms.
    #[serde(default = "default_max_bones")]
    pub max_bones: usize,
}

impl Default for SkinConfig {
    fn default() -> Self {
        Self {
            n_blend: default_n_blend(),
            max_bones: default_max_bones(),
        }
    }
}

impl SkinConfig {
    /// Validate settings. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_blend == 0 {
            return Err(ConfigError::InvalidBlendCount(self.n_blend));
        }
        if self.max_bones == 0 {
            return Err(ConfigError::InvalidMaxBones(self.max_bones));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MarionetteConfig
// ---------------------------------------------------------------------------

/// Top-level configuration for a marionette session.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MarionetteConfig {
    #[serde(default)]
    pub ik: IkConfig,

    #[serde(default)]
    pub skin: SkinConfig,
}

impl MarionetteConfig {
    /// Validate all sections. Returns the first Err encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ik.validate()?;
        self.skin.validate()?;
        Ok(())
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
