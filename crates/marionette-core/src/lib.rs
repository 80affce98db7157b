// marionette-core: Errors, config, IDs, and scheduling labels for the marionette crates.

pub mod config;
pub mod error;
pub mod schedule;
pub mod types;

pub use error::{ChainError, ConfigError, MarionetteError, RigError};
pub use schedule::{MarionetteCorePlugin, MarionetteSet};
