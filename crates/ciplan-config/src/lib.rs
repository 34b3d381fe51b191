pub mod config;
pub mod error;
pub mod policy;
mod schema;

pub use config::{Config, Profile, Surface, ValidationWarning};
pub use error::ConfigError;
pub use policy::{ConfidencePolicy, Provenance};

/// Default configuration file name, looked up at the workspace root.
pub const DEFAULT_CONFIG_FILE: &str = "ciplan.toml";
