use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration at '{path}'")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration")]
    Parse(#[from] toml::de::Error),

    #[error("duplicate surface name '{name}'")]
    DuplicateSurface { name: String },

    #[error("invalid custom surface name '{name}' (must be non-empty, without ':')")]
    InvalidSurfaceName { name: String },

    #[error("invalid glob pattern '{pattern}' for surface '{surface}'")]
    GlobPattern {
        surface: String,
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("profile '{profile}' requires undeclared surface '{surface}'")]
    UnknownSurface { profile: String, surface: String },

    #[error("workflow job '{job}' maps to undeclared profile '{profile}'")]
    UnknownProfile { job: String, profile: String },

    #[error("command entry references undeclared surface '{surface}'")]
    UnknownCommandSurface { surface: String },
}
