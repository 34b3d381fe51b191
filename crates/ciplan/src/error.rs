use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("git error")]
    Git(#[from] ciplan_git::GitError),

    #[error("workspace graph error")]
    Graph(#[from] ciplan_graph::GraphError),

    #[error("configuration error")]
    Config(#[from] ciplan_config::ConfigError),

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("failed to resolve current directory")]
    CurrentDir(#[source] std::io::Error),

    #[error("failed to serialize plan")]
    Serialize(#[from] serde_json::Error),

    #[error("surface '{name}' is not configured")]
    SurfaceNotConfigured { name: String },

    #[error("command for surface '{surface}' exited with code {code}")]
    CommandFailed { surface: String, code: i32 },

    #[error("failed to write receipt to '{path}'")]
    Receipt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CliError>;
