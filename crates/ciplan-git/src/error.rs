use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("git operation failed")]
    Git(#[from] git2::Error),

    #[error("not a git repository: '{path}'")]
    NotARepository { path: PathBuf },

    #[error("failed to resolve revision '{refspec}'")]
    RevisionNotFound { refspec: String },

    #[error("no merge base between '{ours}' and '{theirs}' (shallow history?)")]
    NoMergeBase { ours: String, theirs: String },

    #[error("diff delta has no file path")]
    MissingDeltaPath,
}

pub type Result<T> = std::result::Result<T, GitError>;
