pub mod collector;
pub mod error;
mod repository;

pub use collector::{ChangeSet, DiffBase, collect_changes};
pub use error::{GitError, Result};
pub use repository::Repository;
