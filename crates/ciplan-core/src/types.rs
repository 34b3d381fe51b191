use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
}

impl fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
            Self::Renamed => "renamed",
            Self::Copied => "copied",
        };
        write!(f, "{s}")
    }
}

/// One changed file between the base and target revisions. Immutable once
/// collected; paths are always repository-relative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedPath {
    pub path: PathBuf,
    pub status: DiffStatus,
    pub old_path: Option<PathBuf>,
    pub binary: bool,
}

impl ChangedPath {
    #[must_use]
    pub fn new(path: PathBuf, status: DiffStatus) -> Self {
        Self {
            path,
            status,
            old_path: None,
            binary: false,
        }
    }

    #[must_use]
    pub fn with_old_path(mut self, old_path: PathBuf) -> Self {
        self.old_path = Some(old_path);
        self
    }

    #[must_use]
    pub fn with_binary(mut self, binary: bool) -> Self {
        self.binary = binary;
        self
    }
}

/// A workspace member: its name and the directory that defines its owned
/// path prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub name: String,
    pub root: PathBuf,
}
