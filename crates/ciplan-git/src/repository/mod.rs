mod diff;

use std::path::{Path, PathBuf};

use crate::{GitError, Result};

pub struct Repository {
    pub(crate) inner: git2::Repository,
    root: PathBuf,
}

impl Repository {
    /// # Errors
    ///
    /// Returns [`GitError::NotARepository`] if the path is not inside a git repository.
    pub fn open(path: &Path) -> Result<Self> {
        let inner = git2::Repository::discover(path).map_err(|_| GitError::NotARepository {
            path: path.to_path_buf(),
        })?;

        let root = inner.workdir().ok_or_else(|| GitError::NotARepository {
            path: path.to_path_buf(),
        })?;

        // Use dunce to get a path without the \\?\ prefix on Windows
        let root = dunce::simplified(root).to_path_buf();

        Ok(Self { inner, root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a refspec to the full commit id it points at.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::RevisionNotFound`] if the refspec does not resolve
    /// to a commit.
    pub fn resolve_revision(&self, refspec: &str) -> Result<String> {
        Ok(self.resolve_commit(refspec)?.id().to_string())
    }

    /// Finds the common ancestor of two revisions.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::RevisionNotFound`] if either endpoint cannot be
    /// resolved, or [`GitError::NoMergeBase`] if the histories do not meet
    /// (typically a shallow clone).
    pub fn merge_base(&self, ours: &str, theirs: &str) -> Result<String> {
        let a = self.resolve_commit(ours)?.id();
        let b = self.resolve_commit(theirs)?.id();

        let base = self
            .inner
            .merge_base(a, b)
            .map_err(|_| GitError::NoMergeBase {
                ours: ours.to_string(),
                theirs: theirs.to_string(),
            })?;

        Ok(base.to_string())
    }

    /// Reports whether the working tree has uncommitted changes to tracked
    /// files. Untracked and ignored files do not count.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::Git`] if the status query fails.
    pub fn is_dirty(&self) -> Result<bool> {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(false).include_ignored(false);

        let statuses = self.inner.statuses(Some(&mut opts))?;
        Ok(!statuses.is_empty())
    }

    pub(crate) fn resolve_commit(&self, refspec: &str) -> Result<git2::Commit<'_>> {
        let obj = self
            .inner
            .revparse_single(refspec)
            .map_err(|_| GitError::RevisionNotFound {
                refspec: refspec.to_string(),
            })?;

        obj.peel_to_commit().map_err(|_| GitError::RevisionNotFound {
            refspec: refspec.to_string(),
        })
    }

    pub(crate) fn resolve_tree(&self, refspec: &str) -> Result<git2::Tree<'_>> {
        let obj = self
            .inner
            .revparse_single(refspec)
            .map_err(|_| GitError::RevisionNotFound {
                refspec: refspec.to_string(),
            })?;

        obj.peel_to_tree().map_err(|_| GitError::RevisionNotFound {
            refspec: refspec.to_string(),
        })
    }
}
