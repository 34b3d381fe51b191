use ciplan_core::ChangedPath;
use tracing::{debug, warn};

use crate::{Repository, Result};

/// How the diff baseline is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffBase {
    /// Diff against the common ancestor of HEAD and a named branch. The
    /// standard pull-request mode.
    MergeBase { branch: String },
    /// Diff against an explicit prior revision.
    Revision { base: String },
    /// Treat every file in HEAD as changed, bypassing detection.
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    /// Resolved base commit id, if a diff was computed.
    pub base: Option<String>,
    /// Resolved target (HEAD) commit id.
    pub target: String,
    /// Ordered, deduplicated changed paths.
    pub paths: Vec<ChangedPath>,
    /// Uncommitted local changes existed and were not part of the diff.
    pub dirty_ignored: bool,
}

/// Collects the changed paths between the chosen baseline and HEAD.
///
/// Read-only: only VCS metadata is inspected, the repository is never
/// mutated.
///
/// # Errors
///
/// Returns [`crate::GitError::RevisionNotFound`] if an endpoint cannot be
/// resolved, or [`crate::GitError::NoMergeBase`] if the merge-base mode
/// finds no common ancestor.
pub fn collect_changes(repo: &Repository, mode: &DiffBase) -> Result<ChangeSet> {
    let target = repo.resolve_revision("HEAD")?;

    let (base, mut paths) = match mode {
        DiffBase::MergeBase { branch } => {
            let base = repo.merge_base("HEAD", branch)?;
            let paths = repo.changed_files(Some(&base), "HEAD")?;
            (Some(base), paths)
        }
        DiffBase::Revision { base } => {
            let resolved = repo.resolve_revision(base)?;
            let paths = repo.changed_files(Some(&resolved), "HEAD")?;
            (Some(resolved), paths)
        }
        DiffBase::All => (None, repo.all_files("HEAD")?),
    };

    paths.sort_by(|a, b| a.path.cmp(&b.path));
    paths.dedup_by(|a, b| a.path == b.path);

    let dirty_ignored = repo.is_dirty()?;
    if dirty_ignored {
        warn!("working tree has uncommitted changes; they are not part of the plan");
    }

    debug!(files = paths.len(), base = ?base, "collected change set");

    Ok(ChangeSet {
        base,
        target,
        paths,
        dirty_ignored,
    })
}
