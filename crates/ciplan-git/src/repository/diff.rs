use std::path::PathBuf;

use ciplan_core::{ChangedPath, DiffStatus};

use crate::{GitError, Result};

use super::Repository;

impl Repository {
    /// # Errors
    ///
    /// Returns [`GitError::RevisionNotFound`] if either base or head cannot be resolved.
    pub fn changed_files(&self, base: Option<&str>, head: &str) -> Result<Vec<ChangedPath>> {
        let head_tree = self.resolve_tree(head)?;

        let base_tree = match base {
            Some(refspec) => Some(self.resolve_tree(refspec)?),
            None => None,
        };

        let mut diff = self
            .inner
            .diff_tree_to_tree(base_tree.as_ref(), Some(&head_tree), None)?;

        let mut find_opts = git2::DiffFindOptions::new();
        find_opts.renames(true);
        find_opts.copies(true);
        diff.find_similar(Some(&mut find_opts))?;

        let mut changes = Vec::new();

        for delta in diff.deltas() {
            let status = match delta.status() {
                git2::Delta::Added => DiffStatus::Added,
                git2::Delta::Deleted => DiffStatus::Deleted,
                git2::Delta::Modified => DiffStatus::Modified,
                git2::Delta::Renamed => DiffStatus::Renamed,
                git2::Delta::Copied => DiffStatus::Copied,
                _ => continue,
            };

            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .map(PathBuf::from)
                .ok_or(GitError::MissingDeltaPath)?;

            // The delta's BINARY flag is only populated when diff content is
            // loaded, which a bare tree-to-tree diff never does. Inspect the
            // blobs themselves instead.
            let binary = self.blob_is_binary(delta.new_file().id())
                || self.blob_is_binary(delta.old_file().id());

            let mut change = ChangedPath::new(path, status).with_binary(binary);

            if status == DiffStatus::Renamed || status == DiffStatus::Copied {
                if let Some(old_path) = delta.old_file().path() {
                    change = change.with_old_path(old_path.to_path_buf());
                }
            }

            changes.push(change);
        }

        Ok(changes)
    }

    /// Lists every file in the tree at `head`, as if all of them had changed.
    /// Backs the forced full-plan mode.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::RevisionNotFound`] if `head` cannot be resolved.
    pub fn all_files(&self, head: &str) -> Result<Vec<ChangedPath>> {
        let tree = self.resolve_tree(head)?;

        let mut files = Vec::new();
        tree.walk(git2::TreeWalkMode::PreOrder, |dir, entry| {
            if entry.kind() == Some(git2::ObjectType::Blob) {
                if let Some(name) = entry.name() {
                    files.push(ChangedPath::new(
                        PathBuf::from(format!("{dir}{name}")),
                        DiffStatus::Modified,
                    ));
                }
            }
            git2::TreeWalkResult::Ok
        })?;

        Ok(files)
    }

    /// A zero id means the side does not exist (added/deleted); a lookup
    /// failure means the entry is not a blob (submodule commits).
    fn blob_is_binary(&self, id: git2::Oid) -> bool {
        if id.is_zero() {
            return false;
        }
        self.inner.find_blob(id).is_ok_and(|blob| blob.is_binary())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{commit_file, setup_test_repo};
    use ciplan_core::DiffStatus;
    use std::fs;
    use std::path::{Path, PathBuf};

    #[test]
    fn detect_added_file() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;
        commit_file(&dir, &repo, "new_file.txt", "content", "Add file")?;

        let changes = repo.changed_files(Some("HEAD~1"), "HEAD")?;

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].status, DiffStatus::Added);
        assert_eq!(changes[0].path.to_string_lossy(), "new_file.txt");
        Ok(())
    }

    #[test]
    fn detect_modified_file() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;
        commit_file(&dir, &repo, "file.txt", "initial", "Add file")?;
        commit_file(&dir, &repo, "file.txt", "modified", "Modify file")?;

        let changes = repo.changed_files(Some("HEAD~1"), "HEAD")?;

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].status, DiffStatus::Modified);
        assert!(!changes[0].binary);
        Ok(())
    }

    #[test]
    fn binary_content_sets_the_binary_flag() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;
        commit_file(&dir, &repo, "blob.bin", "v1\0data", "Add blob")?;
        commit_file(&dir, &repo, "blob.bin", "v2\0data", "Update blob")?;

        let changes = repo.changed_files(Some("HEAD~1"), "HEAD")?;

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].status, DiffStatus::Modified);
        assert!(changes[0].binary);
        Ok(())
    }

    #[test]
    fn deleted_binary_file_keeps_the_binary_flag() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;
        commit_file(&dir, &repo, "blob.bin", "v1\0data", "Add blob")?;

        fs::remove_file(dir.path().join("blob.bin"))?;
        let mut index = repo.inner.index()?;
        index.remove_path(Path::new("blob.bin"))?;
        index.write()?;

        let sig = git2::Signature::now("Test", "test@example.com")?;
        let tree_id = index.write_tree()?;
        let tree = repo.inner.find_tree(tree_id)?;
        let parent = repo.inner.head()?.peel_to_commit()?;
        repo.inner
            .commit(Some("HEAD"), &sig, &sig, "Delete blob", &tree, &[&parent])?;

        let changes = repo.changed_files(Some("HEAD~1"), "HEAD")?;

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].status, DiffStatus::Deleted);
        assert!(changes[0].binary);
        Ok(())
    }

    #[test]
    fn detect_deleted_file() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;
        commit_file(&dir, &repo, "file.txt", "content", "Add file")?;

        fs::remove_file(dir.path().join("file.txt"))?;
        let mut index = repo.inner.index()?;
        index.remove_path(Path::new("file.txt"))?;
        index.write()?;

        let sig = git2::Signature::now("Test", "test@example.com")?;
        let tree_id = index.write_tree()?;
        let tree = repo.inner.find_tree(tree_id)?;
        let parent = repo.inner.head()?.peel_to_commit()?;
        repo.inner
            .commit(Some("HEAD"), &sig, &sig, "Delete file", &tree, &[&parent])?;

        let changes = repo.changed_files(Some("HEAD~1"), "HEAD")?;

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].status, DiffStatus::Deleted);
        Ok(())
    }

    #[test]
    fn detect_renamed_file() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;
        commit_file(
            &dir,
            &repo,
            "original.txt",
            "a reasonably long piece of content",
            "Add file",
        )?;

        fs::rename(
            dir.path().join("original.txt"),
            dir.path().join("renamed.txt"),
        )?;
        let mut index = repo.inner.index()?;
        index.remove_path(Path::new("original.txt"))?;
        index.add_path(Path::new("renamed.txt"))?;
        index.write()?;

        let sig = git2::Signature::now("Test", "test@example.com")?;
        let tree_id = index.write_tree()?;
        let tree = repo.inner.find_tree(tree_id)?;
        let parent = repo.inner.head()?.peel_to_commit()?;
        repo.inner
            .commit(Some("HEAD"), &sig, &sig, "Rename file", &tree, &[&parent])?;

        let changes = repo.changed_files(Some("HEAD~1"), "HEAD")?;

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].status, DiffStatus::Renamed);
        assert_eq!(changes[0].path, PathBuf::from("renamed.txt"));
        assert_eq!(changes[0].old_path, Some(PathBuf::from("original.txt")));
        Ok(())
    }

    #[test]
    fn unknown_base_revision_fails() -> anyhow::Result<()> {
        let (_dir, repo) = setup_test_repo()?;

        let result = repo.changed_files(Some("nonexistent-ref"), "HEAD");

        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn all_files_lists_full_tree() -> anyhow::Result<()> {
        let (dir, repo) = setup_test_repo()?;
        commit_file(&dir, &repo, "a.txt", "a", "Add a")?;
        commit_file(&dir, &repo, "sub/b.txt", "b", "Add b")?;

        let files = repo.all_files("HEAD")?;
        let paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();

        assert!(paths.contains(&PathBuf::from("a.txt")));
        assert!(paths.contains(&PathBuf::from("sub/b.txt")));
        Ok(())
    }
}
