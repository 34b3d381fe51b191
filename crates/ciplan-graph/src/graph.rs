use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use ciplan_core::PackageInfo;
use globset::GlobBuilder;
use tracing::debug;

use crate::GraphError;
use crate::manifest::{CargoManifest, read_manifest};

/// The full package set plus the derived reverse-dependency index. Built
/// once per run and read-only afterwards.
#[derive(Debug)]
pub struct WorkspaceGraph {
    root: PathBuf,
    packages: Vec<PackageInfo>,
    rel_roots: Vec<PathBuf>,
    name_index: HashMap<String, usize>,
    depends_on: Vec<Vec<usize>>,
    dependents: Vec<Vec<usize>>,
    // Package indices sorted by root depth, deepest first, so ownership
    // resolution picks the most specific package.
    ownership_order: Vec<usize>,
}

impl WorkspaceGraph {
    /// Builds a graph from already-collected members. Dependency names that
    /// resolve to no workspace member are external and ignored.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicatePackageName`] if two members share a
    /// name, or [`GraphError::CycleDetected`] if the in-workspace dependency
    /// relation is not acyclic.
    pub fn build(
        root: PathBuf,
        members: Vec<(PackageInfo, Vec<String>)>,
    ) -> Result<Self, GraphError> {
        let mut name_index: HashMap<String, usize> = HashMap::new();
        for (idx, (info, _)) in members.iter().enumerate() {
            if let Some(&first) = name_index.get(&info.name) {
                let first_root: &PackageInfo = &members[first].0;
                return Err(GraphError::DuplicatePackageName {
                    name: info.name.clone(),
                    first: first_root.root.join("Cargo.toml"),
                    second: info.root.join("Cargo.toml"),
                });
            }
            name_index.insert(info.name.clone(), idx);
        }

        let mut depends_on = vec![Vec::new(); members.len()];
        for (idx, (_, dep_names)) in members.iter().enumerate() {
            for dep in dep_names {
                if let Some(&target) = name_index.get(dep) {
                    if target != idx && !depends_on[idx].contains(&target) {
                        depends_on[idx].push(target);
                    }
                }
            }
        }

        if let Some(cycle) = find_cycle(&depends_on) {
            let names = cycle
                .into_iter()
                .map(|i| members[i].0.name.clone())
                .collect();
            return Err(GraphError::CycleDetected { cycle: names });
        }

        // Invert every edge once so impact expansion is O(1) amortized.
        let mut dependents = vec![Vec::new(); members.len()];
        for (idx, targets) in depends_on.iter().enumerate() {
            for &target in targets {
                dependents[target].push(idx);
            }
        }

        let packages: Vec<PackageInfo> = members.into_iter().map(|(info, _)| info).collect();

        let rel_roots: Vec<PathBuf> = packages
            .iter()
            .map(|p| {
                p.root
                    .strip_prefix(&root)
                    .map_or_else(|_| p.root.clone(), Path::to_path_buf)
            })
            .collect();

        let mut ownership_order: Vec<usize> = (0..packages.len()).collect();
        ownership_order.sort_by_key(|&i| std::cmp::Reverse(rel_roots[i].components().count()));

        debug!(
            packages = packages.len(),
            edges = depends_on.iter().map(Vec::len).sum::<usize>(),
            "built workspace graph"
        );

        Ok(Self {
            root,
            packages,
            rel_roots,
            name_index,
            depends_on,
            dependents,
            ownership_order,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn packages(&self) -> &[PackageInfo] {
        &self.packages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    #[must_use]
    pub fn package(&self, idx: usize) -> &PackageInfo {
        &self.packages[idx]
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_index.get(name).copied()
    }

    #[must_use]
    pub fn dependencies_of(&self, idx: usize) -> &[usize] {
        &self.depends_on[idx]
    }

    #[must_use]
    pub fn dependents_of(&self, idx: usize) -> &[usize] {
        &self.dependents[idx]
    }

    /// Resolves the owning package of a repository-relative path, if any.
    /// The deepest package root containing the path wins.
    #[must_use]
    pub fn owner_of(&self, path: &Path) -> Option<usize> {
        self.ownership_order
            .iter()
            .copied()
            .find(|&idx| path.starts_with(&self.rel_roots[idx]))
    }

    /// Expands a seed set to the transitive closure of dependents, via an
    /// explicit work queue over the reverse index. Returns sorted indices;
    /// the seeds are always included, so direct ⊆ transitive holds.
    #[must_use]
    pub fn dependents_closure(&self, seeds: &[usize]) -> Vec<usize> {
        let mut visited = vec![false; self.packages.len()];
        let mut queue = VecDeque::new();

        for &seed in seeds {
            if !visited[seed] {
                visited[seed] = true;
                queue.push_back(seed);
            }
        }

        while let Some(idx) = queue.pop_front() {
            for &dependent in &self.dependents[idx] {
                if !visited[dependent] {
                    visited[dependent] = true;
                    queue.push_back(dependent);
                }
            }
        }

        visited
            .iter()
            .enumerate()
            .filter_map(|(idx, &seen)| seen.then_some(idx))
            .collect()
    }
}

/// Iterative three-color DFS; returns one offending cycle in dependency
/// order if the relation is not acyclic.
fn find_cycle(edges: &[Vec<usize>]) -> Option<Vec<usize>> {
    #[derive(Clone, Copy, PartialEq)]
    enum Color {
        White,
        Gray,
        Black,
    }

    let mut color = vec![Color::White; edges.len()];

    for start in 0..edges.len() {
        if color[start] != Color::White {
            continue;
        }

        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        let mut path: Vec<usize> = vec![start];
        color[start] = Color::Gray;

        while let Some(&mut (node, ref mut next)) = stack.last_mut() {
            if *next < edges[node].len() {
                let child = edges[node][*next];
                *next += 1;

                match color[child] {
                    Color::Gray => {
                        let pos = path
                            .iter()
                            .position(|&n| n == child)
                            .unwrap_or(path.len() - 1);
                        let mut cycle: Vec<usize> = path[pos..].to_vec();
                        cycle.push(child);
                        return Some(cycle);
                    }
                    Color::White => {
                        color[child] = Color::Gray;
                        stack.push((child, 0));
                        path.push(child);
                    }
                    Color::Black => {}
                }
            } else {
                color[node] = Color::Black;
                stack.pop();
                path.pop();
            }
        }
    }

    None
}

/// Scans the workspace at or above `start_dir` and builds its dependency
/// graph.
///
/// # Errors
///
/// Returns `GraphError` if no workspace root can be found, a manifest fails
/// to read or parse, two packages share a name, or the dependency relation
/// has a cycle.
pub fn discover_graph(start_dir: &Path) -> Result<WorkspaceGraph, GraphError> {
    let start_dir = start_dir
        .canonicalize()
        .map_err(|source| GraphError::ManifestRead {
            path: start_dir.to_path_buf(),
            source,
        })?;

    let (root, manifest) = find_workspace_root(&start_dir)?;
    let members = collect_members(&root, &manifest)?;

    WorkspaceGraph::build(root, members)
}

fn find_workspace_root(start_dir: &Path) -> Result<(PathBuf, CargoManifest), GraphError> {
    let mut current = start_dir.to_path_buf();
    let mut fallback_single_package: Option<(PathBuf, CargoManifest)> = None;

    loop {
        let manifest_path = current.join("Cargo.toml");

        if manifest_path.exists() {
            let manifest = read_manifest(&manifest_path)?;

            if manifest.workspace.is_some() {
                return Ok((current, manifest));
            }

            if manifest.package.is_some() && fallback_single_package.is_none() {
                fallback_single_package = Some((current.clone(), manifest));
            }
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => {
                return fallback_single_package.ok_or_else(|| GraphError::NotFound {
                    start_dir: start_dir.to_path_buf(),
                });
            }
        }
    }
}

type Member = (PackageInfo, Vec<String>);

fn collect_members(root: &Path, manifest: &CargoManifest) -> Result<Vec<Member>, GraphError> {
    let mut members = Vec::new();

    if let Some(pkg) = &manifest.package {
        members.push((
            PackageInfo {
                name: pkg.name.clone(),
                root: root.to_path_buf(),
            },
            manifest.dependency_names(),
        ));
    }

    if let Some(workspace) = &manifest.workspace {
        let patterns = workspace.members.as_deref().unwrap_or(&[]);
        let excludes = workspace.exclude.as_deref().unwrap_or(&[]);

        for pattern in patterns {
            let member_dirs = expand_glob_pattern(root, pattern, excludes)?;

            for member_dir in member_dirs {
                let member_manifest_path = member_dir.join("Cargo.toml");
                if !member_manifest_path.exists() {
                    continue;
                }

                let member_manifest = read_manifest(&member_manifest_path)?;
                let deps = member_manifest.dependency_names();
                if let Some(pkg) = member_manifest.package {
                    members.push((
                        PackageInfo {
                            name: pkg.name,
                            root: member_dir,
                        },
                        deps,
                    ));
                }
            }
        }
    }

    Ok(members)
}

fn expand_glob_pattern(
    root: &Path,
    pattern: &str,
    excludes: &[String],
) -> Result<Vec<PathBuf>, GraphError> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| GraphError::GlobPattern {
            pattern: pattern.to_string(),
            source,
        })?
        .compile_matcher();

    let exclude_matchers: Vec<_> = excludes
        .iter()
        .filter_map(|ex| {
            GlobBuilder::new(ex)
                .literal_separator(true)
                .build()
                .ok()
                .map(|g| g.compile_matcher())
        })
        .collect();

    let mut dirs = Vec::new();
    collect_matching_dirs(root, root, &glob, &exclude_matchers, &mut dirs)?;
    dirs.sort();

    Ok(dirs)
}

fn collect_matching_dirs(
    base: &Path,
    current: &Path,
    glob: &globset::GlobMatcher,
    excludes: &[globset::GlobMatcher],
    results: &mut Vec<PathBuf>,
) -> Result<(), GraphError> {
    let entries = std::fs::read_dir(current)?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();

        if !path.is_dir() {
            continue;
        }

        // Fallback to full path if strip_prefix fails (shouldn't happen in practice)
        let relative = path.strip_prefix(base).unwrap_or(&path);

        if excludes.iter().any(|ex| ex.is_match(relative)) {
            continue;
        }

        if glob.is_match(relative) {
            results.push(path.clone());
        }

        collect_matching_dirs(base, &path, glob, excludes, results)?;
    }

    Ok(())
}
