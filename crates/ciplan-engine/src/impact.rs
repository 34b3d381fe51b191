use ciplan_graph::WorkspaceGraph;
use serde::Serialize;
use tracing::debug;

use crate::classify::ClassifiedPath;

/// Directly and transitively affected packages, by name. `direct` is always
/// a subset of `transitive`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpactSet {
    pub direct: Vec<String>,
    pub transitive: Vec<String>,
    /// Infrastructure escalation applied: every package was taken as
    /// directly affected.
    pub all_packages: bool,
}

impl ImpactSet {
    #[must_use]
    pub fn direct_count(&self) -> usize {
        self.direct.len()
    }

    #[must_use]
    pub fn transitive_count(&self) -> usize {
        self.transitive.len()
    }
}

/// Expands the owning packages of the classified paths to the transitive
/// closure of their dependents.
///
/// Any infra-classified path makes every package direct: CI, toolchain, and
/// cache-key changes invalidate everything uniformly, so graph-based scoping
/// is bypassed on purpose.
#[must_use]
pub fn resolve_impact(classified: &[ClassifiedPath], graph: &WorkspaceGraph) -> ImpactSet {
    let infra = classified.iter().any(ClassifiedPath::is_infra);

    let direct_indices: Vec<usize> = if infra {
        (0..graph.len()).collect()
    } else {
        let mut owners: Vec<usize> = classified.iter().filter_map(|c| c.owner).collect();
        owners.sort_unstable();
        owners.dedup();
        owners
    };

    let transitive_indices = graph.dependents_closure(&direct_indices);

    debug!(
        direct = direct_indices.len(),
        transitive = transitive_indices.len(),
        all_packages = infra,
        "resolved impact"
    );

    ImpactSet {
        direct: names(graph, &direct_indices),
        transitive: names(graph, &transitive_indices),
        all_packages: infra,
    }
}

fn names(graph: &WorkspaceGraph, indices: &[usize]) -> Vec<String> {
    indices.iter().map(|&i| graph.package(i).name.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use ciplan_config::Config;
    use ciplan_core::{ChangedPath, DiffStatus, PackageInfo};
    use std::path::PathBuf;

    fn graph() -> WorkspaceGraph {
        let member = |name: &str, deps: &[&str]| {
            (
                PackageInfo {
                    name: name.to_string(),
                    root: PathBuf::from("/ws").join(name),
                },
                deps.iter().map(ToString::to_string).collect::<Vec<_>>(),
            )
        };
        WorkspaceGraph::build(PathBuf::from("/ws"), vec![
            member("core", &[]),
            member("view", &["core"]),
            member("term", &["view", "core"]),
        ])
        .expect("valid graph")
    }

    fn config() -> Config {
        Config::from_toml_str(
            r#"
infrastructure = ["rust-toolchain.toml"]

[surfaces]
build = ["**/*.rs"]
"#,
        )
        .expect("valid config")
    }

    fn impact_of(paths: &[&str]) -> ImpactSet {
        let changes: Vec<ChangedPath> = paths
            .iter()
            .map(|p| ChangedPath::new(PathBuf::from(p), DiffStatus::Modified))
            .collect();
        let graph = graph();
        let classified = classify(&changes, &config(), &graph);
        resolve_impact(&classified, &graph)
    }

    #[test]
    fn direct_is_subset_of_transitive() {
        let impact = impact_of(&["core/src/lib.rs"]);

        for name in &impact.direct {
            assert!(impact.transitive.contains(name));
        }
    }

    #[test]
    fn dependents_are_pulled_in_transitively() {
        let impact = impact_of(&["core/src/lib.rs"]);

        assert_eq!(impact.direct, vec!["core"]);
        assert_eq!(impact.transitive, vec!["core", "view", "term"]);
    }

    #[test]
    fn leaf_package_impacts_only_itself() {
        let impact = impact_of(&["term/src/main.rs"]);

        assert_eq!(impact.direct, vec!["term"]);
        assert_eq!(impact.transitive, vec!["term"]);
    }

    #[test]
    fn infra_path_makes_all_packages_direct() {
        let impact = impact_of(&["rust-toolchain.toml"]);

        assert!(impact.all_packages);
        assert_eq!(impact.direct, vec!["core", "view", "term"]);
        assert_eq!(impact.direct, impact.transitive);
    }

    #[test]
    fn no_owned_paths_means_empty_impact() {
        let impact = impact_of(&["README.md"]);

        assert!(impact.direct.is_empty());
        assert!(impact.transitive.is_empty());
        assert!(!impact.all_packages);
    }
}
