use ciplan_config::Config;
use ciplan_core::{ChangedPath, SurfaceId};
use ciplan_graph::WorkspaceGraph;

/// One surface hit for a path, with the glob pattern that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceMatch {
    pub surface: SurfaceId,
    pub pattern: String,
}

#[derive(Debug, Clone)]
pub struct ClassifiedPath {
    pub change: ChangedPath,
    pub matches: Vec<SurfaceMatch>,
    /// Owning package index into the workspace graph, if any.
    pub owner: Option<usize>,
}

impl ClassifiedPath {
    /// Matched by no surface pattern and owned by no package.
    #[must_use]
    pub fn is_unowned(&self) -> bool {
        self.matches.is_empty() && self.owner.is_none()
    }

    #[must_use]
    pub fn is_infra(&self) -> bool {
        self.matches.iter().any(|m| m.surface.is_infra())
    }
}

/// Tags every changed path with its matching surfaces and owning package.
///
/// Pure function of (paths, configuration, graph): surfaces are evaluated in
/// configuration order against the full repository-relative path, and every
/// matching pattern is recorded. Infra-classified paths skip ownership
/// resolution; they activate globally rather than scoping to a package.
#[must_use]
pub fn classify(
    changes: &[ChangedPath],
    config: &Config,
    graph: &WorkspaceGraph,
) -> Vec<ClassifiedPath> {
    changes
        .iter()
        .map(|change| classify_one(change, config, graph))
        .collect()
}

fn classify_one(change: &ChangedPath, config: &Config, graph: &WorkspaceGraph) -> ClassifiedPath {
    let mut matches = Vec::new();
    for surface in config.surfaces() {
        for pattern in surface.matched_patterns(&change.path) {
            matches.push(SurfaceMatch {
                surface: surface.id().clone(),
                pattern: pattern.to_string(),
            });
        }
    }

    let infra = matches.iter().any(|m| m.surface.is_infra());
    let owner = if infra {
        None
    } else {
        graph.owner_of(&change.path)
    };

    ClassifiedPath {
        change: change.clone(),
        matches,
        owner,
    }
}
