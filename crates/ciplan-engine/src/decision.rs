use ciplan_config::{ConfidencePolicy, Config, Provenance};
use ciplan_core::{ChangedPath, DiffStatus, SurfaceId};
use ciplan_graph::WorkspaceGraph;
use serde::Serialize;
use tracing::debug;

use crate::classify::{ClassifiedPath, classify};
use crate::impact::{ImpactSet, resolve_impact};

/// Why a surface was activated: the path that contributed and either the
/// matching pattern or the policy escalation that forced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reason {
    pub surface: SurfaceId,
    pub path: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurfaceDecision {
    pub surface: SurfaceId,
    pub enabled: bool,
    pub reasons: Vec<Reason>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileDecision {
    pub profile: String,
    pub enabled: bool,
    pub surfaces: Vec<SurfaceId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Revisions {
    pub base: Option<String>,
    pub target: String,
}

/// The final planning output. Every renderer is a projection of this value;
/// none re-derives classification or impact logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub surfaces: Vec<SurfaceDecision>,
    pub profiles: Vec<ProfileDecision>,
    pub impact: ImpactSet,
    pub revisions: Revisions,
    pub policy: ConfidencePolicy,
    pub warnings: Vec<String>,
}

impl Decision {
    #[must_use]
    pub fn surface(&self, id: &SurfaceId) -> Option<&SurfaceDecision> {
        self.surfaces.iter().find(|s| s.surface == *id)
    }

    #[must_use]
    pub fn is_enabled(&self, id: &SurfaceId) -> bool {
        self.surface(id).is_some_and(|s| s.enabled)
    }
}

pub struct PlanRequest<'a> {
    pub config: &'a Config,
    pub graph: &'a WorkspaceGraph,
    pub changes: &'a [ChangedPath],
    pub revisions: Revisions,
    pub provenance: Provenance,
    pub dirty_ignored: bool,
}

/// Computes the full plan: classification, impact, and per-surface and
/// per-profile activation.
///
/// Stateless: identical (configuration, change set) input yields an
/// identical Decision. Ambiguity never aborts; the active confidence policy
/// absorbs it into a conservative activation recorded in the reasons.
#[must_use]
pub fn plan(request: PlanRequest<'_>) -> Decision {
    let classified = classify(request.changes, request.config, request.graph);
    let impact = resolve_impact(&classified, request.graph);
    let policy = request.config.policy_for(request.provenance);

    let escalations: Vec<(&ClassifiedPath, &'static str)> = classified
        .iter()
        .filter_map(|c| fallback_trigger(c, policy).map(|t| (c, t)))
        .collect();

    let mut surfaces = Vec::new();
    for surface in request.config.surfaces() {
        let mut reasons: Vec<Reason> = Vec::new();

        for c in &classified {
            for m in &c.matches {
                if m.surface == *surface.id() {
                    reasons.push(Reason {
                        surface: m.surface.clone(),
                        path: c.change.path.display().to_string(),
                        detail: format!("matched pattern '{}'", m.pattern),
                    });
                }
            }
        }

        let matched = !reasons.is_empty();

        for (c, trigger) in &escalations {
            reasons.push(Reason {
                surface: surface.id().clone(),
                path: c.change.path.display().to_string(),
                detail: format!("{trigger} under {policy} policy"),
            });
        }

        surfaces.push(SurfaceDecision {
            surface: surface.id().clone(),
            enabled: matched || !escalations.is_empty(),
            reasons,
        });
    }

    let profiles = request
        .config
        .profiles()
        .iter()
        .map(|(name, profile)| {
            let enabled = profile.surfaces.iter().any(|id| {
                surfaces
                    .iter()
                    .any(|s| s.surface == *id && s.enabled)
            });
            ProfileDecision {
                profile: name.clone(),
                enabled,
                surfaces: profile.surfaces.clone(),
            }
        })
        .collect();

    let mut warnings = Vec::new();
    if request.dirty_ignored {
        warnings.push("uncommitted local changes were ignored".to_string());
    }
    if !escalations.is_empty() {
        warnings.push(format!(
            "{} ambiguous path(s) escalated all surfaces under {policy} policy",
            escalations.len()
        ));
    }

    debug!(
        surfaces = surfaces.len(),
        escalations = escalations.len(),
        "decision computed"
    );

    Decision {
        surfaces,
        profiles,
        impact,
        revisions: request.revisions,
        policy,
        warnings,
    }
}

/// The condition, if any, under which this path forces the fallback under
/// the given policy.
fn fallback_trigger(c: &ClassifiedPath, policy: ConfidencePolicy) -> Option<&'static str> {
    match policy {
        ConfidencePolicy::Balanced => c.is_unowned().then_some("unowned path"),
        ConfidencePolicy::Strict => {
            if c.is_unowned() {
                Some("unowned path")
            } else if c.change.status == DiffStatus::Renamed {
                Some("renamed path")
            } else if c.change.binary {
                Some("binary path")
            } else if c.change.status == DiffStatus::Deleted && c.owner.is_none() {
                Some("deleted shared path")
            } else {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ciplan_core::PackageInfo;
    use std::path::PathBuf;

    fn graph() -> WorkspaceGraph {
        WorkspaceGraph::build(PathBuf::from("/ws"), vec![(
            PackageInfo {
                name: "app".to_string(),
                root: PathBuf::from("/ws/app"),
            },
            vec![],
        )])
        .expect("valid graph")
    }

    fn config() -> Config {
        Config::from_toml_str(
            r#"
[surfaces]
build = ["**/*.rs"]
docs = ["book/**"]

[profiles.ci]
surfaces = ["build", "test"]

[profiles.pages]
surfaces = ["docs"]
"#,
        )
        .expect("valid config")
    }

    fn plan_for(changes: &[ChangedPath], provenance: Provenance) -> Decision {
        let config = config();
        let graph = graph();
        plan(PlanRequest {
            config: &config,
            graph: &graph,
            changes,
            revisions: Revisions {
                base: Some("base".to_string()),
                target: "target".to_string(),
            },
            provenance,
            dirty_ignored: false,
        })
    }

    fn changed(path: &str) -> ChangedPath {
        ChangedPath::new(PathBuf::from(path), DiffStatus::Modified)
    }

    #[test]
    fn surface_enabled_by_direct_match_only() {
        let decision = plan_for(&[changed("app/src/lib.rs")], Provenance::Human);

        assert!(decision.is_enabled(&SurfaceId::Build));
        assert!(!decision.is_enabled(&SurfaceId::Docs));
        assert!(!decision.is_enabled(&SurfaceId::Test));
    }

    #[test]
    fn profile_enabled_when_any_required_surface_is() {
        let decision = plan_for(&[changed("app/src/lib.rs")], Provenance::Human);

        let ci = decision
            .profiles
            .iter()
            .find(|p| p.profile == "ci")
            .expect("ci profile");
        assert!(ci.enabled);

        let pages = decision
            .profiles
            .iter()
            .find(|p| p.profile == "pages")
            .expect("pages profile");
        assert!(!pages.enabled);
    }

    #[test]
    fn match_reason_names_path_and_pattern() {
        let decision = plan_for(&[changed("app/src/lib.rs")], Provenance::Human);

        let build = decision.surface(&SurfaceId::Build).expect("build surface");
        assert_eq!(build.reasons.len(), 1);
        assert_eq!(build.reasons[0].path, "app/src/lib.rs");
        assert!(build.reasons[0].detail.contains("**/*.rs"));
    }

    #[test]
    fn balanced_policy_ignores_renames_of_owned_files() {
        let change = ChangedPath::new(PathBuf::from("app/src/new.rs"), DiffStatus::Renamed)
            .with_old_path(PathBuf::from("app/src/old.rs"));

        let decision = plan_for(&[change], Provenance::Human);

        // Owned and matched: no escalation, docs stays off.
        assert!(!decision.is_enabled(&SurfaceId::Docs));
        assert!(decision.warnings.is_empty());
    }

    #[test]
    fn automated_provenance_escalates_renames() {
        let change = ChangedPath::new(PathBuf::from("app/src/new.rs"), DiffStatus::Renamed)
            .with_old_path(PathBuf::from("app/src/old.rs"));

        let decision = plan_for(&[change], Provenance::Automated);

        assert!(decision.is_enabled(&SurfaceId::Docs));
        assert!(decision.surfaces.iter().all(|s| s.enabled));
        assert_eq!(decision.warnings.len(), 1);
    }

    #[test]
    fn automated_provenance_escalates_binary_files() {
        let change = ChangedPath::new(PathBuf::from("app/assets/icon.png"), DiffStatus::Modified)
            .with_binary(true);

        let decision = plan_for(&[change], Provenance::Automated);

        assert!(decision.surfaces.iter().all(|s| s.enabled));
        let docs = decision.surface(&SurfaceId::Docs).expect("docs surface");
        assert!(
            docs.reasons[0]
                .detail
                .contains("binary path under strict policy")
        );
    }

    #[test]
    fn balanced_policy_ignores_owned_binary_files() {
        let change = ChangedPath::new(PathBuf::from("app/assets/icon.png"), DiffStatus::Modified)
            .with_binary(true);

        let decision = plan_for(&[change], Provenance::Human);

        assert!(decision.surfaces.iter().all(|s| !s.enabled));
        assert!(decision.warnings.is_empty());
    }

    #[test]
    fn unowned_path_escalates_under_balanced_policy() {
        let decision = plan_for(&[changed("mystery/file.xyz")], Provenance::Human);

        assert!(decision.surfaces.iter().all(|s| s.enabled));
        let build = decision.surface(&SurfaceId::Build).expect("build surface");
        assert!(
            build.reasons[0]
                .detail
                .contains("unowned path under balanced policy")
        );
    }

    #[test]
    fn dirty_worktree_becomes_a_warning() {
        let config = config();
        let graph = graph();
        let decision = plan(PlanRequest {
            config: &config,
            graph: &graph,
            changes: &[changed("app/src/lib.rs")],
            revisions: Revisions {
                base: None,
                target: "target".to_string(),
            },
            provenance: Provenance::Human,
            dirty_ignored: true,
        });

        assert_eq!(decision.warnings, vec![
            "uncommitted local changes were ignored".to_string()
        ]);
    }

    #[test]
    fn empty_change_set_disables_everything() {
        let decision = plan_for(&[], Provenance::Human);

        assert!(decision.surfaces.iter().all(|s| !s.enabled));
        assert!(decision.profiles.iter().all(|p| !p.enabled));
        assert!(decision.impact.direct.is_empty());
    }
}
