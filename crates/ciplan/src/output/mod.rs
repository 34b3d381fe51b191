mod json;
mod kv;
mod text;

pub(crate) use json::JsonRenderer;
pub(crate) use kv::KeyValueRenderer;
pub(crate) use text::TextRenderer;

use ciplan_engine::Decision;

use crate::error::Result;

/// A projection of one computed `Decision`; renderers never re-derive
/// classification or impact logic.
pub(crate) trait Renderer {
    fn render(&self, decision: &Decision) -> Result<String>;
}

#[cfg(test)]
pub(crate) fn sample_decision() -> Decision {
    use ciplan_config::ConfidencePolicy;
    use ciplan_core::SurfaceId;
    use ciplan_engine::{ImpactSet, ProfileDecision, Reason, Revisions, SurfaceDecision};

    Decision {
        surfaces: vec![
            SurfaceDecision {
                surface: SurfaceId::Build,
                enabled: true,
                reasons: vec![Reason {
                    surface: SurfaceId::Build,
                    path: "core/src/lib.rs".to_string(),
                    detail: "matched pattern '**/*.rs'".to_string(),
                }],
            },
            SurfaceDecision {
                surface: SurfaceId::Docs,
                enabled: false,
                reasons: Vec::new(),
            },
            SurfaceDecision {
                surface: SurfaceId::custom("themes"),
                enabled: false,
                reasons: Vec::new(),
            },
        ],
        profiles: vec![ProfileDecision {
            profile: "ci".to_string(),
            enabled: true,
            surfaces: vec![SurfaceId::Build, SurfaceId::Test],
        }],
        impact: ImpactSet {
            direct: vec!["core".to_string()],
            transitive: vec!["core".to_string(), "view".to_string()],
            all_packages: false,
        },
        revisions: Revisions {
            base: Some("aaaa1111".to_string()),
            target: "bbbb2222".to_string(),
        },
        policy: ConfidencePolicy::Balanced,
        warnings: vec!["uncommitted local changes were ignored".to_string()],
    }
}
