use std::fmt::Write;

use ciplan_engine::Decision;

use super::Renderer;
use crate::error::Result;

/// Flat `key=value` lines for CI job outputs, one boolean entry per surface
/// and per profile.
pub(crate) struct KeyValueRenderer;

impl Renderer for KeyValueRenderer {
    fn render(&self, decision: &Decision) -> Result<String> {
        let mut out = String::new();

        for surface in &decision.surfaces {
            let _ = writeln!(
                out,
                "surface_{}={}",
                key(&surface.surface.to_string()),
                surface.enabled
            );
        }
        for profile in &decision.profiles {
            let _ = writeln!(out, "profile_{}={}", key(&profile.profile), profile.enabled);
        }
        let _ = writeln!(out, "impact_direct_count={}", decision.impact.direct_count());
        let _ = writeln!(
            out,
            "impact_transitive_count={}",
            decision.impact.transitive_count()
        );

        Ok(out)
    }
}

/// CI output keys tolerate only word characters.
fn key(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
