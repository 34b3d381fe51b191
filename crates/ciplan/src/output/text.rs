use std::fmt::Write;

use ciplan_engine::Decision;

use super::Renderer;
use crate::error::Result;

pub(crate) struct TextRenderer {
    pub(crate) explain: bool,
}

impl Renderer for TextRenderer {
    fn render(&self, decision: &Decision) -> Result<String> {
        let mut out = String::new();

        match &decision.revisions.base {
            Some(base) => {
                let _ = writeln!(out, "Plan for {base}..{}", decision.revisions.target);
            }
            None => {
                let _ = writeln!(out, "Plan for full tree at {}", decision.revisions.target);
            }
        }
        let _ = writeln!(out, "Policy: {}", decision.policy);

        out.push_str("\nSurfaces:\n");
        for surface in &decision.surfaces {
            let mark = if surface.enabled { "✓" } else { "✗" };
            let _ = writeln!(out, "  {mark} {}", surface.surface);
            if self.explain {
                for reason in &surface.reasons {
                    let _ = writeln!(out, "      {} {}", reason.path, reason.detail);
                }
            }
        }

        if !decision.profiles.is_empty() {
            out.push_str("\nProfiles:\n");
            for profile in &decision.profiles {
                let mark = if profile.enabled { "✓" } else { "✗" };
                let surfaces = profile
                    .surfaces
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                let _ = writeln!(out, "  {mark} {} ({surfaces})", profile.profile);
            }
        }

        let _ = writeln!(
            out,
            "\nImpact: {} direct, {} transitive",
            decision.impact.direct_count(),
            decision.impact.transitive_count()
        );
        if decision.impact.all_packages {
            out.push_str("  (infrastructure change: every package is affected)\n");
        } else if !decision.impact.transitive.is_empty() {
            let _ = writeln!(out, "  {}", decision.impact.transitive.join(", "));
        }

        for warning in &decision.warnings {
            let _ = writeln!(out, "\nwarning: {warning}");
        }

        Ok(out)
    }
}
