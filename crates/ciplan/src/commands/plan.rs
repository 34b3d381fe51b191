use std::path::Path;

use ciplan_core::SurfaceId;
use ciplan_engine::Decision;

use super::{Format, PlanArgs, baseline, compute_plan};
use crate::error::{CliError, Result};
use crate::output::{JsonRenderer, KeyValueRenderer, Renderer, TextRenderer};

pub(crate) fn run(args: &PlanArgs, start_path: &Path) -> Result<()> {
    let base = baseline(args.base.as_deref(), args.merge_base.as_deref(), args.all);
    let planned = compute_plan(start_path, base, args.provenance.resolve())?;
    let mut decision = planned.decision;

    // The receipt always carries the unfiltered decision.
    if let Some(receipt) = &args.receipt {
        let document = serde_json::to_string_pretty(&decision)?;
        std::fs::write(receipt, document).map_err(|source| CliError::Receipt {
            path: receipt.clone(),
            source,
        })?;
    }

    if let Some(name) = &args.surface {
        let id = resolve_surface(name, &decision)?;
        decision.surfaces.retain(|s| s.surface == id);
        decision.profiles.clear();
    }

    let rendered = match args.format {
        Format::Text => TextRenderer {
            explain: args.explain,
        }
        .render(&decision)?,
        Format::Json => JsonRenderer.render(&decision)?,
        Format::Kv => KeyValueRenderer.render(&decision)?,
    };
    print!("{rendered}");

    Ok(())
}

/// A custom surface may be referenced bare (`themes`) or prefixed
/// (`custom:themes`), matching how profiles reference surfaces.
fn resolve_surface(name: &str, decision: &Decision) -> Result<SurfaceId> {
    if let Ok(id) = name.parse::<SurfaceId>() {
        if decision.surface(&id).is_some() {
            return Ok(id);
        }
    }

    let bare = SurfaceId::custom(name);
    if decision.surface(&bare).is_some() {
        return Ok(bare);
    }

    Err(CliError::SurfaceNotConfigured {
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::sample_decision;

    #[test]
    fn builtin_surface_resolves_by_name() {
        let decision = sample_decision();

        let id = resolve_surface("build", &decision).expect("resolves");

        assert_eq!(id, SurfaceId::Build);
    }

    #[test]
    fn unconfigured_surface_is_an_error() {
        let decision = sample_decision();

        let result = resolve_surface("nope", &decision);

        assert!(matches!(
            result,
            Err(CliError::SurfaceNotConfigured { name }) if name == "nope"
        ));
    }
}
