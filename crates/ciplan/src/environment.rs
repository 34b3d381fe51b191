use ciplan_config::Provenance;

/// CI platforms that precompute the diff base can inject it here; the value
/// is consumed exactly like an explicit `--base`.
pub const BASE_REV_VAR: &str = "CIPLAN_BASE_REV";

const ACTOR_VARS: &[&str] = &["CIPLAN_ACTOR", "GITHUB_ACTOR"];

pub fn base_rev_override() -> Option<String> {
    std::env::var(BASE_REV_VAR).ok().filter(|v| !v.is_empty())
}

/// Infers change authorship from the CI actor. The first actor variable
/// that is set wins; without a positive bot signal the change is treated
/// as human-authored.
pub fn detect_provenance() -> Provenance {
    for var in ACTOR_VARS {
        if let Ok(actor) = std::env::var(var) {
            if actor.is_empty() {
                continue;
            }
            if actor.ends_with("[bot]") {
                return Provenance::Automated;
            }
            return Provenance::Human;
        }
    }

    Provenance::Human
}
