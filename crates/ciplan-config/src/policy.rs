use std::fmt;

use serde::{Deserialize, Serialize};

/// Escalation rule for classification ambiguity.
///
/// `Balanced` escalates to "activate everything" only for paths that match
/// no surface and belong to no package. `Strict` escalates on any
/// ambiguity: unowned paths, renames, binary files, and deletions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidencePolicy {
    #[default]
    Balanced,
    Strict,
}

impl fmt::Display for ConfidencePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Balanced => "balanced",
            Self::Strict => "strict",
        };
        write!(f, "{s}")
    }
}

/// Who authored the change under review. Automated changes (dependency
/// bumps and the like) carry less contextual certainty about blast radius,
/// so they default to the stricter policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provenance {
    #[default]
    Human,
    Automated,
}
