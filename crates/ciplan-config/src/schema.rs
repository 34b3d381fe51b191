use indexmap::IndexMap;
use serde::Deserialize;

use crate::policy::ConfidencePolicy;

/// Raw on-disk shape of `ciplan.toml`. Converted into the validated
/// [`crate::Config`] before anything else sees it.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawConfig {
    /// Glob patterns whose match forces the `infra` surface and
    /// all-packages-direct impact.
    #[serde(default)]
    pub(crate) infrastructure: Vec<String>,

    #[serde(default)]
    pub(crate) policy: RawPolicy,

    #[serde(default)]
    pub(crate) surfaces: RawSurfaces,

    #[serde(default)]
    pub(crate) profiles: IndexMap<String, RawProfile>,

    /// External pipeline job name -> profile name.
    #[serde(default)]
    pub(crate) workflow: IndexMap<String, String>,

    /// Surface name -> shell command, consumed by the `run` convenience
    /// layer.
    #[serde(default)]
    pub(crate) commands: IndexMap<String, String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawPolicy {
    pub(crate) default: Option<ConfidencePolicy>,
    /// Override applied to automated (bot-authored) changes.
    pub(crate) automated: Option<ConfidencePolicy>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawSurfaces {
    #[serde(default)]
    pub(crate) build: Vec<String>,
    #[serde(default)]
    pub(crate) test: Vec<String>,
    #[serde(default)]
    pub(crate) docs: Vec<String>,
    #[serde(default)]
    pub(crate) custom: IndexMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawProfile {
    pub(crate) surfaces: Vec<String>,
    #[serde(default, rename = "merge-base")]
    pub(crate) merge_base: bool,
}
