use std::fmt;
use std::path::Path;

use ciplan_core::SurfaceId;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use indexmap::IndexMap;

use crate::error::ConfigError;
use crate::policy::{ConfidencePolicy, Provenance};
use crate::schema::RawConfig;

/// A named classification bucket with its ordered glob pattern list.
#[derive(Debug, Clone)]
pub struct Surface {
    id: SurfaceId,
    patterns: Vec<String>,
    set: GlobSet,
}

impl Surface {
    fn compile(id: SurfaceId, patterns: Vec<String>) -> Result<Self, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            // Literal separators: `*` must not cross directory boundaries,
            // otherwise `*.md` would own every nested markdown file.
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|source| ConfigError::GlobPattern {
                    surface: id.to_string(),
                    pattern: pattern.clone(),
                    source,
                })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|source| ConfigError::GlobPattern {
            surface: id.to_string(),
            pattern: patterns.join(", "),
            source,
        })?;

        Ok(Self { id, patterns, set })
    }

    #[must_use]
    pub fn id(&self) -> &SurfaceId {
        &self.id
    }

    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    #[must_use]
    pub fn is_match(&self, path: &Path) -> bool {
        self.set.is_match(path)
    }

    /// Every pattern of this surface that matches the path, in declaration
    /// order. Retained so decisions can explain themselves.
    #[must_use]
    pub fn matched_patterns(&self, path: &Path) -> Vec<&str> {
        self.set
            .matches(path)
            .into_iter()
            .map(|i| self.patterns[i].as_str())
            .collect()
    }
}

/// A bundle of required surfaces corresponding to one external pipeline job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub surfaces: Vec<SurfaceId>,
    pub merge_base: bool,
}

/// Validated, immutable configuration. Threaded explicitly into every
/// component; there is no ambient global.
#[derive(Debug, Clone)]
pub struct Config {
    surfaces: Vec<Surface>,
    default_policy: ConfidencePolicy,
    automated_policy: ConfidencePolicy,
    profiles: IndexMap<String, Profile>,
    workflow: IndexMap<String, String>,
    commands: IndexMap<SurfaceId, String>,
}

impl Config {
    /// Reads and validates the configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, does not parse, or
    /// fails semantic validation (duplicate surfaces, bad globs, undeclared
    /// profile or surface references).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`], minus the read step.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let mut surfaces = vec![
            Surface::compile(SurfaceId::Build, raw.surfaces.build)?,
            Surface::compile(SurfaceId::Test, raw.surfaces.test)?,
            Surface::compile(SurfaceId::Docs, raw.surfaces.docs)?,
            Surface::compile(SurfaceId::Infra, raw.infrastructure)?,
        ];

        for (name, patterns) in raw.surfaces.custom {
            if name.is_empty() || name.contains(':') {
                return Err(ConfigError::InvalidSurfaceName { name });
            }
            if name.parse::<SurfaceId>().is_ok() {
                // A custom surface shadowing a builtin would make the name
                // ambiguous everywhere downstream.
                return Err(ConfigError::DuplicateSurface { name });
            }
            surfaces.push(Surface::compile(SurfaceId::custom(name), patterns)?);
        }

        let mut profiles = IndexMap::new();
        for (name, profile) in raw.profiles {
            let mut required = Vec::new();
            for surface_ref in &profile.surfaces {
                let id = resolve_surface_ref(surface_ref, &surfaces).ok_or_else(|| {
                    ConfigError::UnknownSurface {
                        profile: name.clone(),
                        surface: surface_ref.clone(),
                    }
                })?;
                required.push(id);
            }
            profiles.insert(name, Profile {
                surfaces: required,
                merge_base: profile.merge_base,
            });
        }

        for (job, profile) in &raw.workflow {
            if !profiles.contains_key(profile) {
                return Err(ConfigError::UnknownProfile {
                    job: job.clone(),
                    profile: profile.clone(),
                });
            }
        }

        let mut commands = IndexMap::new();
        for (surface_ref, command) in raw.commands {
            let id = resolve_surface_ref(&surface_ref, &surfaces).ok_or(
                ConfigError::UnknownCommandSurface {
                    surface: surface_ref,
                },
            )?;
            commands.insert(id, command);
        }

        Ok(Self {
            surfaces,
            default_policy: raw.policy.default.unwrap_or_default(),
            automated_policy: raw.policy.automated.unwrap_or(ConfidencePolicy::Strict),
            profiles,
            workflow: raw.workflow,
            commands,
        })
    }

    #[must_use]
    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    #[must_use]
    pub fn surface(&self, id: &SurfaceId) -> Option<&Surface> {
        self.surfaces.iter().find(|s| s.id() == id)
    }

    #[must_use]
    pub fn policy_for(&self, provenance: Provenance) -> ConfidencePolicy {
        match provenance {
            Provenance::Human => self.default_policy,
            Provenance::Automated => self.automated_policy,
        }
    }

    #[must_use]
    pub fn profiles(&self) -> &IndexMap<String, Profile> {
        &self.profiles
    }

    #[must_use]
    pub fn workflow(&self) -> &IndexMap<String, String> {
        &self.workflow
    }

    #[must_use]
    pub fn command_for(&self, id: &SurfaceId) -> Option<&str> {
        self.commands.get(id).map(String::as_str)
    }

    /// Non-fatal findings for the strict validation mode: declarations that
    /// are structurally fine but unreachable from any pipeline job.
    #[must_use]
    pub fn lint(&self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        for surface in &self.surfaces {
            if surface.patterns().is_empty() || surface.id().is_infra() {
                continue;
            }
            let required = self
                .profiles
                .values()
                .any(|p| p.surfaces.contains(surface.id()));
            if !required {
                warnings.push(ValidationWarning::UnusedSurface {
                    surface: surface.id().clone(),
                });
            }
        }

        for profile in self.profiles.keys() {
            if !self.workflow.values().any(|p| p == profile) {
                warnings.push(ValidationWarning::UnmappedProfile {
                    profile: profile.clone(),
                });
            }
        }

        warnings
    }
}

/// Profile and command entries may reference a custom surface either bare
/// (`themes`) or prefixed (`custom:themes`); builtins by their name.
fn resolve_surface_ref(surface_ref: &str, surfaces: &[Surface]) -> Option<SurfaceId> {
    if let Ok(id) = surface_ref.parse::<SurfaceId>() {
        return surfaces.iter().any(|s| *s.id() == id).then_some(id);
    }

    let bare = SurfaceId::custom(surface_ref);
    surfaces.iter().any(|s| *s.id() == bare).then_some(bare)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    UnusedSurface { surface: SurfaceId },
    UnmappedProfile { profile: String },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnusedSurface { surface } => {
                write!(f, "surface '{surface}' is required by no profile")
            }
            Self::UnmappedProfile { profile } => {
                write!(f, "profile '{profile}' is mapped to no workflow job")
            }
        }
    }
}
