use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Identifier of a classification surface. Builtin surfaces and
/// user-declared custom surfaces are one tagged value so every stage treats
/// them uniformly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SurfaceId {
    Build,
    Test,
    Docs,
    Infra,
    Custom(String),
}

impl SurfaceId {
    #[must_use]
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }

    #[must_use]
    pub fn is_infra(&self) -> bool {
        matches!(self, Self::Infra)
    }

    /// All builtin surfaces, in their canonical order.
    #[must_use]
    pub fn builtins() -> [Self; 4] {
        [Self::Build, Self::Test, Self::Docs, Self::Infra]
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build => write!(f, "build"),
            Self::Test => write!(f, "test"),
            Self::Docs => write!(f, "docs"),
            Self::Infra => write!(f, "infra"),
            Self::Custom(name) => write!(f, "custom:{name}"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown surface '{name}' (expected build, test, docs, infra, or custom:<name>)")]
pub struct InvalidSurfaceName {
    pub name: String,
}

impl FromStr for SurfaceId {
    type Err = InvalidSurfaceName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "build" => Ok(Self::Build),
            "test" => Ok(Self::Test),
            "docs" => Ok(Self::Docs),
            "infra" => Ok(Self::Infra),
            other => match other.strip_prefix("custom:") {
                Some(name) if !name.is_empty() => Ok(Self::Custom(name.to_string())),
                _ => Err(InvalidSurfaceName {
                    name: other.to_string(),
                }),
            },
        }
    }
}

impl Serialize for SurfaceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_names_round_trip() {
        for id in SurfaceId::builtins() {
            let parsed: SurfaceId = id.to_string().parse().expect("builtin should parse");
            assert_eq!(parsed, id);
        }
    }

    #[test]
    fn custom_name_round_trips_with_prefix() {
        let id = SurfaceId::custom("themes");
        assert_eq!(id.to_string(), "custom:themes");
        assert_eq!("custom:themes".parse::<SurfaceId>(), Ok(id));
    }

    #[test]
    fn bare_unknown_name_is_rejected() {
        let err = "themes".parse::<SurfaceId>().expect_err("should reject");
        assert_eq!(err.name, "themes");
    }

    #[test]
    fn empty_custom_name_is_rejected() {
        assert!("custom:".parse::<SurfaceId>().is_err());
    }

    #[test]
    fn infra_is_flagged() {
        assert!(SurfaceId::Infra.is_infra());
        assert!(!SurfaceId::Build.is_infra());
    }
}
