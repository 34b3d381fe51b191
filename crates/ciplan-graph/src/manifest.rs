use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::GraphError;

#[derive(Debug, Deserialize)]
pub(crate) struct CargoManifest {
    pub(crate) package: Option<Package>,
    pub(crate) workspace: Option<WorkspaceSection>,
    #[serde(default)]
    pub(crate) dependencies: BTreeMap<String, DependencySpec>,
    #[serde(default, rename = "dev-dependencies")]
    pub(crate) dev_dependencies: BTreeMap<String, DependencySpec>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Package {
    pub(crate) name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WorkspaceSection {
    pub(crate) members: Option<Vec<String>>,
    pub(crate) exclude: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum DependencySpec {
    Version(String),
    Detailed(DetailedDependency),
}

#[derive(Debug, Deserialize)]
pub(crate) struct DetailedDependency {
    /// Renames the dependency; the real package name to resolve against.
    pub(crate) package: Option<String>,
}

impl CargoManifest {
    /// Names of every declared dependency, honoring `package = "..."`
    /// renames. Dev-dependencies count: a dependency change invalidates its
    /// dependents' test runs.
    pub(crate) fn dependency_names(&self) -> Vec<String> {
        self.dependencies
            .iter()
            .chain(self.dev_dependencies.iter())
            .map(|(key, spec)| match spec {
                DependencySpec::Detailed(DetailedDependency {
                    package: Some(real),
                }) => real.clone(),
                _ => key.clone(),
            })
            .collect()
    }
}

pub(crate) fn read_manifest(path: &Path) -> Result<CargoManifest, GraphError> {
    let content = std::fs::read_to_string(path).map_err(|source| GraphError::ManifestRead {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| GraphError::ManifestParse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependency_names_include_dev_dependencies() {
        let manifest: CargoManifest = toml::from_str(
            r#"
[package]
name = "pkg-a"

[dependencies]
pkg-b = { path = "../pkg-b" }

[dev-dependencies]
pkg-c = "1.0"
"#,
        )
        .expect("valid manifest");

        let names = manifest.dependency_names();
        assert!(names.contains(&"pkg-b".to_string()));
        assert!(names.contains(&"pkg-c".to_string()));
    }

    #[test]
    fn dependency_rename_uses_real_package_name() {
        let manifest: CargoManifest = toml::from_str(
            r#"
[package]
name = "pkg-a"

[dependencies]
alias = { package = "pkg-real", path = "../pkg-real" }
"#,
        )
        .expect("valid manifest");

        let names = manifest.dependency_names();
        assert_eq!(names, vec!["pkg-real".to_string()]);
    }
}
