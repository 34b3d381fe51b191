use std::fs;
use std::path::Path;

use ciplan_graph::{GraphError, discover_graph};
use tempfile::TempDir;

fn write_manifest(dir: &Path, content: &str) -> anyhow::Result<()> {
    fs::create_dir_all(dir)?;
    fs::write(dir.join("Cargo.toml"), content)?;
    Ok(())
}

fn setup_workspace() -> anyhow::Result<TempDir> {
    let dir = TempDir::new()?;
    write_manifest(
        dir.path(),
        r#"
[workspace]
members = ["crates/*"]
"#,
    )?;
    Ok(dir)
}

#[test]
fn discovers_members_and_intra_workspace_edges() -> anyhow::Result<()> {
    let dir = setup_workspace()?;
    write_manifest(
        &dir.path().join("crates/core"),
        r#"
[package]
name = "app-core"
version = "0.1.0"

[dependencies]
serde = "1.0"
"#,
    )?;
    write_manifest(
        &dir.path().join("crates/view"),
        r#"
[package]
name = "app-view"
version = "0.1.0"

[dependencies]
app-core = { path = "../core" }
"#,
    )?;

    let graph = discover_graph(dir.path())?;

    assert_eq!(graph.len(), 2);
    let core = graph.index_of("app-core").expect("core discovered");
    let view = graph.index_of("app-view").expect("view discovered");
    assert_eq!(graph.dependencies_of(view), &[core]);
    assert_eq!(graph.dependents_of(core), &[view]);
    Ok(())
}

#[test]
fn discovery_walks_up_from_member_directory() -> anyhow::Result<()> {
    let dir = setup_workspace()?;
    write_manifest(
        &dir.path().join("crates/core"),
        r#"
[package]
name = "app-core"
version = "0.1.0"
"#,
    )?;

    let graph = discover_graph(&dir.path().join("crates/core"))?;

    assert_eq!(graph.len(), 1);
    assert_eq!(graph.root().canonicalize()?, dir.path().canonicalize()?);
    Ok(())
}

#[test]
fn cycle_across_manifests_is_rejected() -> anyhow::Result<()> {
    let dir = setup_workspace()?;
    write_manifest(
        &dir.path().join("crates/a"),
        r#"
[package]
name = "pkg-a"
version = "0.1.0"

[dependencies]
pkg-b = { path = "../b" }
"#,
    )?;
    write_manifest(
        &dir.path().join("crates/b"),
        r#"
[package]
name = "pkg-b"
version = "0.1.0"

[dependencies]
pkg-a = { path = "../a" }
"#,
    )?;

    let result = discover_graph(dir.path());

    match result {
        Err(GraphError::CycleDetected { cycle }) => {
            assert!(cycle.contains(&"pkg-a".to_string()));
            assert!(cycle.contains(&"pkg-b".to_string()));
        }
        other => panic!("expected cycle error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn duplicate_name_across_manifests_is_rejected() -> anyhow::Result<()> {
    let dir = setup_workspace()?;
    write_manifest(
        &dir.path().join("crates/a"),
        r#"
[package]
name = "same-name"
version = "0.1.0"
"#,
    )?;
    write_manifest(
        &dir.path().join("crates/b"),
        r#"
[package]
name = "same-name"
version = "0.1.0"
"#,
    )?;

    let result = discover_graph(dir.path());

    assert!(matches!(
        result,
        Err(GraphError::DuplicatePackageName { name, .. }) if name == "same-name"
    ));
    Ok(())
}

#[test]
fn single_package_project_is_a_one_node_graph() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    write_manifest(
        dir.path(),
        r#"
[package]
name = "solo"
version = "0.1.0"
"#,
    )?;

    let graph = discover_graph(dir.path())?;

    assert_eq!(graph.len(), 1);
    assert_eq!(graph.package(0).name, "solo");
    Ok(())
}

#[test]
fn missing_workspace_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let result = discover_graph(dir.path());
    assert!(matches!(result, Err(GraphError::NotFound { .. })));
}
