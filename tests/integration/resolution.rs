//! Library-level resolution against an on-disk Maven repository.

use crate::common::TestRepository;
use anyhow::Result;
use mvnr_cli::coordinate::Coordinate;
use mvnr_cli::core::MvnrError;
use mvnr_cli::fetch::LocalRepository;
use mvnr_cli::profile::ProfileConstraints;
use mvnr_cli::resolver::{Resolution, Resolver};
use mvnr_cli::test_utils::{DependencyFixture, PomBuilder};
use std::sync::Arc;

async fn resolve(repo: &TestRepository, roots: &[&str], boms: &[&str]) -> Result<Resolution> {
    let resolver = Resolver::new(Arc::new(LocalRepository::new(repo.root())));
    let roots = roots.iter().map(|r| Coordinate::parse(r)).collect::<Result<Vec<_>, _>>()?;
    let boms = boms.iter().map(|b| Coordinate::parse(b)).collect::<Result<Vec<_>, _>>()?;
    resolver.resolve(&roots, &ProfileConstraints::new(), &boms).await
}

fn versions(resolution: &Resolution) -> Vec<String> {
    resolution
        .dependencies
        .iter()
        .map(|d| format!("{}:{}", d.artifact_id, d.version))
        .collect()
}

#[tokio::test]
async fn test_range_against_version_directories() -> Result<()> {
    let repo = TestRepository::new()?;
    repo.add_pom(
        "org.example:app:1.0.0",
        &PomBuilder::new("org.example:app:1.0.0").dependency("org.example:lib:[1.0,2.0)"),
    )?;
    for version in ["1.0.0", "1.5.0", "2.0.0"] {
        repo.add_leaf(&format!("org.example:lib:{version}"))?;
    }

    let resolution = resolve(&repo, &["org.example:app:1.0.0"], &[]).await?;
    assert_eq!(versions(&resolution), ["app:1.0.0", "lib:1.5.0"]);
    Ok(())
}

#[tokio::test]
async fn test_metadata_file_drives_release() -> Result<()> {
    let repo = TestRepository::new()?;
    repo.add_leaf("org.example:lib:1.1")?;
    repo.add_leaf("org.example:lib:1.2-SNAPSHOT")?;
    let metadata = r"<metadata>
  <groupId>org.example</groupId>
  <artifactId>lib</artifactId>
  <versioning>
    <release>1.1</release>
    <versions>
      <version>1.0</version>
      <version>1.1</version>
      <version>1.2-SNAPSHOT</version>
    </versions>
  </versioning>
</metadata>";
    let dir = LocalRepository::new(repo.root()).artifact_dir("org.example", "lib");
    std::fs::write(dir.join("maven-metadata-local.xml"), metadata)?;

    let resolution = resolve(&repo, &["org.example:lib:RELEASE"], &[]).await?;
    assert_eq!(versions(&resolution), ["lib:1.1"]);

    let resolution = resolve(&repo, &["org.example:lib:LATEST"], &[]).await?;
    assert_eq!(versions(&resolution), ["lib:1.2-SNAPSHOT"]);
    Ok(())
}

#[tokio::test]
async fn test_parent_properties_and_imported_bom() -> Result<()> {
    let repo = TestRepository::new()?;
    repo.add_pom(
        "org.example:platform-bom:1",
        &PomBuilder::new("org.example:platform-bom:1")
            .packaging("pom")
            .property("lib.version", "2.1")
            .managed("org.example:lib:${lib.version}"),
    )?;
    repo.add_pom(
        "org.example:corp-parent:1",
        &PomBuilder::new("org.example:corp-parent:1")
            .packaging("pom")
            .property("util.version", "3.0")
            .import_bom("org.example:platform-bom:1"),
    )?;
    repo.add_pom(
        "org.example:app:1",
        &PomBuilder::new("org.example:app:1")
            .parent("org.example:corp-parent:1")
            .dependency("org.example:lib")
            .dependency("org.example:util:${util.version}"),
    )?;
    repo.add_leaf("org.example:lib:2.1")?;
    repo.add_leaf("org.example:util:3.0")?;

    let resolution = resolve(&repo, &["org.example:app:1"], &[]).await?;
    assert_eq!(versions(&resolution), ["app:1", "lib:2.1", "util:3.0"]);
    Ok(())
}

#[tokio::test]
async fn test_caller_bom_and_mediation() -> Result<()> {
    let repo = TestRepository::new()?;
    repo.add_pom(
        "org.example:bom:1",
        &PomBuilder::new("org.example:bom:1").packaging("pom").managed("org.example:core:4.0"),
    )?;
    repo.add_pom(
        "org.example:web:1",
        &PomBuilder::new("org.example:web:1")
            .dependency("org.example:core")
            .dependency(
                DependencyFixture::new("org.example:json:1").exclude("org.example", "legacy"),
            ),
    )?;
    repo.add_pom(
        "org.example:json:1",
        &PomBuilder::new("org.example:json:1")
            .dependency("org.example:legacy:1")
            .dependency("org.example:core:3.0"),
    )?;
    repo.add_leaf("org.example:core:3.0")?;
    repo.add_leaf("org.example:core:4.0")?;
    repo.add_leaf("org.example:legacy:1")?;

    let resolution = resolve(&repo, &["org.example:web:1"], &["org.example:bom:1"]).await?;
    assert_eq!(versions(&resolution), ["web:1", "core:4.0", "json:1"]);
    // the BOM also pins the transitive request
    assert!(
        resolution
            .render_tree()
            .contains("org.example:core:jar:4.0:compile (requested 3.0) (omitted for duplicate)")
    );
    Ok(())
}

#[tokio::test]
async fn test_missing_root_reports_descriptor_not_found() -> Result<()> {
    let repo = TestRepository::new()?;
    let err = resolve(&repo, &["org.example:ghost:1"], &[]).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MvnrError>(),
        Some(MvnrError::DescriptorNotFound { .. })
    ));
    Ok(())
}
