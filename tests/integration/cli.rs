//! Output formats and error reporting of the `mvnr` binary.

use crate::common::TestRepository;
use anyhow::Result;
use assert_cmd::Command;
use mvnr_cli::test_utils::PomBuilder;
use predicates::prelude::*;

fn repository() -> Result<TestRepository> {
    let repo = TestRepository::new()?;
    repo.add_pom(
        "org.example:app:1.0.0",
        &PomBuilder::new("org.example:app:1.0.0")
            .dependency("org.example:lib:[1.0,2.0)")
            .dependency("org.example:util:2.0"),
    )?;
    repo.add_pom(
        "org.example:lib:1.5.0",
        &PomBuilder::new("org.example:lib:1.5.0").dependency("org.example:util:1.0"),
    )?;
    repo.add_leaf("org.example:lib:2.0.0")?;
    repo.add_leaf("org.example:util:1.0")?;
    repo.add_leaf("org.example:util:2.0")?;
    Ok(repo)
}

#[test]
fn test_resolve_text() -> Result<()> {
    let repo = repository()?;
    let output = repo.run_mvnr(&["resolve", "org.example:app:1.0.0"])?;
    output.assert_success();
    assert_eq!(
        output.lines(),
        [
            "org.example:app:jar:1.0.0:compile",
            "org.example:lib:jar:1.5.0:compile",
            "org.example:util:jar:2.0:compile",
        ]
    );
    Ok(())
}

#[test]
fn test_resolve_json_with_main_class() -> Result<()> {
    let repo = repository()?;
    let output =
        repo.run_mvnr(&["resolve", "org.example:app:1.0.0@org.example.Main", "--format", "json"])?;
    output.assert_success();

    let json: serde_json::Value = serde_json::from_str(&output.stdout)?;
    assert_eq!(json["main_class"], "org.example.Main");
    let dependencies = json["dependencies"].as_array().expect("dependencies array");
    assert_eq!(dependencies.len(), 3);
    assert_eq!(dependencies[1]["artifact_id"], "lib");
    assert_eq!(dependencies[1]["version"], "1.5.0");
    Ok(())
}

#[test]
fn test_tree_marks_conflicts() -> Result<()> {
    let repo = repository()?;
    repo.run_mvnr(&["tree", "org.example:app:1.0.0"])?
        .assert_success()
        .assert_stdout_contains("org.example:lib:jar:1.5.0:compile (requested [1.0,2.0))")
        .assert_stdout_contains("(omitted for conflict with 2.0)");
    Ok(())
}

#[test]
fn test_tree_json_is_stable() -> Result<()> {
    let repo = repository()?;
    let first = repo.run_mvnr(&["tree", "org.example:app:1.0.0", "-f", "json"])?;
    let second = repo.run_mvnr(&["tree", "org.example:app:1.0.0", "-f", "json"])?;
    first.assert_success();
    assert_eq!(first.stdout, second.stdout);
    Ok(())
}

#[test]
fn test_missing_descriptor_fails_with_suggestion() -> Result<()> {
    let repo = repository()?;
    repo.run_mvnr(&["resolve", "org.example:absent:1"])?
        .assert_failure()
        .assert_stderr_contains("org.example:absent:1")
        .assert_stderr_contains("suggestion");
    Ok(())
}

#[test]
fn test_malformed_coordinate() -> Result<()> {
    let repo = repository()?;
    repo.run_mvnr(&["resolve", "justone"])?.assert_failure().assert_stderr_contains("error");
    Ok(())
}

#[test]
fn test_invalid_config_file() -> Result<()> {
    let repo = repository()?;
    repo.write_config("max_concurrency = 0\n")?;
    repo.run_mvnr(&["resolve", "org.example:app:1.0.0"])?
        .assert_failure()
        .assert_stderr_contains("max_concurrency");
    Ok(())
}

#[test]
fn test_compare() {
    Command::cargo_bin("mvnr")
        .unwrap()
        .args(["compare", "1.0", "1.0.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.0 == 1.0.0"));

    Command::cargo_bin("mvnr")
        .unwrap()
        .args(["compare", "1.0-rc1", "1.0", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.0-rc1 < 1.0"));
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("mvnr")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("resolve").and(predicate::str::contains("tree")));
}
