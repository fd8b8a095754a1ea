//! Profile activation through command-line flags and the configuration file.

use crate::common::TestRepository;
use anyhow::Result;
use mvnr_cli::test_utils::{PomBuilder, ProfileFixture};

fn repository() -> Result<TestRepository> {
    let repo = TestRepository::new()?;
    repo.add_pom(
        "org.example:app:1",
        &PomBuilder::new("org.example:app:1")
            .dependency("org.example:core:1")
            .profile(
                ProfileFixture::new("ci")
                    .when_property("env", Some("ci"))
                    .dependency("org.example:reporter:1"),
            )
            .profile(
                ProfileFixture::new("modern").jdk("[17,)").dependency("org.example:vthreads:1"),
            ),
    )?;
    repo.add_leaf("org.example:core:1")?;
    repo.add_leaf("org.example:reporter:1")?;
    repo.add_leaf("org.example:vthreads:1")?;
    Ok(repo)
}

#[test]
fn test_inactive_profiles_contribute_nothing() -> Result<()> {
    let repo = repository()?;
    let output = repo.run_mvnr(&["resolve", "org.example:app:1"])?;
    output.assert_success();
    assert_eq!(
        output.lines(),
        ["org.example:app:jar:1:compile", "org.example:core:jar:1:compile"]
    );
    Ok(())
}

#[test]
fn test_property_flag_activates_profile() -> Result<()> {
    let repo = repository()?;
    repo.run_mvnr(&["resolve", "org.example:app:1", "-D", "env=ci"])?
        .assert_success()
        .assert_stdout_contains("org.example:reporter:jar:1:compile");
    Ok(())
}

#[test]
fn test_forced_profile_and_deactivation() -> Result<()> {
    let repo = repository()?;
    repo.run_mvnr(&["resolve", "org.example:app:1", "-P", "ci"])?
        .assert_success()
        .assert_stdout_contains("reporter");

    let output = repo.run_mvnr(&["resolve", "org.example:app:1", "-D", "env=ci", "-P", "!ci"])?;
    output.assert_success();
    assert!(!output.stdout.contains("reporter"), "{}", output.stdout);
    Ok(())
}

#[test]
fn test_jdk_flag() -> Result<()> {
    let repo = repository()?;
    repo.run_mvnr(&["resolve", "org.example:app:1", "--jdk", "21"])?
        .assert_success()
        .assert_stdout_contains("vthreads");

    let output = repo.run_mvnr(&["resolve", "org.example:app:1", "--jdk", "11"])?;
    output.assert_success();
    assert!(!output.stdout.contains("vthreads"));
    Ok(())
}

#[test]
fn test_config_file_properties_and_profiles() -> Result<()> {
    let repo = repository()?;
    repo.write_config("jdk = \"17\"\n\n[properties]\nenv = \"ci\"\n")?;
    repo.run_mvnr(&["resolve", "org.example:app:1"])?
        .assert_success()
        .assert_stdout_contains("reporter")
        .assert_stdout_contains("vthreads");

    repo.write_config("[properties]\nenv = \"ci\"\n\n[profiles]\ninactive = [\"ci\"]\n")?;
    let output = repo.run_mvnr(&["resolve", "org.example:app:1"])?;
    output.assert_success();
    assert!(!output.stdout.contains("reporter"));
    Ok(())
}
