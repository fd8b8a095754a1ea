//! Shared helpers for the integration suite.
//!
//! [`TestRepository`] lays POMs out in a temporary directory using the Maven local
//! repository layout and runs the `mvnr` binary against it with an isolated
//! configuration file.

#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use mvnr_cli::fetch::LocalRepository;
use mvnr_cli::test_utils::PomBuilder;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway local repository plus a config directory.
pub struct TestRepository {
    _temp: TempDir,
    root: PathBuf,
    config_path: PathBuf,
}

impl TestRepository {
    pub fn new() -> Result<Self> {
        mvnr_cli::test_utils::init_test_logging(None);
        let temp = TempDir::new()?;
        let root = temp.path().join("repository");
        std::fs::create_dir_all(&root)?;
        let config_path = temp.path().join("config.toml");
        Ok(Self {
            _temp: temp,
            root,
            config_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Write the POM for `groupId:artifactId:version`.
    pub fn add_pom(&self, coordinate: &str, pom: &PomBuilder) -> Result<&Self> {
        let mut parts = coordinate.split(':');
        let gav = mvnr_cli::coordinate::Gav::new(
            parts.next().unwrap_or_default(),
            parts.next().unwrap_or_default(),
            parts.next().unwrap_or_default(),
        );
        let path = LocalRepository::new(&self.root).pom_path(&gav);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, pom.build())?;
        Ok(self)
    }

    /// Write a POM with no dependencies.
    pub fn add_leaf(&self, coordinate: &str) -> Result<&Self> {
        self.add_pom(coordinate, &PomBuilder::new(coordinate))
    }

    pub fn write_config(&self, content: &str) -> Result<()> {
        std::fs::write(&self.config_path, content)?;
        Ok(())
    }

    /// Run `mvnr` with this repository and config.
    pub fn run_mvnr(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = Command::cargo_bin("mvnr")?
            .args(args)
            .arg("--repository")
            .arg(&self.root)
            .env("MVNR_CONFIG_PATH", &self.config_path)
            .env_remove("MVNR_REPOSITORY")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1")
            .output()?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

/// Captured output of one `mvnr` run.
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.success,
            "Command failed with code {:?}\nStdout: {}\nStderr: {}",
            self.code, self.stdout, self.stderr
        );
        self
    }

    pub fn assert_failure(&self) -> &Self {
        assert!(!self.success, "Command unexpectedly succeeded\nStdout: {}", self.stdout);
        self
    }

    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Expected stdout to contain '{text}'\nStdout: {}\nStderr: {}",
            self.stdout,
            self.stderr
        );
        self
    }

    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Expected stderr to contain '{text}'\nStderr: {}",
            self.stderr
        );
        self
    }

    /// Non-empty stdout lines.
    pub fn lines(&self) -> Vec<&str> {
        self.stdout.lines().filter(|l| !l.trim().is_empty()).collect()
    }
}
