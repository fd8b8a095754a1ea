//! Configuration management for mvnr.
//!
//! Settings live in one TOML file, `~/.mvnr/config.toml` by default. The file is
//! optional: a missing file means defaults everywhere. See [`ResolverConfig`] for the
//! format and the environment variables that override it.

mod global;

pub use global::{ProfileSelection, ResolverConfig};

use anyhow::Result;
use std::path::PathBuf;

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "MVNR_CONFIG_PATH";

/// Environment variable overriding the local repository location.
pub const REPOSITORY_ENV: &str = "MVNR_REPOSITORY";

/// The local Maven repository to read from when nothing else is configured.
///
/// `MVNR_REPOSITORY` wins, then `~/.m2/repository`.
///
/// # Errors
///
/// Fails if the home directory cannot be determined.
pub fn default_repository_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(REPOSITORY_ENV) {
        return Ok(PathBuf::from(dir));
    }

    Ok(dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
        .join(".m2")
        .join("repository"))
}
