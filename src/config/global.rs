//! The resolver configuration file.
//!
//! # File Format
//!
//! ```toml
//! # Local Maven repository (defaults to ~/.m2/repository)
//! repository = "/opt/maven/repository"
//!
//! max_concurrency = 8
//! max_parent_depth = 24
//! fetch_timeout_secs = 30
//! include_optional = false
//!
//! # JDK version used for <jdk> profile activation
//! jdk = "17"
//!
//! [profiles]
//! active = ["release"]
//! inactive = ["dev"]
//!
//! # Properties visible to <property> profile activation
//! [properties]
//! env = "ci"
//! ```
//!
//! # Location
//!
//! `~/.mvnr/config.toml` on Unix and macOS, `%LOCALAPPDATA%\mvnr\config.toml` on
//! Windows. `MVNR_CONFIG_PATH` overrides the location and `MVNR_REPOSITORY` overrides
//! the `repository` setting.
//!
//! # Examples
//!
//! ```rust,no_run
//! use mvnr_cli::config::ResolverConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ResolverConfig::load().await?;
//! let options = config.resolve_options();
//! let constraints = config.profile_constraints();
//! println!("{} concurrent fetches, JDK {:?}", options.max_concurrency, constraints.jdk());
//! # Ok(())
//! # }
//! ```

use super::{CONFIG_PATH_ENV, REPOSITORY_ENV, default_repository_dir};
use crate::core::MvnrError;
use crate::profile::ProfileConstraints;
use crate::resolver::{DEFAULT_MAX_PARENT_DEPTH, ResolveOptions};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::debug;

const fn default_max_parent_depth() -> usize {
    DEFAULT_MAX_PARENT_DEPTH
}

/// Profiles forced on or off regardless of their activation rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSelection {
    pub active: Vec<String>,
    /// Deactivation wins over activation.
    pub inactive: Vec<String>,
}

/// Resolver settings read from `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Local Maven repository. `None` means [`default_repository_dir`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<PathBuf>,

    /// Upper bound on concurrent descriptor loads. `None` means one per core, at least 4.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<usize>,

    #[serde(default = "default_max_parent_depth")]
    pub max_parent_depth: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_timeout_secs: Option<u64>,

    pub include_optional: bool,

    /// JDK version for `<jdk>` activation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jdk: Option<String>,

    pub profiles: ProfileSelection,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            repository: None,
            max_concurrency: None,
            max_parent_depth: DEFAULT_MAX_PARENT_DEPTH,
            fetch_timeout_secs: None,
            include_optional: false,
            jdk: None,
            profiles: ProfileSelection::default(),
            properties: BTreeMap::new(),
        }
    }
}

impl ResolverConfig {
    /// Load from the default location, or defaults if there is no file.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Load from `path` if given, otherwise from the default location.
    ///
    /// A missing file is not an error; an explicitly given one is expected to exist.
    ///
    /// # Errors
    ///
    /// Fails if an explicit path does not exist, or if the file cannot be read or parsed.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(&path).await,
            None => {
                let path = Self::default_path()?;
                if path.exists() {
                    Self::load_from(&path).await
                } else {
                    debug!("No configuration at {}, using defaults", path.display());
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load from a specific file.
    ///
    /// # Errors
    ///
    /// Fails with [`MvnrError::ConfigError`] context if the file cannot be read, is not
    /// valid TOML, or holds out-of-range values.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        let config: Self = toml::from_str(&content).map_err(|e| MvnrError::ConfigError {
            message: format!("{}: {e}", path.display()),
        })?;
        config.validate().with_context(|| format!("Invalid configuration in {}", path.display()))?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Write the configuration as TOML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Fails if the directory or file cannot be written.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write configuration to {}", path.display()))
    }

    /// `MVNR_CONFIG_PATH`, or the platform default.
    ///
    /// # Errors
    ///
    /// Fails if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("mvnr")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".mvnr")
        };

        Ok(config_dir.join("config.toml"))
    }

    fn validate(&self) -> Result<(), MvnrError> {
        if self.max_concurrency == Some(0) {
            return Err(MvnrError::ConfigError {
                message: "max_concurrency must be at least 1".to_string(),
            });
        }
        if self.max_parent_depth == 0 {
            return Err(MvnrError::ConfigError {
                message: "max_parent_depth must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// The local repository to read from.
    ///
    /// `MVNR_REPOSITORY` beats the file, which beats `~/.m2/repository`.
    ///
    /// # Errors
    ///
    /// Fails if nothing is configured and the home directory cannot be determined.
    pub fn repository_dir(&self) -> Result<PathBuf> {
        if std::env::var_os(REPOSITORY_ENV).is_none() {
            if let Some(repository) = &self.repository {
                return Ok(repository.clone());
            }
        }
        default_repository_dir()
    }

    /// Engine options derived from this configuration.
    #[must_use]
    pub fn resolve_options(&self) -> ResolveOptions {
        let defaults = ResolveOptions::default();
        ResolveOptions {
            managed: false,
            include_optional: self.include_optional,
            max_concurrency: self.max_concurrency.unwrap_or(defaults.max_concurrency),
            max_parent_depth: self.max_parent_depth,
            fetch_timeout: self.fetch_timeout_secs.map(Duration::from_secs),
        }
    }

    /// Activation inputs: the host platform plus the configured JDK, properties and
    /// profile selections.
    #[must_use]
    pub fn profile_constraints(&self) -> ProfileConstraints {
        let mut constraints =
            ProfileConstraints::from_host().with_properties(self.properties.clone());
        if let Some(jdk) = &self.jdk {
            constraints = constraints.with_jdk(jdk.clone());
        }
        for id in &self.profiles.active {
            constraints = constraints.with_active_profile(id.clone());
        }
        for id in &self.profiles.inactive {
            constraints = constraints.with_inactive_profile(id.clone());
        }
        constraints
    }
}
