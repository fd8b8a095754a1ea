//! Command-line interface for mvnr.
//!
//! A thin layer over the library: it reads the configuration file, turns flags into
//! [`ResolveOptions`](crate::resolver::ResolveOptions) and
//! [`ProfileConstraints`](crate::profile::ProfileConstraints), runs the resolver against
//! the local Maven repository and prints the result.
//!
//! # Commands
//!
//! - `resolve` - print the mediated dependency list of an endpoint
//! - `tree` - print every edge the resolver considered, marking losers
//! - `compare` - compare two version strings
//!
//! # Global Options
//!
//! - `-v/--verbose` - debug logging
//! - `-q/--quiet` - no logging at all
//! - `-c/--config` - configuration file instead of `~/.mvnr/config.toml`
//! - `--repository` - local repository instead of the configured one
//!
//! `RUST_LOG` overrides the level chosen by `--verbose`/`--quiet`.

mod compare;
mod resolve;

use crate::config::ResolverConfig;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Settings shared by every command.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// `None` disables logging.
    pub log_level: Option<String>,
    pub config_path: Option<PathBuf>,
    pub repository: Option<PathBuf>,
}

impl CliConfig {
    /// Install the global tracing subscriber.
    ///
    /// Safe to call more than once; later calls are ignored.
    pub fn init_logging(&self) {
        let Some(level) = &self.log_level else {
            return;
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Load the configuration file named by `--config`, or the default one.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub async fn load_config(&self) -> Result<ResolverConfig> {
        ResolverConfig::load_with_optional(self.config_path.clone()).await
    }
}

#[derive(Parser)]
#[command(
    name = "mvnr",
    about = "Resolve Maven dependencies without a build tool",
    version,
    long_about = "mvnr resolves Maven coordinates into a mediated dependency list using POM \
                  inheritance, BOM imports, profile activation and nearest-wins mediation."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all logging
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Local Maven repository to resolve against
    #[arg(long, global = true)]
    repository: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the mediated dependencies of an endpoint
    Resolve(resolve::ResolveCommand),

    /// Print the dependency tree of an endpoint
    Tree(resolve::TreeCommand),

    /// Compare two versions
    Compare(compare::CompareCommand),
}

impl Cli {
    /// Run the selected command.
    ///
    /// # Errors
    ///
    /// Returns whatever the command fails with; `main` renders it.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(config).await
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("warn".to_string())
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
            repository: self.repository.clone(),
        }
    }

    /// Run the selected command with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns whatever the command fails with.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        match self.command {
            Commands::Resolve(cmd) => cmd.execute(&config).await,
            Commands::Tree(cmd) => cmd.execute(&config).await,
            Commands::Compare(cmd) => cmd.execute(),
        }
    }
}
