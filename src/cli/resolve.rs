//! `mvnr resolve` and `mvnr tree`.

use super::CliConfig;
use crate::coordinate::{Coordinate, Endpoint};
use crate::fetch::LocalRepository;
use crate::model::Dependency;
use crate::profile::ProfileConstraints;
use crate::resolver::{Resolution, Resolver};
use anyhow::{Context, Result, anyhow};
use clap::{Args, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Flags shared by `resolve` and `tree`.
#[derive(Args, Debug)]
pub struct ResolutionArgs {
    /// Endpoint: `groupId:artifactId[:version]` joined with `+`, optionally `@MainClass`
    endpoint: String,

    /// BOM whose dependency management applies to the endpoint (repeatable)
    #[arg(long = "bom", value_name = "G:A[:V]")]
    boms: Vec<String>,

    /// Treat the endpoint's own dependency management as global constraints
    #[arg(long)]
    managed: bool,

    /// Follow optional dependencies below the first level
    #[arg(long)]
    include_optional: bool,

    /// Activate profiles by id; prefix with `!` to deactivate
    #[arg(short = 'P', long = "profile", value_name = "ID", value_delimiter = ',')]
    profiles: Vec<String>,

    /// Set a property for profile activation
    #[arg(short = 'D', long = "define", value_name = "KEY=VALUE")]
    properties: Vec<String>,

    /// JDK version for `<jdk>` profile activation
    #[arg(long)]
    jdk: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl ResolutionArgs {
    fn constraints(&self, mut constraints: ProfileConstraints) -> Result<ProfileConstraints> {
        for definition in &self.properties {
            let (key, value) = definition
                .split_once('=')
                .map_or((definition.as_str(), "true"), |(k, v)| (k, v));
            if key.trim().is_empty() {
                return Err(anyhow!(
                    "Invalid property definition '{definition}', expected KEY=VALUE"
                ));
            }
            constraints = constraints.with_property(key.trim(), value);
        }
        for profile in &self.profiles {
            constraints = match profile.strip_prefix('!').or_else(|| profile.strip_prefix('-')) {
                Some(id) => constraints.with_inactive_profile(id.trim()),
                None => constraints.with_active_profile(profile.trim()),
            };
        }
        if let Some(jdk) = &self.jdk {
            constraints = constraints.with_jdk(jdk.clone());
        }
        Ok(constraints)
    }

    async fn resolve(&self, config: &CliConfig) -> Result<(Endpoint, Resolution)> {
        let file = config.load_config().await?;
        let repository = match &config.repository {
            Some(path) => path.clone(),
            None => file.repository_dir()?,
        };
        debug!("Resolving {} against {}", self.endpoint, repository.display());

        let mut options = file.resolve_options();
        options.managed = self.managed;
        options.include_optional |= self.include_optional;
        let constraints = self.constraints(file.profile_constraints())?;

        let endpoint = Endpoint::parse(&self.endpoint)?;
        let boms = self
            .boms
            .iter()
            .map(|bom| Coordinate::parse(bom).with_context(|| format!("Invalid --bom '{bom}'")))
            .collect::<Result<Vec<_>>>()?;

        let resolver = Resolver::with_options(Arc::new(LocalRepository::new(repository)), options);
        let resolution = resolver
            .resolve_until(&endpoint.coordinates, &constraints, &boms, interrupted())
            .await?;
        Ok((endpoint, resolution))
    }
}

/// Completes on Ctrl-C; never completes if the handler cannot be installed.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

fn print_warnings(resolution: &Resolution) {
    for warning in &resolution.warnings {
        eprintln!("{} {warning}", "warning:".yellow().bold());
    }
}

#[derive(Serialize)]
struct ResolveOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    main_class: Option<&'a str>,
    dependencies: &'a [Dependency],
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    warnings: &'a [String],
}

#[derive(Args, Debug)]
pub struct ResolveCommand {
    #[command(flatten)]
    args: ResolutionArgs,
}

impl ResolveCommand {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let (endpoint, resolution) = self.args.resolve(config).await?;
        match self.args.format {
            OutputFormat::Json => {
                let output = ResolveOutput {
                    main_class: endpoint.main_class.as_deref(),
                    dependencies: &resolution.dependencies,
                    warnings: &resolution.warnings,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                print_warnings(&resolution);
                for dependency in &resolution.dependencies {
                    println!("{dependency}");
                }
                if let Some(main_class) = &endpoint.main_class {
                    println!("{} {main_class}", "main class:".bright_black());
                }
            }
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct TreeCommand {
    #[command(flatten)]
    args: ResolutionArgs,
}

impl TreeCommand {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let (_, resolution) = self.args.resolve(config).await?;
        match self.args.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&resolution.tree)?),
            OutputFormat::Text => {
                print_warnings(&resolution);
                print!("{}", resolution.render_tree());
            }
        }
        Ok(())
    }
}
