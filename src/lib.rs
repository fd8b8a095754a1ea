//! mvnr - Maven dependency resolution without a build tool
//!
//! mvnr turns Maven coordinates into the same conflict-free dependency list Maven would
//! compute, by reading POMs from a repository and applying Maven's rules: parent
//! inheritance, BOM imports, property interpolation, profile activation, scope
//! propagation, exclusions and nearest-wins mediation.
//!
//! # Architecture Overview
//!
//! Resolution is a pipeline of small, separately testable pieces:
//!
//! 1. [`coordinate`] parses `groupId:artifactId[:version][:classifier][:packaging][!]`
//!    and the `+`-joined endpoint syntax
//! 2. [`fetch`] retrieves descriptor bytes and version listings through the
//!    [`PomFetcher`](fetch::PomFetcher) trait, memoized by a write-once cache
//! 3. [`model`] parses a POM and computes its effective properties, dependency
//!    management and direct dependencies against its parents and imported BOMs
//! 4. [`profile`] decides which `<profile>` blocks are active for the caller's
//!    [`ProfileConstraints`](profile::ProfileConstraints)
//! 5. [`version`] orders versions and evaluates ranges so that `RELEASE`, `LATEST` and
//!    `[1.0,2.0)` become concrete versions
//! 6. [`resolver`] walks the graph breadth-first and mediates conflicts
//!
//! # Core Modules
//!
//! - [`core`] - Error taxonomy and user-facing error reporting
//! - [`config`] - The `~/.mvnr/config.toml` resolver configuration
//! - [`cli`] - The `mvnr` command-line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use mvnr_cli::coordinate::Coordinate;
//! use mvnr_cli::fetch::MemoryRepository;
//! use mvnr_cli::profile::ProfileConstraints;
//! use mvnr_cli::resolver::Resolver;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let repository = MemoryRepository::new()
//!     .with_pom("org.example:app:1.0.0", std::fs::read("app.pom")?)
//!     .with_pom("org.example:lib:1.5.0", std::fs::read("lib.pom")?);
//!
//! let resolver = Resolver::new(Arc::new(repository));
//! let roots = [Coordinate::parse("org.example:app:1.0.0")?];
//! let resolution = resolver.resolve(&roots, &ProfileConstraints::new(), &[]).await?;
//! for dependency in resolution.dependencies_of_roots() {
//!     println!("{dependency}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod coordinate;
pub mod core;
pub mod fetch;
pub mod model;
pub mod profile;
pub mod resolver;
pub mod version;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
