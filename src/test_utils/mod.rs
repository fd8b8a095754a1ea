//! Test utilities for mvnr
//!
//! This module provides helpers shared by unit and integration tests:
//! - Logging initialization that works with the test harness
//! - POM document builders ([`PomBuilder`], [`DependencyFixture`], [`ProfileFixture`])
//!
//! # Example
//!
//! ```rust,no_run
//! use mvnr_cli::fetch::MemoryRepository;
//! use mvnr_cli::test_utils::{PomBuilder, init_test_logging};
//!
//! init_test_logging(None);
//! let repository = MemoryRepository::new()
//!     .with_pom("org.example:app:1.0.0", PomBuilder::new("org.example:app:1.0.0").build());
//! ```

pub mod fixtures;

pub use fixtures::{DependencyFixture, PomBuilder, ProfileFixture};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// This function initializes the tracing subscriber for tests, but only once
/// regardless of how many times it's called. It respects the `RUST_LOG` environment
/// variable if set, or uses the provided log level.
///
/// # Example
///
/// ```rust,no_run
/// use tracing::Level;
///
/// // Use environment variable
/// mvnr_cli::test_utils::init_test_logging(None);
///
/// // Or set level programmatically
/// mvnr_cli::test_utils::init_test_logging(Some(Level::DEBUG));
/// ```
///
/// To enable logging in tests via environment variable:
/// ```bash
/// RUST_LOG=mvnr_cli=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            // No logging if neither is provided
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
