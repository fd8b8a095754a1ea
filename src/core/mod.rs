//! Core types for mvnr
//!
//! This module holds the pieces every other module leans on: the error taxonomy and the
//! user-facing error reporting used by the CLI.
//!
//! # Error Management
//!
//! mvnr separates errors for code from errors for people:
//! - **Strongly-typed errors** ([`MvnrError`]) for precise handling in library callers
//! - **User-friendly contexts** ([`ErrorContext`]) with actionable suggestions for CLI users
//! - [`user_friendly_error`] turns any [`anyhow::Error`] carrying a [`MvnrError`] into an
//!   [`ErrorContext`], keeping the resolver's inclusion chain as details
//!
//! # Example
//!
//! ```rust,no_run
//! use mvnr_cli::core::MvnrError;
//!
//! fn check(version: &str) -> Result<(), MvnrError> {
//!     if version.trim().is_empty() {
//!         return Err(MvnrError::MalformedVersion {
//!             version: version.to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;

pub use error::{ErrorContext, MvnrError, user_friendly_error};
