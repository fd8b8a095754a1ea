//! Integration test suite for mvnr
//!
//! End-to-end tests that lay out a Maven local repository in a temporary directory and
//! drive either the library or the `mvnr` binary against it.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cli**: argument handling, output formats and error reporting of the binary
//! - **profiles**: profile activation through flags and the configuration file
//! - **resolution**: library-level resolution against an on-disk repository

#[path = "../common/mod.rs"]
mod common;

mod cli;
mod profiles;
mod resolution;
