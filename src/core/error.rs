//! Error handling for mvnr
//!
//! This module provides the error taxonomy of the resolution engine and the user-facing
//! error reporting used by the CLI. The error system follows two principles:
//! 1. **Strongly-typed errors** so callers can react to a specific failure mode
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`MvnrError`] - Enumerated error types for every failure the engine can report
//! - [`ErrorContext`] - Wrapper that adds details and a suggestion for display
//!
//! # Error Categories
//!
//! - **Parsing**: [`MvnrError::MalformedVersion`], [`MvnrError::InvalidVersionRange`],
//!   [`MvnrError::MalformedCoordinate`], [`MvnrError::MalformedDescriptor`]
//! - **Resolution**: [`MvnrError::UnresolvedVersion`], [`MvnrError::CyclicInheritance`],
//!   [`MvnrError::UnresolvedProperty`], [`MvnrError::DescriptorNotFound`]
//! - **Collaborators**: [`MvnrError::FetchFailure`], [`MvnrError::Cancelled`]
//! - **Profiles**: [`MvnrError::InvalidActivationExpression`] (never aborts resolution,
//!   the profile is treated as inactive)
//!
//! # Propagation
//!
//! Leaf parsers return `Result<T, MvnrError>`. The resolver works with
//! [`anyhow::Result`] and wraps failures with the inclusion chain via
//! [`anyhow::Context`]; the typed error stays reachable with
//! `error.downcast_ref::<MvnrError>()`.
//!
//! ```rust,no_run
//! use mvnr_cli::core::{MvnrError, user_friendly_error};
//!
//! let error = anyhow::Error::from(MvnrError::CyclicInheritance {
//!     chain: "org.example:a:1 -> org.example:b:1 -> org.example:a:1".to_string(),
//! });
//! let ctx = user_friendly_error(error);
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for mvnr operations
///
/// Each variant names the artifact (or the text) it concerns so that a failure deep
/// inside a transitive graph can still be traced back to its origin.
#[derive(Error, Debug)]
pub enum MvnrError {
    /// Version text could not be tokenized at all
    ///
    /// Maven version parsing is permissive: almost every string orders somewhere.
    /// Only empty (or whitespace-only) input ends up here.
    #[error("Malformed version: '{version}'")]
    MalformedVersion {
        /// The offending version text
        version: String,
    },

    /// Version range expression is not valid interval syntax
    #[error("Invalid version range '{range}': {reason}")]
    InvalidVersionRange {
        /// The offending range text
        range: String,
        /// Why the range was rejected
        reason: String,
    },

    /// Coordinate text could not be parsed
    #[error("Malformed coordinate '{coordinate}': {reason}")]
    MalformedCoordinate {
        /// The offending coordinate text
        coordinate: String,
        /// Why the coordinate was rejected
        reason: String,
    },

    /// POM bytes are not a usable project descriptor
    #[error("Malformed descriptor for {coordinate}: {reason}")]
    MalformedDescriptor {
        /// Coordinate whose POM failed to parse
        coordinate: String,
        /// Parser message
        reason: String,
    },

    /// The fetch collaborator has no POM for a coordinate that must exist
    ///
    /// Raised for roots, parents and imported BOMs. A missing POM of a plain
    /// transitive dependency only produces a warning.
    #[error("Descriptor not found: {coordinate}")]
    DescriptorNotFound {
        /// Coordinate that could not be found
        coordinate: String,
    },

    /// `RELEASE`, `LATEST`, a range, or a missing version could not be turned into a
    /// concrete version
    #[error("Cannot resolve version of {coordinate}: {reason}")]
    UnresolvedVersion {
        /// Coordinate with the unresolvable version
        coordinate: String,
        /// Why no version could be selected
        reason: String,
    },

    /// Parent chain or BOM import chain loops back on itself or is too deep
    #[error("Cyclic inheritance detected: {chain}")]
    CyclicInheritance {
        /// The chain of `groupId:artifactId:version` entries that forms the cycle
        chain: String,
    },

    /// A `${...}` placeholder survived interpolation in a load-bearing position
    #[error("Unresolved property '{property}' in {location} of {coordinate}")]
    UnresolvedProperty {
        /// Placeholder name (without `${` and `}`)
        property: String,
        /// Field that contained the placeholder, e.g. `managed dependency version`
        location: String,
        /// Descriptor in which the field was declared
        coordinate: String,
    },

    /// A profile activation rule is malformed
    ///
    /// This error is logged and the profile is treated as inactive.
    #[error("Invalid activation expression in profile '{profile}': {reason}")]
    InvalidActivationExpression {
        /// Profile id
        profile: String,
        /// Why the rule is invalid
        reason: String,
    },

    /// The fetch collaborator failed (distinct from "not found")
    #[error("Failed to fetch {coordinate}: {reason}")]
    FetchFailure {
        /// Coordinate being fetched
        coordinate: String,
        /// Underlying failure
        reason: String,
    },

    /// The caller abandoned the resolution
    #[error("Resolution cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl Clone for MvnrError {
    fn clone(&self) -> Self {
        match self {
            Self::MalformedVersion {
                version,
            } => Self::MalformedVersion {
                version: version.clone(),
            },
            Self::InvalidVersionRange {
                range,
                reason,
            } => Self::InvalidVersionRange {
                range: range.clone(),
                reason: reason.clone(),
            },
            Self::MalformedCoordinate {
                coordinate,
                reason,
            } => Self::MalformedCoordinate {
                coordinate: coordinate.clone(),
                reason: reason.clone(),
            },
            Self::MalformedDescriptor {
                coordinate,
                reason,
            } => Self::MalformedDescriptor {
                coordinate: coordinate.clone(),
                reason: reason.clone(),
            },
            Self::DescriptorNotFound {
                coordinate,
            } => Self::DescriptorNotFound {
                coordinate: coordinate.clone(),
            },
            Self::UnresolvedVersion {
                coordinate,
                reason,
            } => Self::UnresolvedVersion {
                coordinate: coordinate.clone(),
                reason: reason.clone(),
            },
            Self::CyclicInheritance {
                chain,
            } => Self::CyclicInheritance {
                chain: chain.clone(),
            },
            Self::UnresolvedProperty {
                property,
                location,
                coordinate,
            } => Self::UnresolvedProperty {
                property: property.clone(),
                location: location.clone(),
                coordinate: coordinate.clone(),
            },
            Self::InvalidActivationExpression {
                profile,
                reason,
            } => Self::InvalidActivationExpression {
                profile: profile.clone(),
                reason: reason.clone(),
            },
            Self::FetchFailure {
                coordinate,
                reason,
            } => Self::FetchFailure {
                coordinate: coordinate.clone(),
                reason: reason.clone(),
            },
            Self::Cancelled => Self::Cancelled,
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            // For errors that don't implement Clone, convert to Other
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::TomlError(e) => Self::Other {
                message: format!("TOML parsing error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// `ErrorContext` wraps a [`MvnrError`] and adds optional details and a suggestion.
/// This is how the CLI presents failures.
///
/// When displayed, errors show:
/// 1. **Error**: The main error message in red
/// 2. **Details**: Additional context, e.g. the inclusion chain, in yellow (optional)
/// 3. **Suggestion**: Actionable steps in green (optional)
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: MvnrError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a [`MvnrError`]
    #[must_use]
    pub const fn new(error: MvnrError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`]
///
/// Walks the error chain looking for a [`MvnrError`]. The outer context layers (the
/// inclusion chain added by the resolver) become the details of the returned context.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let chain: Vec<String> = error.chain().map(ToString::to_string).collect();

    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(error.as_ref());
    while let Some(err) = current {
        if let Some(mvnr_error) = err.downcast_ref::<MvnrError>() {
            let ctx = create_error_context(mvnr_error.clone());
            let outer: Vec<&String> =
                chain.iter().take_while(|msg| **msg != mvnr_error.to_string()).collect();
            if outer.is_empty() {
                return ctx;
            }
            let details = outer.iter().map(|s| s.as_str()).collect::<Vec<_>>().join("\n  ");
            return ctx.with_details(details);
        }
        current = err.source();
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        return ErrorContext::new(MvnrError::Other {
            message: io_error.to_string(),
        })
        .with_suggestion("Check that the repository directory exists and is readable");
    }

    ErrorContext::new(MvnrError::Other {
        message: chain.join(": "),
    })
}

fn create_error_context(error: MvnrError) -> ErrorContext {
    match &error {
        MvnrError::MalformedCoordinate {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Use groupId:artifactId[:version][:classifier][:packaging]"),
        MvnrError::InvalidVersionRange {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Ranges look like [1.0,2.0), (,1.5], [1.2] or [1.0,2.0),[3.0,)"),
        MvnrError::DescriptorNotFound {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Check the coordinate spelling or point --repository at a repository that contains it",
        ),
        MvnrError::UnresolvedVersion {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Pin an explicit version or import a BOM that manages this artifact"),
        MvnrError::CyclicInheritance {
            ..
        } => ErrorContext::new(error)
            .with_details("A POM may not be its own ancestor or import itself through BOMs"),
        MvnrError::UnresolvedProperty {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Define the property in the POM, its parent, or an active profile",
        ),
        MvnrError::FetchFailure {
            ..
        } => ErrorContext::new(error).with_suggestion("Retry; the failure may be transient"),
        _ => ErrorContext::new(error),
    }
}
