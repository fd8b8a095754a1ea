//! Profile activation environment.
//!
//! [`ProfileConstraints`] is the snapshot of the environment that `<profile>` blocks are
//! evaluated against: operating system, JDK version, arbitrary properties, a base
//! directory, and a file-existence predicate. Profiles can also be forced on or off by id.
//!
//! Activation rules themselves live in [`activation`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use mvnr_cli::profile::ProfileConstraints;
//!
//! let constraints = ProfileConstraints::new()
//!     .with_os_name("Linux")
//!     .with_jdk("17")
//!     .with_property("env", "ci")
//!     .with_basedir("/home/user/project");
//! assert_eq!(constraints.jdk(), Some("17"));
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod activation;

pub use activation::{
    ActivationRule, FileActivation, OsActivation, PropertyActivation, evaluate_activation,
    is_profile_active,
};

/// File-existence collaborator used by `<file>` activation.
pub trait FileExists: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
}

impl<F> FileExists for F
where
    F: Fn(&Path) -> bool + Send + Sync,
{
    fn exists(&self, path: &Path) -> bool {
        self(path)
    }
}

/// Checks the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostFileSystem;

impl FileExists for HostFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Environment snapshot for profile activation.
///
/// Absent fields are meaningful: a non-negated OS rule on an absent field does not match,
/// and an absent JDK deactivates every JDK-gated profile.
#[derive(Clone)]
pub struct ProfileConstraints {
    os_name: Option<String>,
    os_family: Option<String>,
    os_arch: Option<String>,
    os_version: Option<String>,
    jdk: Option<String>,
    properties: BTreeMap<String, String>,
    basedir: Option<PathBuf>,
    active_profiles: BTreeSet<String>,
    inactive_profiles: BTreeSet<String>,
    file_exists: Arc<dyn FileExists>,
}

impl Default for ProfileConstraints {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ProfileConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileConstraints")
            .field("os_name", &self.os_name)
            .field("os_family", &self.os_family)
            .field("os_arch", &self.os_arch)
            .field("os_version", &self.os_version)
            .field("jdk", &self.jdk)
            .field("properties", &self.properties)
            .field("basedir", &self.basedir)
            .field("active_profiles", &self.active_profiles)
            .field("inactive_profiles", &self.inactive_profiles)
            .finish_non_exhaustive()
    }
}

impl ProfileConstraints {
    /// Empty constraints backed by the host filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self {
            os_name: None,
            os_family: None,
            os_arch: None,
            os_version: None,
            jdk: None,
            properties: BTreeMap::new(),
            basedir: None,
            active_profiles: BTreeSet::new(),
            inactive_profiles: BTreeSet::new(),
            file_exists: Arc::new(HostFileSystem),
        }
    }

    /// Constraints describing the running platform, using the names a JVM would report.
    ///
    /// The JDK is left unset since there is no JVM to ask.
    #[must_use]
    pub fn from_host() -> Self {
        let (name, family) = match std::env::consts::OS {
            "linux" => ("Linux", "unix"),
            "macos" => ("Mac OS X", "mac"),
            "windows" => ("Windows", "windows"),
            "freebsd" => ("FreeBSD", "unix"),
            "netbsd" => ("NetBSD", "unix"),
            "openbsd" => ("OpenBSD", "unix"),
            "solaris" => ("SunOS", "unix"),
            other => (other, "unix"),
        };
        let arch = match std::env::consts::ARCH {
            "x86_64" => "amd64",
            "x86" => "x86",
            other => other,
        };
        Self::new().with_os_name(name).with_os_family(family).with_os_arch(arch)
    }

    #[must_use]
    pub fn with_os_name(mut self, name: impl Into<String>) -> Self {
        self.os_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_os_family(mut self, family: impl Into<String>) -> Self {
        self.os_family = Some(family.into());
        self
    }

    #[must_use]
    pub fn with_os_arch(mut self, arch: impl Into<String>) -> Self {
        self.os_arch = Some(arch.into());
        self
    }

    #[must_use]
    pub fn with_os_version(mut self, version: impl Into<String>) -> Self {
        self.os_version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_jdk(mut self, jdk: impl Into<String>) -> Self {
        self.jdk = Some(jdk.into());
        self
    }

    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_properties<I, K, V>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.properties.extend(properties.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    #[must_use]
    pub fn with_basedir(mut self, basedir: impl Into<PathBuf>) -> Self {
        self.basedir = Some(basedir.into());
        self
    }

    /// Replace the file-existence predicate.
    #[must_use]
    pub fn with_file_exists(mut self, predicate: impl FileExists + 'static) -> Self {
        self.file_exists = Arc::new(predicate);
        self
    }

    /// Force a profile on regardless of its activation rule.
    #[must_use]
    pub fn with_active_profile(mut self, id: impl Into<String>) -> Self {
        self.active_profiles.insert(id.into());
        self
    }

    /// Force a profile off; wins over everything else.
    #[must_use]
    pub fn with_inactive_profile(mut self, id: impl Into<String>) -> Self {
        self.inactive_profiles.insert(id.into());
        self
    }

    #[must_use]
    pub fn os_name(&self) -> Option<&str> {
        self.os_name.as_deref()
    }

    #[must_use]
    pub fn os_family(&self) -> Option<&str> {
        self.os_family.as_deref()
    }

    #[must_use]
    pub fn os_arch(&self) -> Option<&str> {
        self.os_arch.as_deref()
    }

    #[must_use]
    pub fn os_version(&self) -> Option<&str> {
        self.os_version.as_deref()
    }

    #[must_use]
    pub fn jdk(&self) -> Option<&str> {
        self.jdk.as_deref()
    }

    #[must_use]
    pub const fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    #[must_use]
    pub fn basedir(&self) -> Option<&Path> {
        self.basedir.as_deref()
    }

    #[must_use]
    pub fn is_forced_active(&self, id: &str) -> bool {
        self.active_profiles.contains(id)
    }

    #[must_use]
    pub fn is_forced_inactive(&self, id: &str) -> bool {
        self.inactive_profiles.contains(id)
    }

    #[must_use]
    pub fn file_exists(&self, path: &Path) -> bool {
        self.file_exists.exists(path)
    }
}
