//! `<activation>` rules and their evaluation.
//!
//! An activation rule is a conjunction of up to four predicates: OS, JDK, property, and
//! file. A rule with none of them never activates on its own; such profiles are only
//! enabled explicitly through [`ProfileConstraints::with_active_profile`].
//!
//! Malformed predicates produce [`MvnrError::InvalidActivationExpression`]. Callers log
//! the error and treat the profile as inactive rather than failing the resolution.

use super::ProfileConstraints;
use crate::core::MvnrError;
use crate::model::interpolate::interpolate_with;
use crate::version::{Version, parse_jdk_activation_range};
use std::path::PathBuf;
use tracing::{trace, warn};

/// `<os>` predicate. Each field may be prefixed with `!` to negate it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsActivation {
    pub name: Option<String>,
    pub family: Option<String>,
    pub arch: Option<String>,
    pub version: Option<String>,
}

/// `<property>` predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyActivation {
    pub name: String,
    pub value: Option<String>,
}

/// `<file>` predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileActivation {
    pub exists: Option<String>,
    pub missing: Option<String>,
}

/// The `<activation>` block of a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationRule {
    pub os: Option<OsActivation>,
    pub jdk: Option<String>,
    pub property: Option<PropertyActivation>,
    pub file: Option<FileActivation>,
}

impl ActivationRule {
    /// Whether any predicate is present.
    #[must_use]
    pub const fn has_predicates(&self) -> bool {
        self.os.is_some() || self.jdk.is_some() || self.property.is_some() || self.file.is_some()
    }
}

fn invalid(profile: &str, reason: impl Into<String>) -> MvnrError {
    MvnrError::InvalidActivationExpression {
        profile: profile.to_string(),
        reason: reason.into(),
    }
}

/// Evaluate an activation rule.
///
/// Every predicate is validated even when an earlier one already failed, so that a
/// malformed rule is always reported.
///
/// # Errors
///
/// Returns [`MvnrError::InvalidActivationExpression`] for empty OS fields, a bad JDK
/// range, an empty property name, or a file predicate without a path.
pub fn evaluate_activation(
    profile: &str,
    rule: &ActivationRule,
    constraints: &ProfileConstraints,
) -> Result<bool, MvnrError> {
    if !rule.has_predicates() {
        return Ok(false);
    }

    let mut active = true;
    if let Some(os) = &rule.os {
        active &= os_matches(profile, os, constraints)?;
    }
    if let Some(jdk) = &rule.jdk {
        active &= jdk_matches(profile, jdk, constraints)?;
    }
    if let Some(property) = &rule.property {
        active &= property_matches(profile, property, constraints)?;
    }
    if let Some(file) = &rule.file {
        active &= file_matches(profile, file, constraints)?;
    }
    trace!(profile, active, "evaluated activation rule");
    Ok(active)
}

/// Evaluate a profile id and rule, applying explicit activation and degrading malformed
/// rules to "inactive".
#[must_use]
pub fn is_profile_active(
    profile: &str,
    rule: &ActivationRule,
    constraints: &ProfileConstraints,
) -> bool {
    if constraints.is_forced_inactive(profile) {
        return false;
    }
    if constraints.is_forced_active(profile) {
        return true;
    }
    match evaluate_activation(profile, rule, constraints) {
        Ok(active) => active,
        Err(e) => {
            warn!("{e}; treating profile as inactive");
            false
        }
    }
}

fn os_field_matches(
    profile: &str,
    field: &str,
    expected: Option<&String>,
    actual: Option<&str>,
) -> Result<bool, MvnrError> {
    let Some(expected) = expected else {
        return Ok(true);
    };
    let expected = expected.trim();
    match expected.strip_prefix('!') {
        Some(negated) => {
            let negated = negated.trim();
            if negated.is_empty() {
                return Err(invalid(profile, format!("os {field} '!' has no value")));
            }
            Ok(actual.is_none_or(|actual| !actual.eq_ignore_ascii_case(negated)))
        }
        None => {
            if expected.is_empty() {
                return Err(invalid(profile, format!("os {field} is empty")));
            }
            Ok(actual.is_some_and(|actual| actual.eq_ignore_ascii_case(expected)))
        }
    }
}

fn os_matches(
    profile: &str,
    os: &OsActivation,
    constraints: &ProfileConstraints,
) -> Result<bool, MvnrError> {
    if os.name.is_none() && os.family.is_none() && os.arch.is_none() && os.version.is_none() {
        return Err(invalid(profile, "os activation has no conditions"));
    }
    let name = os_field_matches(profile, "name", os.name.as_ref(), constraints.os_name())?;
    let family = os_field_matches(profile, "family", os.family.as_ref(), constraints.os_family())?;
    let arch = os_field_matches(profile, "arch", os.arch.as_ref(), constraints.os_arch())?;
    let version =
        os_field_matches(profile, "version", os.version.as_ref(), constraints.os_version())?;
    Ok(name && family && arch && version)
}

fn jdk_matches(
    profile: &str,
    expression: &str,
    constraints: &ProfileConstraints,
) -> Result<bool, MvnrError> {
    let activation = parse_jdk_activation_range(expression)
        .map_err(|e| invalid(profile, format!("jdk '{expression}': {e}")))?;
    let Some(jdk) = constraints.jdk() else {
        return Ok(false);
    };
    Ok(Version::parse(jdk).is_ok_and(|jdk| activation.matches(&jdk)))
}

fn property_matches(
    profile: &str,
    property: &PropertyActivation,
    constraints: &ProfileConstraints,
) -> Result<bool, MvnrError> {
    let name = property.name.trim();
    let (negated_name, name) = match name.strip_prefix('!') {
        Some(rest) => (true, rest.trim()),
        None => (false, name),
    };
    if name.is_empty() {
        return Err(invalid(profile, "property activation has no name"));
    }
    let actual = constraints.properties().get(name);

    match property.value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => {
            let (negated_value, value) = match value.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, value),
            };
            let equal = actual.is_some_and(|actual| actual == value);
            Ok(equal != negated_value)
        }
        None => Ok(actual.is_some() != negated_name),
    }
}

fn resolve_activation_path(path: &str, constraints: &ProfileConstraints) -> PathBuf {
    let basedir = constraints.basedir().map(|dir| dir.to_string_lossy().into_owned());
    let interpolated = interpolate_with(path, |key| match key {
        "basedir" | "project.basedir" => basedir.clone(),
        other => constraints.properties().get(other).cloned(),
    });
    PathBuf::from(interpolated.text)
}

fn file_matches(
    profile: &str,
    file: &FileActivation,
    constraints: &ProfileConstraints,
) -> Result<bool, MvnrError> {
    let exists = file.exists.as_deref().map(str::trim).filter(|p| !p.is_empty());
    let missing = file.missing.as_deref().map(str::trim).filter(|p| !p.is_empty());

    match (exists, missing) {
        (Some(path), _) => Ok(constraints.file_exists(&resolve_activation_path(path, constraints))),
        (None, Some(path)) => {
            Ok(!constraints.file_exists(&resolve_activation_path(path, constraints)))
        }
        (None, None) => Err(invalid(profile, "file activation needs <exists> or <missing>")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    fn os_name(name: &str) -> ActivationRule {
        ActivationRule {
            os: Some(OsActivation {
                name: Some(name.to_string()),
                ..OsActivation::default()
            }),
            ..ActivationRule::default()
        }
    }

    fn jdk(expression: &str) -> ActivationRule {
        ActivationRule {
            jdk: Some(expression.to_string()),
            ..ActivationRule::default()
        }
    }

    fn property(name: &str, value: Option<&str>) -> ActivationRule {
        ActivationRule {
            property: Some(PropertyActivation {
                name: name.to_string(),
                value: value.map(str::to_string),
            }),
            ..ActivationRule::default()
        }
    }

    fn eval(rule: &ActivationRule, constraints: &ProfileConstraints) -> bool {
        evaluate_activation("p", rule, constraints).unwrap()
    }

    #[test]
    fn test_os_name() {
        let windows = ProfileConstraints::new().with_os_name("Windows XP");
        let linux = ProfileConstraints::new().with_os_name("Linux");

        assert!(eval(&os_name("Windows XP"), &windows));
        assert!(eval(&os_name("windows xp"), &windows));
        assert!(!eval(&os_name("Windows XP"), &linux));
        assert!(eval(&os_name("!Windows XP"), &linux));
        assert!(!eval(&os_name("!Windows XP"), &windows));
    }

    #[test]
    fn test_os_absent_constraint() {
        let empty = ProfileConstraints::new();
        assert!(!eval(&os_name("Linux"), &empty));
        assert!(eval(&os_name("!Linux"), &empty));
    }

    #[test]
    fn test_os_conjunction() {
        let rule = ActivationRule {
            os: Some(OsActivation {
                family: Some("unix".into()),
                arch: Some("!x86".into()),
                ..OsActivation::default()
            }),
            ..ActivationRule::default()
        };
        let amd64 = ProfileConstraints::new().with_os_family("Unix").with_os_arch("amd64");
        let x86 = ProfileConstraints::new().with_os_family("unix").with_os_arch("x86");
        let windows = ProfileConstraints::new().with_os_family("windows").with_os_arch("amd64");
        assert!(eval(&rule, &amd64));
        assert!(!eval(&rule, &x86));
        assert!(!eval(&rule, &windows));
    }

    #[test]
    fn test_jdk_range() {
        assert!(eval(&jdk("[1.8,11]"), &ProfileConstraints::new().with_jdk("9")));
        assert!(!eval(&jdk("[1.8,11]"), &ProfileConstraints::new().with_jdk("17")));
        assert!(eval(&jdk("!1.8"), &ProfileConstraints::new().with_jdk("17")));
        assert!(eval(&jdk("1.8"), &ProfileConstraints::new().with_jdk("1.8.0")));
    }

    #[test]
    fn test_jdk_unset_is_inactive() {
        assert!(!eval(&jdk("[1.8,)"), &ProfileConstraints::new()));
        assert!(!eval(&jdk("!1.8"), &ProfileConstraints::new()));
    }

    #[test]
    fn test_invalid_jdk_is_reported_not_thrown() {
        let rule = jdk("[1.8,");
        let constraints = ProfileConstraints::new().with_jdk("9");
        assert!(matches!(
            evaluate_activation("broken", &rule, &constraints),
            Err(MvnrError::InvalidActivationExpression { .. })
        ));
        assert!(!is_profile_active("broken", &rule, &constraints));
    }

    #[test]
    fn test_property_existence_and_value() {
        let with_foo = ProfileConstraints::new().with_property("foo", "anything");
        let with_bar = ProfileConstraints::new().with_property("bar", "baz");

        assert!(eval(&property("foo", None), &with_foo));
        assert!(!eval(&property("foo", None), &with_bar));
        assert!(eval(&property("bar", Some("baz")), &with_bar));
        assert!(!eval(&property("bar", Some("qux")), &with_bar));
    }

    #[test]
    fn test_property_negation() {
        let with_bar = ProfileConstraints::new().with_property("bar", "baz");
        assert!(eval(&property("!foo", None), &with_bar));
        assert!(!eval(&property("!bar", None), &with_bar));
        assert!(eval(&property("bar", Some("!qux")), &with_bar));
        assert!(!eval(&property("bar", Some("!baz")), &with_bar));
        assert!(eval(&property("foo", Some("!baz")), &with_bar));
    }

    #[test]
    fn test_property_without_name_is_invalid() {
        let constraints = ProfileConstraints::new();
        assert!(evaluate_activation("p", &property(" ", None), &constraints).is_err());
    }

    #[test]
    fn test_file_exists_interpolates_basedir() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        let constraints = ProfileConstraints::new()
            .with_basedir("/home/user/project")
            .with_file_exists(move |path: &Path| {
                recorder.lock().unwrap().push(path.to_path_buf());
                path == Path::new("/home/user/project/pom.xml")
            });
        let rule = ActivationRule {
            file: Some(FileActivation {
                exists: Some("${basedir}/pom.xml".into()),
                missing: None,
            }),
            ..ActivationRule::default()
        };
        assert!(eval(&rule, &constraints));
        assert_eq!(seen.lock().unwrap()[0], PathBuf::from("/home/user/project/pom.xml"));
    }

    #[test]
    fn test_file_missing_without_basedir() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        let constraints = ProfileConstraints::new().with_file_exists(move |path: &Path| {
            recorder.lock().unwrap().push(path.to_path_buf());
            false
        });
        let rule = ActivationRule {
            file: Some(FileActivation {
                exists: None,
                missing: Some("${basedir}/marker".into()),
            }),
            ..ActivationRule::default()
        };
        assert!(eval(&rule, &constraints));
        assert_eq!(seen.lock().unwrap()[0], PathBuf::from("${basedir}/marker"));
    }

    #[test]
    fn test_no_predicates_never_activates() {
        let rule = ActivationRule::default();
        assert!(!eval(&rule, &ProfileConstraints::new()));
        assert!(is_profile_active("p", &rule, &ProfileConstraints::new().with_active_profile("p")));
    }

    #[test]
    fn test_all_predicates_must_match() {
        let rule = ActivationRule {
            jdk: Some("[11,)".into()),
            property: Some(PropertyActivation {
                name: "ci".into(),
                value: None,
            }),
            ..ActivationRule::default()
        };
        let both = ProfileConstraints::new().with_jdk("17").with_property("ci", "true");
        let jdk_only = ProfileConstraints::new().with_jdk("17");
        assert!(eval(&rule, &both));
        assert!(!eval(&rule, &jdk_only));
    }

    #[test]
    fn test_forced_inactive_wins() {
        let rule = property("foo", None);
        let constraints = ProfileConstraints::new()
            .with_property("foo", "1")
            .with_active_profile("p")
            .with_inactive_profile("p");
        assert!(!is_profile_active("p", &rule, &constraints));
    }
}
