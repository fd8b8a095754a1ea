//! Token classification for partially specified coordinates.
//!
//! Coordinates on the command line often omit positional fields, so a bare trailing
//! token has to be classified. The priority is version, then classifier, then main class.

/// Classifiers that are recognized by name.
const KNOWN_CLASSIFIERS: [&str; 5] = ["sources", "javadoc", "tests", "shaded", "uber"];

/// Segments that mark platform-specific (native) classifiers such as `natives-linux`.
///
/// Classifiers are compared segment by segment after splitting at `-` and `_`, so
/// `linux-x86_64` matches on `linux` and `x86`.
const PLATFORM_MARKERS: [&str; 24] = [
    "natives", "native", "linux", "windows", "win32", "win64", "macos", "osx", "darwin",
    "freebsd", "android", "ios", "x86", "x64", "amd64", "aarch64", "aarch", "arm", "arm64",
    "armv7", "i386", "i686", "ppc64le", "s390x",
];

/// Packaging types that must never be mistaken for a class name.
pub(crate) const KNOWN_PACKAGINGS: [&str; 11] = [
    "jar", "pom", "war", "ear", "rar", "aar", "ejb", "zip", "bundle", "test-jar", "maven-plugin",
];

/// A version starts with a digit or a range bracket, or is a symbolic keyword.
#[must_use]
pub fn looks_like_version(token: &str) -> bool {
    let token = token.trim();
    match token.chars().next() {
        Some(c) if c.is_ascii_digit() || c == '[' || c == '(' => true,
        Some(_) => ["LATEST", "RELEASE", "MANAGED"].iter().any(|k| token.eq_ignore_ascii_case(k)),
        None => false,
    }
}

/// A classifier is one of the well-known names or mentions an OS or CPU architecture.
#[must_use]
pub fn looks_like_classifier(token: &str) -> bool {
    let lower = token.trim().to_ascii_lowercase();
    if lower.is_empty() {
        return false;
    }
    KNOWN_CLASSIFIERS.contains(&lower.as_str())
        || lower.split(['-', '_']).any(|segment| PLATFORM_MARKERS.contains(&segment))
}

/// A main class is a dotted Java identifier: non-empty segments, no hyphens, and no
/// segment starting with a digit.
#[must_use]
pub fn looks_like_main_class(token: &str) -> bool {
    !token.is_empty()
        && token.split('.').all(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) if is_java_identifier_start(first) => {
                    chars.all(is_java_identifier_part)
                }
                _ => false,
            }
        })
}

fn is_java_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_java_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_like_version() {
        assert!(looks_like_version("1.0"));
        assert!(looks_like_version("2"));
        assert!(looks_like_version("[1.0,2.0)"));
        assert!(looks_like_version("(,1.5]"));
        assert!(looks_like_version("latest"));
        assert!(looks_like_version("RELEASE"));
        assert!(looks_like_version("Managed"));
        assert!(!looks_like_version("sources"));
        assert!(!looks_like_version("v1.0"));
        assert!(!looks_like_version(""));
    }

    #[test]
    fn test_looks_like_classifier() {
        let classifiers = [
            "sources",
            "javadoc",
            "tests",
            "shaded",
            "uber",
            "natives-linux",
            "linux-x86_64",
            "osx-aarch_64",
            "windows-amd64",
            "linux-arm",
            "IOS",
        ];
        for token in classifiers {
            assert!(looks_like_classifier(token), "{token}");
        }
        // markers only count as whole segments
        for token in ["harmony", "scenarios", "warm-up", "firmware", "linuxish"] {
            assert!(!looks_like_classifier(token), "{token}");
        }
        assert!(!looks_like_classifier("jar"));
        assert!(!looks_like_classifier("com.example.Main"));
        assert!(!looks_like_classifier(""));
    }

    #[test]
    fn test_looks_like_main_class() {
        assert!(looks_like_main_class("com.example.Main"));
        assert!(looks_like_main_class("Main"));
        assert!(looks_like_main_class("org.example.$Inner_1"));
        assert!(!looks_like_main_class("com.example-app.Main"));
        assert!(!looks_like_main_class("com..Main"));
        assert!(!looks_like_main_class("com.1example.Main"));
        assert!(!looks_like_main_class("Main."));
        assert!(!looks_like_main_class(""));
    }
}
