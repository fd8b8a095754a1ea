//! `${property}` interpolation.
//!
//! Property values may refer to other properties and are expanded recursively. Keys
//! currently being expanded are kept on a stack: a key that refers back to itself,
//! directly or through other keys, is left in the text as `${key}`. Placeholders that
//! cannot be resolved stay in the text and are reported in
//! [`Interpolated::unresolved`]; deciding whether that is fatal is up to the caller.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::trace;

/// Upper bound on nested property expansion.
pub const MAX_INTERPOLATION_DEPTH: usize = 32;

/// Expansion stops substituting once a string grows past this many bytes.
pub const MAX_INTERPOLATED_LEN: usize = 64 * 1024;

/// Innermost `${key}` occurrences: keys never contain `$`, `{` or `}`.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^${}]+)\}")
        .unwrap_or_else(|e| unreachable!("static placeholder pattern: {e}"))
});

/// Result of interpolating one string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpolated {
    pub text: String,
    /// Placeholder names left in `text`, in order of first appearance.
    pub unresolved: Vec<String>,
}

impl Interpolated {
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Interpolate against a property map.
#[must_use]
pub fn interpolate(text: &str, properties: &BTreeMap<String, String>) -> Interpolated {
    interpolate_with(text, |key| properties.get(key).cloned())
}

/// Interpolate with an arbitrary lookup.
pub fn interpolate_with<F>(text: &str, lookup: F) -> Interpolated
where
    F: Fn(&str) -> Option<String>,
{
    let mut expander = Expander {
        lookup: &lookup,
        stack: Vec::new(),
    };
    let text = expander.expand(text);

    let mut unresolved: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(&text) {
        let key = caps[1].to_string();
        if !unresolved.contains(&key) {
            unresolved.push(key);
        }
    }
    Interpolated { text, unresolved }
}

struct Expander<'a, F> {
    lookup: &'a F,
    /// Keys whose values are being expanded, outermost first.
    stack: Vec<String>,
}

impl<F> Expander<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn expand(&mut self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let body = &rest[start + 2..];
            let Some(end) = closing_brace(body) else {
                out.push_str(&rest[start..]);
                return out;
            };
            if out.len() > MAX_INTERPOLATED_LEN {
                trace!(len = out.len(), "interpolated text too long, leaving the rest as is");
                out.push_str(&rest[start..]);
                return out;
            }
            let key = self.expand(&body[..end]);
            let value = self.substitute(key);
            out.push_str(&value);
            rest = &body[end + 1..];
        }
        out.push_str(rest);
        out
    }

    fn substitute(&mut self, key: String) -> String {
        if self.stack.contains(&key) || self.stack.len() >= MAX_INTERPOLATION_DEPTH {
            trace!(key = %key, stack = ?self.stack, "not expanding property again");
            return format!("${{{key}}}");
        }
        match (self.lookup)(&key) {
            Some(value) => {
                self.stack.push(key);
                let expanded = self.expand(&value);
                self.stack.pop();
                expanded
            }
            None => format!("${{{key}}}"),
        }
    }
}

/// Offset of the `}` closing a placeholder whose `${` has already been consumed.
fn closing_brace(body: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    let mut depth = 0usize;
    let mut index = 0;
    while index < bytes.len() {
        match bytes[index] {
            b'$' if bytes.get(index + 1) == Some(&b'{') => {
                depth += 1;
                index += 1;
            }
            b'}' if depth == 0 => return Some(index),
            b'}' => depth -= 1,
            _ => {}
        }
        index += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn test_simple_substitution() {
        let result = interpolate("${a}-${b}", &props(&[("a", "1"), ("b", "2")]));
        assert_eq!(result.text, "1-2");
        assert!(result.is_resolved());
    }

    #[test]
    fn test_chained_properties() {
        let properties = props(&[("version", "${major}.${minor}"), ("major", "2"), ("minor", "5")]);
        assert_eq!(interpolate("v${version}", &properties).text, "v2.5");
    }

    #[test]
    fn test_nested_placeholder_key() {
        let properties = props(&[("env", "prod"), ("url.prod", "https://prod")]);
        assert_eq!(interpolate("${url.${env}}", &properties).text, "https://prod");
    }

    #[test]
    fn test_unresolved_left_in_place() {
        let result = interpolate("${known}/${unknown}/${unknown}", &props(&[("known", "k")]));
        assert_eq!(result.text, "k/${unknown}/${unknown}");
        assert_eq!(result.unresolved, vec!["unknown".to_string()]);
    }

    #[test]
    fn test_cycle_terminates() {
        let result = interpolate("${a}", &props(&[("a", "${b}"), ("b", "${a}")]));
        assert_eq!(result.text, "${a}");
        assert_eq!(result.unresolved, vec!["a".to_string()]);

        let growing = interpolate("${a}", &props(&[("a", "x${a}")]));
        assert_eq!(growing.text, "x${a}");
        assert!(!growing.is_resolved());
    }

    #[test]
    fn test_self_reference_does_not_multiply() {
        let doubled = interpolate("${a}", &props(&[("a", "${a}${a}")]));
        assert_eq!(doubled.text, "${a}${a}");
        assert_eq!(doubled.unresolved, vec!["a".to_string()]);

        let mutual = interpolate("${a}", &props(&[("a", "${b}${b}"), ("b", "${a}")]));
        assert_eq!(mutual.text, "${a}${a}");
        assert_eq!(mutual.unresolved, vec!["a".to_string()]);
    }

    #[test]
    fn test_fan_out_is_bounded() {
        // each level doubles the previous one
        let mut properties = props(&[("p0", "xxxxxxxx")]);
        for level in 1..=40 {
            let previous = format!("${{p{}}}", level - 1);
            properties.insert(format!("p{level}"), format!("{previous}{previous}"));
        }
        let result = interpolate("${p40}", &properties);
        assert!(result.text.len() < 64 * MAX_INTERPOLATED_LEN);
        assert!(!result.is_resolved());
    }

    #[test]
    fn test_repeated_key_outside_cycle_expands() {
        let result = interpolate("${a}", &props(&[("a", "${b}-${b}"), ("b", "1")]));
        assert_eq!(result.text, "1-1");
        assert!(result.is_resolved());
    }

    #[test]
    fn test_unterminated_placeholder_kept() {
        let result = interpolate("${a}-${b", &props(&[("a", "1")]));
        assert_eq!(result.text, "1-${b");
        assert!(result.is_resolved());
    }

    #[test]
    fn test_idempotent_on_resolved_text() {
        let properties = props(&[("a", "1")]);
        for text in ["1.0.0", "plain text", "$notaplaceholder", "{a}", "$ {a}", ""] {
            let result = interpolate(text, &properties);
            assert_eq!(result.text, text);
            assert!(result.is_resolved());
        }
        let once = interpolate("${a}.0", &properties).text;
        assert_eq!(interpolate(&once, &properties).text, once);
    }
}
