//! Placeholder extraction and comparison.
//!
//! A placeholder is any match of a regex, by default `\{+\w+\}+` (`{name}`, `{{count}}`).
//! Extracted placeholders are sorted, so the order in which they appear in a string does
//! not matter: `"{b} and {a}"` and `"{a} and {b}"` carry the same placeholders.

use lazy_static::lazy_static;
use regex::Regex;

use crate::{error::Error, report::PlaceholderMismatch};

/// The default placeholder pattern.
pub const DEFAULT_PLACEHOLDER_PATTERN: &str = r"\{+\w+\}+";

lazy_static! {
    static ref DEFAULT_PLACEHOLDER_REGEX: Regex = Regex::new(DEFAULT_PLACEHOLDER_PATTERN).unwrap();
}

/// A compiled placeholder pattern.
#[derive(Debug, Clone)]
pub struct PlaceholderMatcher {
    regex: Regex,
}

impl Default for PlaceholderMatcher {
    fn default() -> Self {
        PlaceholderMatcher {
            regex: DEFAULT_PLACEHOLDER_REGEX.clone(),
        }
    }
}

impl PlaceholderMatcher {
    /// Compiles a custom pattern. An invalid regex is an [`Error::InvalidArgument`].
    pub fn new(pattern: &str) -> Result<Self, Error> {
        let regex = Regex::new(pattern).map_err(|e| {
            Error::InvalidArgument(format!("invalid placeholder pattern `{}`: {}", pattern, e))
        })?;
        Ok(PlaceholderMatcher { regex })
    }

    /// Compiles `pattern` when given, otherwise uses the default.
    pub fn from_option(pattern: Option<&str>) -> Result<Self, Error> {
        match pattern {
            Some(p) => Self::new(p),
            None => Ok(Self::default()),
        }
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// All non-overlapping matches in `value`, sorted lexicographically.
    pub fn extract(&self, value: &str) -> Vec<String> {
        let mut found: Vec<String> = self
            .regex
            .find_iter(value)
            .map(|m| m.as_str().to_string())
            .collect();
        found.sort();
        found
    }

    /// Compares the placeholders of a base and a target value, returning the mismatch
    /// when the sorted sequences differ.
    pub fn compare(&self, key: &str, base: &str, target: &str) -> Option<PlaceholderMismatch> {
        let base_placeholders = self.extract(base);
        let target_placeholders = self.extract(target);
        if base_placeholders == target_placeholders {
            None
        } else {
            Some(PlaceholderMismatch {
                key: key.to_string(),
                base_placeholders,
                target_placeholders,
            })
        }
    }
}

/// Extracts placeholders with the default pattern.
///
/// # Example
/// ```rust
/// use l10nkit::placeholder::extract_placeholders;
/// assert_eq!(extract_placeholders("{b} and {{a}}"), vec!["{b}", "{{a}}"]);
/// ```
pub fn extract_placeholders(value: &str) -> Vec<String> {
    PlaceholderMatcher::default().extract(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_sorted() {
        assert_eq!(
            extract_placeholders("Hi {name}, you have {count} {{items}}"),
            vec!["{count}", "{name}", "{{items}}"]
        );
        assert!(extract_placeholders("no placeholders").is_empty());
    }

    #[test]
    fn test_order_insensitive() {
        let matcher = PlaceholderMatcher::default();
        assert!(matcher.compare("k", "{b} and {a}", "{a} and {b}").is_none());
        assert!(matcher.compare("k", "{a}", "{a} {b}").is_some());
    }

    #[test]
    fn test_duplicates_count() {
        let matcher = PlaceholderMatcher::default();
        assert!(matcher.compare("k", "{a} {a}", "{a}").is_some());
    }

    #[test]
    fn test_compare_reports_both_sides() {
        let matcher = PlaceholderMatcher::default();
        let mismatch = matcher.compare("greeting", "Hello {name}!", "Hello!").unwrap();
        assert_eq!(mismatch.key, "greeting");
        assert_eq!(mismatch.base_placeholders, vec!["{name}"]);
        assert!(mismatch.target_placeholders.is_empty());
        assert!(matcher.compare("k", "{x}", "{x}").is_none());
    }

    #[test]
    fn test_custom_pattern() {
        let matcher = PlaceholderMatcher::new(r"%\w").unwrap();
        assert_eq!(matcher.extract("%s of %d"), vec!["%d", "%s"]);
        assert_eq!(matcher.pattern(), r"%\w");
    }

    #[test]
    fn test_invalid_pattern() {
        let err = PlaceholderMatcher::new("(unclosed").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
