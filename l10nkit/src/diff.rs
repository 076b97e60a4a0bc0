//! Diff: key-level comparison of exactly two files.

use std::path::Path;

use crate::{
    error::Error,
    placeholder::PlaceholderMatcher,
    registry::FormatRegistry,
    report::DiffReport,
    scan::{compare_indexes, index_of},
    types::Resource,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOptions {
    pub check_placeholders: bool,
    pub placeholder_pattern: Option<String>,
}

impl Default for DiffOptions {
    fn default() -> Self {
        DiffOptions {
            check_placeholders: true,
            placeholder_pattern: None,
        }
    }
}

impl DiffOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_check_placeholders(mut self, check: bool) -> Self {
        self.check_placeholders = check;
        self
    }

    pub fn with_placeholder_pattern(mut self, pattern: Option<String>) -> Self {
        self.placeholder_pattern = pattern;
        self
    }
}

/// Compares two parsed resources; `first` plays the role of the base.
pub fn diff_resources(
    first: &Resource,
    second: &Resource,
    options: &DiffOptions,
) -> Result<DiffReport, Error> {
    let matcher = PlaceholderMatcher::from_option(options.placeholder_pattern.as_deref())?;
    let comparison = compare_indexes(
        &index_of(first),
        &index_of(second),
        options.check_placeholders.then_some(&matcher),
    );
    Ok(DiffReport {
        first_path: first.path.clone(),
        second_path: second.path.clone(),
        only_in_first: comparison.missing,
        only_in_second: comparison.orphan,
        empty_in_second: comparison.empty,
        placeholder_mismatches: comparison.placeholder_mismatches,
    })
}

#[derive(Debug, Clone, Copy)]
pub struct Differ<'a> {
    registry: &'a FormatRegistry,
}

impl<'a> Differ<'a> {
    pub fn new(registry: &'a FormatRegistry) -> Self {
        Differ { registry }
    }

    /// Reads both files and compares them. Read and parse failures are returned as-is;
    /// the two files may be in different formats.
    pub fn diff(
        &self,
        first: &Path,
        second: &Path,
        options: &DiffOptions,
    ) -> Result<DiffReport, Error> {
        let first = self.registry.read_file(first)?;
        let second = self.registry.read_file(second)?;
        diff_resources(&first, &second, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Entry;
    use std::fs;

    #[test]
    fn test_diff_placeholder_mismatch() {
        let first = Resource::new(
            "a.json",
            None,
            "json",
            vec![Entry::text_entry("greeting", "Hello {name}!")],
        );
        let second = first.with_entries(vec![Entry::text_entry("greeting", "Hello!")]);
        let report = diff_resources(&first, &second, &DiffOptions::new()).unwrap();
        assert_eq!(report.placeholder_mismatches.len(), 1);
        let mismatch = &report.placeholder_mismatches[0];
        assert_eq!(mismatch.key, "greeting");
        assert_eq!(mismatch.base_placeholders, vec!["{name}"]);
        assert!(mismatch.target_placeholders.is_empty());
        assert!(report.only_in_first.is_empty());
    }

    #[test]
    fn test_diff_key_sets() {
        let first = Resource::new(
            "a.json",
            None,
            "json",
            vec![Entry::text_entry("a", "1"), Entry::text_entry("b", "2")],
        );
        let second = first.with_entries(vec![
            Entry::text_entry("b", ""),
            Entry::text_entry("c", "3"),
        ]);
        let report = diff_resources(&first, &second, &DiffOptions::new()).unwrap();
        assert_eq!(report.only_in_first, vec!["a"]);
        assert_eq!(report.only_in_second, vec!["c"]);
        assert_eq!(report.empty_in_second, vec!["b"]);
        assert_eq!(report.total_issues(), 3);
    }

    #[test]
    fn test_differ_across_formats() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("en.json");
        let yaml = dir.path().join("en.yaml");
        fs::write(&json, r#"{"home": {"title": "Home"}}"#).unwrap();
        fs::write(&yaml, "home:\n  title: Home\n").unwrap();

        let registry = FormatRegistry::default();
        let report = Differ::new(&registry)
            .diff(&json, &yaml, &DiffOptions::new())
            .unwrap();
        assert!(!report.has_issues());
    }

    #[test]
    fn test_differ_propagates_errors() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("en.json");
        let bad = dir.path().join("tr.json");
        fs::write(&good, "{}").unwrap();
        fs::write(&bad, "{").unwrap();

        let registry = FormatRegistry::default();
        let differ = Differ::new(&registry);
        let err = differ.diff(&good, &bad, &DiffOptions::new()).unwrap_err();
        assert!(err.is_malformed_content());
        assert!(matches!(
            differ.diff(&good, &dir.path().join("missing.json"), &DiffOptions::new()),
            Err(Error::NotFound(_))
        ));
    }
}
