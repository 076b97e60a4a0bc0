//! Scan: compare every target culture found under a directory against a base culture.

use std::{
    collections::{BTreeMap, HashMap},
    path::Path,
};

use tracing::debug;

use crate::{
    culture::normalize_culture,
    discovery::{DiscoverOptions, discover_files},
    error::Error,
    placeholder::PlaceholderMatcher,
    registry::FormatRegistry,
    report::{CultureComparisonResult, PlaceholderMismatch, ScanReport},
    types::{Entry, Resource},
};

/// Key → entry lookup, last write wins.
pub(crate) type KeyIndex<'a> = HashMap<&'a str, &'a Entry>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub base_culture: String,
    /// Cultures to compare; empty means every discovered culture other than the base.
    pub target_cultures: Vec<String>,
    pub recursive: bool,
    pub ignore: Vec<String>,
    pub check_placeholders: bool,
    /// Overrides the default placeholder regex.
    pub placeholder_pattern: Option<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            base_culture: "en".to_string(),
            target_cultures: Vec::new(),
            recursive: false,
            ignore: Vec::new(),
            check_placeholders: true,
            placeholder_pattern: None,
        }
    }
}

impl ScanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_culture(mut self, culture: impl Into<String>) -> Self {
        self.base_culture = culture.into();
        self
    }

    pub fn with_target_cultures<I, S>(mut self, cultures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_cultures = cultures.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_ignore<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_check_placeholders(mut self, check: bool) -> Self {
        self.check_placeholders = check;
        self
    }

    pub fn with_placeholder_pattern(mut self, pattern: Option<String>) -> Self {
        self.placeholder_pattern = pattern;
        self
    }

    pub fn discover_options(&self) -> DiscoverOptions {
        DiscoverOptions::new()
            .with_recursive(self.recursive)
            .with_ignore(self.ignore.iter().cloned())
    }
}

/// Runs scans against files resolved through a [`FormatRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct Scanner<'a> {
    registry: &'a FormatRegistry,
}

impl<'a> Scanner<'a> {
    pub fn new(registry: &'a FormatRegistry) -> Self {
        Scanner { registry }
    }

    /// Scans `path` (a directory, or a single file) and compares each target culture
    /// with the base culture.
    ///
    /// Unparsable files and files without a detectable culture are ignored. When no file
    /// of the base culture exists, the report is empty.
    pub fn scan(&self, path: &Path, options: &ScanOptions) -> Result<ScanReport, Error> {
        let matcher = PlaceholderMatcher::from_option(options.placeholder_pattern.as_deref())?;
        let resources: Vec<Resource> =
            discover_files(path, self.registry, &options.discover_options())?
                .filter(|r| r.culture.is_some())
                .collect();
        Ok(scan_resources(&resources, options, &matcher))
    }
}

/// Groups resources by culture, merging same-culture entries (later resources win).
pub(crate) fn group_by_culture(resources: &[Resource]) -> BTreeMap<String, KeyIndex<'_>> {
    let mut groups: BTreeMap<String, KeyIndex<'_>> = BTreeMap::new();
    for resource in resources {
        let Some(culture) = &resource.culture else {
            continue;
        };
        let index = groups.entry(culture.to_ascii_lowercase()).or_default();
        for entry in &resource.entries {
            index.insert(entry.key.as_str(), entry);
        }
    }
    groups
}

/// The scan algorithm over already-parsed resources.
pub fn scan_resources(
    resources: &[Resource],
    options: &ScanOptions,
    matcher: &PlaceholderMatcher,
) -> ScanReport {
    let base_culture = normalize_culture(&options.base_culture);
    let groups = group_by_culture(resources);

    let Some(base) = groups.get(&base_culture) else {
        debug!("no files for base culture {}", base_culture);
        return ScanReport {
            base_culture,
            ..Default::default()
        };
    };

    let target_cultures: Vec<String> = if options.target_cultures.is_empty() {
        groups
            .keys()
            .filter(|c| **c != base_culture)
            .cloned()
            .collect()
    } else {
        options
            .target_cultures
            .iter()
            .map(|c| normalize_culture(c))
            .filter(|c| *c != base_culture)
            .collect()
    };

    let empty = KeyIndex::new();
    let placeholders = options.check_placeholders.then_some(matcher);
    let results = target_cultures
        .iter()
        .map(|culture| {
            let target = groups.get(culture).unwrap_or(&empty);
            let comparison = compare_indexes(base, target, placeholders);
            CultureComparisonResult {
                culture: culture.clone(),
                missing_keys: comparison.missing,
                orphan_keys: comparison.orphan,
                empty_values: comparison.empty,
                placeholder_mismatches: comparison.placeholder_mismatches,
            }
        })
        .collect();

    ScanReport {
        base_culture,
        target_cultures,
        files_scanned: resources.iter().filter(|r| r.culture.is_some()).count(),
        base_key_count: base.len(),
        results,
    }
}

/// Set differences between two key indexes. All key lists are sorted.
#[derive(Debug, Default)]
pub(crate) struct IndexComparison {
    pub missing: Vec<String>,
    pub orphan: Vec<String>,
    pub empty: Vec<String>,
    pub placeholder_mismatches: Vec<PlaceholderMismatch>,
}

pub(crate) fn compare_indexes(
    base: &KeyIndex<'_>,
    target: &KeyIndex<'_>,
    placeholders: Option<&PlaceholderMatcher>,
) -> IndexComparison {
    let mut out = IndexComparison::default();

    for key in base.keys() {
        if !target.contains_key(key) {
            out.missing.push(key.to_string());
        }
    }
    for (key, entry) in target {
        if !base.contains_key(key) {
            out.orphan.push(key.to_string());
        }
        if entry.is_empty() {
            out.empty.push(key.to_string());
        }
    }
    if let Some(matcher) = placeholders {
        for (key, base_entry) in base {
            let Some(target_entry) = target.get(key) else {
                continue;
            };
            if let Some(mismatch) = matcher.compare(key, base_entry.text(), target_entry.text()) {
                out.placeholder_mismatches.push(mismatch);
            }
        }
        out.placeholder_mismatches.sort_by(|a, b| a.key.cmp(&b.key));
    }

    out.missing.sort();
    out.orphan.sort();
    out.empty.sort();
    out
}

pub(crate) fn index_of(resource: &Resource) -> KeyIndex<'_> {
    resource
        .entries
        .iter()
        .map(|e| (e.key.as_str(), e))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(path: &str, culture: &str, pairs: &[(&str, &str)]) -> Resource {
        Resource::new(
            path,
            Some(culture.to_string()),
            "json",
            pairs
                .iter()
                .map(|(k, v)| Entry::text_entry(*k, *v))
                .collect(),
        )
    }

    #[test]
    fn test_missing_key() {
        let resources = vec![
            resource("en.json", "en", &[("a", "1"), ("b", "2")]),
            resource("tr.json", "tr", &[("a", "1")]),
        ];
        let matcher = PlaceholderMatcher::default();
        let report = scan_resources(&resources, &ScanOptions::new(), &matcher);
        assert_eq!(report.target_cultures, vec!["tr"]);
        let tr = report.result_for("tr").unwrap();
        assert_eq!(tr.missing_keys, vec!["b"]);
        assert!(tr.orphan_keys.is_empty());
        assert!(report.has_issues());
    }

    #[test]
    fn test_orphan_empty_and_placeholders() {
        let resources = vec![
            resource("en.json", "en", &[("greet", "Hi {name}"), ("bye", "Bye")]),
            resource(
                "de.json",
                "de",
                &[("greet", "Hallo"), ("bye", "  "), ("extra", "x")],
            ),
        ];
        let matcher = PlaceholderMatcher::default();
        let report = scan_resources(&resources, &ScanOptions::new(), &matcher);
        let de = report.result_for("de").unwrap();
        assert_eq!(de.orphan_keys, vec!["extra"]);
        assert_eq!(de.empty_values, vec!["bye"]);
        assert_eq!(de.placeholder_mismatches.len(), 1);
        assert_eq!(de.placeholder_mismatches[0].key, "greet");

        let options = ScanOptions::new().with_check_placeholders(false);
        let report = scan_resources(&resources, &options, &PlaceholderMatcher::default());
        assert!(report.results[0].placeholder_mismatches.is_empty());
    }

    #[test]
    fn test_same_culture_files_merge_last_wins() {
        let resources = vec![
            resource("a.en.json", "en", &[("a", "1")]),
            resource("b.en.json", "EN", &[("b", "2")]),
            resource("a.fr.json", "fr", &[("a", "")]),
            resource("b.fr.json", "fr", &[("a", "un"), ("b", "deux")]),
        ];
        let matcher = PlaceholderMatcher::default();
        let report = scan_resources(&resources, &ScanOptions::new(), &matcher);
        assert_eq!(report.base_key_count, 2);
        let fr = report.result_for("fr").unwrap();
        assert!(!fr.has_issues());
    }

    #[test]
    fn test_missing_base_culture_is_empty_report() {
        let resources = vec![resource("tr.json", "tr", &[("a", "1")])];
        let matcher = PlaceholderMatcher::default();
        let report = scan_resources(&resources, &ScanOptions::new(), &matcher);
        assert!(report.results.is_empty());
        assert!(!report.has_issues());
    }

    #[test]
    fn test_explicit_target_without_files() {
        let resources = vec![resource("en.json", "en", &[("a", "1")])];
        let options = ScanOptions::new().with_target_cultures(["pt_BR"]);
        let report = scan_resources(&resources, &options, &PlaceholderMatcher::default());
        assert_eq!(report.target_cultures, vec!["pt-br"]);
        assert_eq!(report.results[0].missing_keys, vec!["a"]);
    }

    #[test]
    fn test_scanner_reads_directory() {
        let dir = tempfile::tempdir().unwrap();
        let en = r#"{"hello":"Hello","world":"World"}"#;
        std::fs::write(dir.path().join("en.json"), en).unwrap();
        std::fs::write(dir.path().join("tr.json"), r#"{"hello":"Merhaba"}"#).unwrap();
        std::fs::write(dir.path().join("messages.json"), r#"{"x":"y"}"#).unwrap();

        let registry = FormatRegistry::default();
        let report = Scanner::new(&registry)
            .scan(dir.path(), &ScanOptions::new().with_target_cultures(["tr"]))
            .unwrap();
        assert_eq!(report.files_scanned, 2);
        assert_eq!(report.results[0].missing_keys, vec!["world"]);
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let registry = FormatRegistry::default();
        let options = ScanOptions::new().with_placeholder_pattern(Some("[".to_string()));
        let err = Scanner::new(&registry).scan(dir.path(), &options).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
