//! Check: rule-based validation of single files or whole directories.
//!
//! Rules are selected by name; an empty selection runs every rule. Rules that compare
//! against a base culture (`no-orphan-keys`, `consistent-placeholders`) are skipped for
//! files that are themselves the base, or when no base file exists.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    path::Path,
    str::FromStr,
};

use tracing::debug;

use crate::{
    culture::normalize_culture,
    discovery::{DiscoverOptions, discover_files},
    error::Error,
    placeholder::PlaceholderMatcher,
    registry::FormatRegistry,
    report::{CheckReport, Severity, Violation},
    scan::{KeyIndex, group_by_culture, index_of},
    types::Resource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CheckRule {
    NoEmptyValues,
    NoDuplicateKeys,
    NoOrphanKeys,
    ConsistentPlaceholders,
    NoTrailingWhitespace,
}

impl CheckRule {
    pub const ALL: [CheckRule; 5] = [
        CheckRule::NoEmptyValues,
        CheckRule::NoDuplicateKeys,
        CheckRule::NoOrphanKeys,
        CheckRule::ConsistentPlaceholders,
        CheckRule::NoTrailingWhitespace,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CheckRule::NoEmptyValues => "no-empty-values",
            CheckRule::NoDuplicateKeys => "no-duplicate-keys",
            CheckRule::NoOrphanKeys => "no-orphan-keys",
            CheckRule::ConsistentPlaceholders => "consistent-placeholders",
            CheckRule::NoTrailingWhitespace => "no-trailing-whitespace",
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            CheckRule::NoEmptyValues => Severity::Warning,
            CheckRule::NoDuplicateKeys => Severity::Error,
            CheckRule::NoOrphanKeys => Severity::Warning,
            CheckRule::ConsistentPlaceholders => Severity::Error,
            CheckRule::NoTrailingWhitespace => Severity::Info,
        }
    }

    pub fn needs_base(&self) -> bool {
        matches!(
            self,
            CheckRule::NoOrphanKeys | CheckRule::ConsistentPlaceholders
        )
    }
}

impl fmt::Display for CheckRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CheckRule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        CheckRule::ALL
            .into_iter()
            .find(|rule| rule.name() == wanted)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown check rule `{}`", s.trim())))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOptions {
    /// Rules to run; empty runs all of them.
    pub rules: Vec<CheckRule>,
    pub base_culture: String,
    pub recursive: bool,
    pub ignore: Vec<String>,
    pub placeholder_pattern: Option<String>,
    /// Per-rule severity overrides.
    pub severities: HashMap<CheckRule, Severity>,
}

impl Default for CheckOptions {
    fn default() -> Self {
        CheckOptions {
            rules: Vec::new(),
            base_culture: "en".to_string(),
            recursive: false,
            ignore: Vec::new(),
            placeholder_pattern: None,
            severities: HashMap::new(),
        }
    }
}

impl CheckOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules<I: IntoIterator<Item = CheckRule>>(mut self, rules: I) -> Self {
        self.rules = rules.into_iter().collect();
        self
    }

    /// Selects rules by name, failing on the first unknown name.
    pub fn with_rule_names<I, S>(mut self, names: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.rules = names
            .into_iter()
            .map(|n| n.as_ref().parse())
            .collect::<Result<_, _>>()?;
        Ok(self)
    }

    pub fn with_base_culture(mut self, culture: impl Into<String>) -> Self {
        self.base_culture = culture.into();
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

    pub fn with_placeholder_pattern(mut self, pattern: Option<String>) -> Self {
        self.placeholder_pattern = pattern;
        self
    }

    pub fn with_severity(mut self, rule: CheckRule, severity: Severity) -> Self {
        self.severities.insert(rule, severity);
        self
    }

    pub fn is_enabled(&self, rule: CheckRule) -> bool {
        self.rules.is_empty() || self.rules.contains(&rule)
    }

    pub fn severity_of(&self, rule: CheckRule) -> Severity {
        self.severities
            .get(&rule)
            .copied()
            .unwrap_or_else(|| rule.default_severity())
    }

    fn discover_options(&self) -> DiscoverOptions {
        DiscoverOptions::new()
            .with_recursive(self.recursive)
            .with_ignore(self.ignore.iter().cloned())
    }
}

/// Runs the enabled rules over one resource. `base` is the reference for the
/// base-culture rules; pass `None` for base files themselves.
pub fn check_resource(
    resource: &Resource,
    base: Option<&Resource>,
    options: &CheckOptions,
) -> Result<Vec<Violation>, Error> {
    let matcher = PlaceholderMatcher::from_option(options.placeholder_pattern.as_deref())?;
    let base_index = base.map(index_of);
    Ok(check_against_index(
        resource,
        base_index.as_ref(),
        options,
        &matcher,
    ))
}

fn check_against_index(
    resource: &Resource,
    base: Option<&KeyIndex<'_>>,
    options: &CheckOptions,
    matcher: &PlaceholderMatcher,
) -> Vec<Violation> {
    let violation = |rule: CheckRule, key: Option<&str>, message: String| Violation {
        rule_name: rule.name().to_string(),
        file_path: resource.path.clone(),
        key: key.map(str::to_string),
        message,
        severity: options.severity_of(rule),
    };
    let mut out = Vec::new();

    if options.is_enabled(CheckRule::NoEmptyValues) {
        for entry in resource.entries.iter().filter(|e| e.is_empty()) {
            out.push(violation(
                CheckRule::NoEmptyValues,
                Some(&entry.key),
                format!("`{}` has an empty value", entry.key),
            ));
        }
    }

    if options.is_enabled(CheckRule::NoDuplicateKeys) {
        for (key, n) in resource.key_counts().into_iter().filter(|(_, n)| *n > 1) {
            out.push(violation(
                CheckRule::NoDuplicateKeys,
                Some(key),
                format!("`{}` is defined {} times", key, n),
            ));
        }
    }

    if let Some(base) = base {
        let own = index_of(resource);

        if options.is_enabled(CheckRule::NoOrphanKeys) {
            let mut orphans: Vec<&str> = own
                .keys()
                .copied()
                .filter(|k| !base.contains_key(k))
                .collect();
            orphans.sort();
            for key in orphans {
                out.push(violation(
                    CheckRule::NoOrphanKeys,
                    Some(key),
                    format!("`{}` does not exist in the base culture", key),
                ));
            }
        }

        if options.is_enabled(CheckRule::ConsistentPlaceholders) {
            let mut keys: Vec<&str> = own.keys().copied().collect();
            keys.sort();
            for key in keys {
                let (Some(base_entry), Some(entry)) = (base.get(key), own.get(key)) else {
                    continue;
                };
                if let Some(m) = matcher.compare(key, base_entry.text(), entry.text()) {
                    out.push(violation(
                        CheckRule::ConsistentPlaceholders,
                        Some(key),
                        format!(
                            "placeholders differ from base: expected [{}], found [{}]",
                            m.base_placeholders.join(", "),
                            m.target_placeholders.join(", ")
                        ),
                    ));
                }
            }
        }
    }

    if options.is_enabled(CheckRule::NoTrailingWhitespace) {
        for entry in &resource.entries {
            let Some(value) = entry.value.as_deref() else {
                continue;
            };
            if !value.trim().is_empty() && value.trim() != value {
                out.push(violation(
                    CheckRule::NoTrailingWhitespace,
                    Some(&entry.key),
                    format!("`{}` has leading or trailing whitespace", entry.key),
                ));
            }
        }
    }

    out
}

#[derive(Debug, Clone, Copy)]
pub struct Checker<'a> {
    registry: &'a FormatRegistry,
}

impl<'a> Checker<'a> {
    pub fn new(registry: &'a FormatRegistry) -> Self {
        Checker { registry }
    }

    /// Checks a single file or every supported file in a directory.
    ///
    /// For a directory, the merged base-culture files are the reference for base rules and
    /// unparsable files are skipped. For a single file, read errors are returned and the
    /// base is looked up among the file's siblings.
    pub fn check(&self, path: &Path, options: &CheckOptions) -> Result<CheckReport, Error> {
        let matcher = PlaceholderMatcher::from_option(options.placeholder_pattern.as_deref())?;
        let base_culture = normalize_culture(&options.base_culture);

        let (targets, references) = if path.is_dir() {
            let resources: Vec<Resource> =
                discover_files(path, self.registry, &options.discover_options())?.collect();
            (resources.clone(), resources)
        } else {
            let resource = self.registry.read_file(path)?;
            let siblings = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
                Some(dir) => discover_files(dir, self.registry, &DiscoverOptions::new())?
                    .filter(|r| r.path != resource.path)
                    .collect(),
                None => Vec::new(),
            };
            (vec![resource], siblings)
        };

        let groups: BTreeMap<String, KeyIndex<'_>> = group_by_culture(&references);
        let base = groups.get(&base_culture);
        if base.is_none() {
            debug!("no base-culture file for {}", base_culture);
        }

        let mut report = CheckReport::default();
        for resource in &targets {
            let is_base = resource
                .culture
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(&base_culture));
            let reference = if is_base { None } else { base };
            report
                .violations
                .extend(check_against_index(resource, reference, options, &matcher));
            report.files_checked += 1;
        }
        Ok(report)
    }
}
