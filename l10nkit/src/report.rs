//! Report types returned by scan, diff and check.
//!
//! Reports are plain values built once by the comparison engine. They serialize to JSON
//! for machine consumption; key lists are sorted so the output is stable.

use std::{fmt, path::PathBuf, str::FromStr};

use serde::Serialize;

use crate::error::Error;

/// A key whose base and target values carry different placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceholderMismatch {
    pub key: String,
    /// Sorted placeholders of the base (or first) value.
    pub base_placeholders: Vec<String>,
    /// Sorted placeholders of the target (or second) value.
    pub target_placeholders: Vec<String>,
}

/// How one target culture compares to the base culture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CultureComparisonResult {
    pub culture: String,
    /// Base keys the target lacks.
    pub missing_keys: Vec<String>,
    /// Target keys the base lacks.
    pub orphan_keys: Vec<String>,
    /// Target keys whose value is absent or whitespace-only.
    pub empty_values: Vec<String>,
    pub placeholder_mismatches: Vec<PlaceholderMismatch>,
}

impl CultureComparisonResult {
    pub fn has_issues(&self) -> bool {
        self.total_issues() > 0
    }

    pub fn total_issues(&self) -> usize {
        self.missing_keys.len()
            + self.orphan_keys.len()
            + self.empty_values.len()
            + self.placeholder_mismatches.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub base_culture: String,
    pub target_cultures: Vec<String>,
    /// Number of files that were parsed and carried a culture.
    pub files_scanned: usize,
    /// Keys in the merged base-culture map.
    pub base_key_count: usize,
    pub results: Vec<CultureComparisonResult>,
}

impl ScanReport {
    pub fn has_issues(&self) -> bool {
        self.results.iter().any(CultureComparisonResult::has_issues)
    }

    pub fn total_issues(&self) -> usize {
        self.results
            .iter()
            .map(CultureComparisonResult::total_issues)
            .sum()
    }

    pub fn result_for(&self, culture: &str) -> Option<&CultureComparisonResult> {
        self.results
            .iter()
            .find(|r| r.culture.eq_ignore_ascii_case(culture))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffReport {
    pub first_path: PathBuf,
    pub second_path: PathBuf,
    pub only_in_first: Vec<String>,
    pub only_in_second: Vec<String>,
    pub empty_in_second: Vec<String>,
    pub placeholder_mismatches: Vec<PlaceholderMismatch>,
}

impl DiffReport {
    pub fn has_issues(&self) -> bool {
        self.total_issues() > 0
    }

    pub fn total_issues(&self) -> usize {
        self.only_in_first.len()
            + self.only_in_second.len()
            + self.empty_in_second.len()
            + self.placeholder_mismatches.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            other => Err(Error::InvalidArgument(format!("unknown severity `{}`", other))),
        }
    }
}

/// One rule violation found by check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub rule_name: String,
    pub file_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub files_checked: usize,
    pub violations: Vec<Violation>,
}

impl CheckReport {
    pub fn has_issues(&self) -> bool {
        !self.violations.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == Severity::Error)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == severity)
            .count()
    }

    /// Violations of one rule.
    pub fn by_rule<'a>(&'a self, rule_name: &'a str) -> impl Iterator<Item = &'a Violation> {
        self.violations.iter().filter(move |v| v.rule_name == rule_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_report_issue_counts() {
        let report = ScanReport {
            base_culture: "en".to_string(),
            target_cultures: vec!["tr".to_string(), "de".to_string()],
            results: vec![
                CultureComparisonResult {
                    culture: "tr".to_string(),
                    missing_keys: vec!["a".to_string()],
                    empty_values: vec!["b".to_string()],
                    ..Default::default()
                },
                CultureComparisonResult {
                    culture: "de".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert!(report.has_issues());
        assert_eq!(report.total_issues(), 2);
        assert!(!report.result_for("DE").unwrap().has_issues());
        assert!(!ScanReport::default().has_issues());
    }

    #[test]
    fn test_check_report_counts() {
        let violation = |severity| Violation {
            rule_name: "no-empty-values".to_string(),
            file_path: PathBuf::from("en.json"),
            key: Some("a".to_string()),
            message: "empty".to_string(),
            severity,
        };
        let report = CheckReport {
            files_checked: 1,
            violations: vec![violation(Severity::Warning), violation(Severity::Info)],
        };
        assert!(report.has_issues());
        assert!(!report.has_errors());
        assert_eq!(report.count(Severity::Warning), 1);
        assert_eq!(report.by_rule("no-empty-values").count(), 2);
    }

    #[test]
    fn test_severity_serialization() {
        assert_eq!(
            serde_json::to_string(&Severity::Warning).unwrap(),
            "\"warning\""
        );
        assert_eq!("ERROR".parse::<Severity>().unwrap(), Severity::Error);
        assert!("fatal".parse::<Severity>().is_err());
    }
}
