//! Project configuration read from `l10nkit.toml`.
//!
//! Every value is optional. Command-line flags take precedence over the file, and the
//! file takes precedence over built-in defaults. API keys are never stored here, only
//! the name of the environment variable that holds them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use l10nkit::{CheckOptions, CheckRule, Severity};
use serde::Deserialize;
use tracing::info;

pub const CONFIG_FILE_NAME: &str = "l10nkit.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    pub defaults: DefaultsConfig,
    pub check: CheckConfig,
    pub translate: TranslateConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsConfig {
    pub base_culture: Option<String>,
    pub ignore: Vec<String>,
    pub recursive: Option<bool>,
    pub placeholder_pattern: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckConfig {
    pub rules: Vec<String>,
    /// Rule name to severity override, e.g. `no-empty-values = "error"`.
    pub severity: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranslateConfig {
    pub provider: Option<String>,
    pub api_key_env: Option<String>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub parallelism: Option<usize>,
    pub delay_ms: Option<u64>,
}

impl ProjectConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Invalid configuration: {}", e))
    }

    /// Loads `explicit` when given (it must exist), otherwise `l10nkit.toml` in the
    /// working directory when present, otherwise an empty configuration.
    pub fn load(explicit: Option<&Path>) -> Result<Self, String> {
        let path = match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(format!("Config file does not exist: {}", path.display()));
                }
                path.to_path_buf()
            }
            None => {
                let default = PathBuf::from(CONFIG_FILE_NAME);
                if !default.is_file() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        info!("loaded configuration from {}", path.display());
        Self::from_toml_str(&content).map_err(|e| format!("{} ({})", e, path.display()))
    }

    pub fn base_culture(&self, flag: Option<&str>) -> String {
        flag.map(str::to_string)
            .or_else(|| self.defaults.base_culture.clone())
            .unwrap_or_else(|| "en".to_string())
    }

    pub fn recursive(&self, flag: bool) -> bool {
        flag || self.defaults.recursive.unwrap_or(false)
    }

    /// Configured ignore patterns followed by the ones given on the command line.
    pub fn ignore(&self, flags: &[String]) -> Vec<String> {
        let mut patterns = self.defaults.ignore.clone();
        for flag in flags {
            if !patterns.contains(flag) {
                patterns.push(flag.clone());
            }
        }
        patterns
    }

    pub fn placeholder_pattern(&self, flag: Option<&str>) -> Option<String> {
        flag.map(str::to_string)
            .or_else(|| self.defaults.placeholder_pattern.clone())
    }

    /// Applies `[check] rules` (when no rules were given on the command line) and the
    /// `[check.severity]` overrides.
    pub fn apply_check(
        &self,
        mut options: CheckOptions,
        flag_rules: &[String],
    ) -> Result<CheckOptions, String> {
        let rules = if flag_rules.is_empty() {
            &self.check.rules
        } else {
            flag_rules
        };
        options = options
            .with_rule_names(rules.iter().map(String::as_str))
            .map_err(|e| e.to_string())?;

        for (rule, severity) in &self.check.severity {
            let rule: CheckRule = rule.parse().map_err(|e: l10nkit::Error| e.to_string())?;
            let severity: Severity = severity
                .parse()
                .map_err(|e: l10nkit::Error| e.to_string())?;
            options = options.with_severity(rule, severity);
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[defaults]
base_culture = "en-US"
ignore = ["node_modules", "bin"]
recursive = true

[check]
rules = ["no-empty-values", "no-orphan-keys"]

[check.severity]
no-empty-values = "error"

[translate]
provider = "deepl"
api_key_env = "MY_DEEPL_KEY"
parallelism = 4
delay_ms = 250
"#;

    #[test]
    fn test_parse_full_config() {
        let config = ProjectConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.defaults.base_culture.as_deref(), Some("en-US"));
        assert_eq!(config.defaults.ignore, vec!["node_modules", "bin"]);
        assert_eq!(config.translate.provider.as_deref(), Some("deepl"));
        assert_eq!(config.translate.parallelism, Some(4));
        assert_eq!(config.translate.delay_ms, Some(250));
        assert_eq!(config.check.severity.len(), 1);
    }

    #[test]
    fn test_flags_override_config() {
        let config = ProjectConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.base_culture(None), "en-US");
        assert_eq!(config.base_culture(Some("de")), "de");
        assert!(config.recursive(false));
        assert_eq!(
            config.ignore(&["bin".to_string(), "obj".to_string()]),
            vec!["node_modules", "bin", "obj"]
        );

        let empty = ProjectConfig::default();
        assert_eq!(empty.base_culture(None), "en");
        assert!(!empty.recursive(false));
        assert!(empty.placeholder_pattern(None).is_none());
    }

    #[test]
    fn test_apply_check_rules_and_severity() {
        let config = ProjectConfig::from_toml_str(SAMPLE).unwrap();
        let options = config.apply_check(CheckOptions::new(), &[]).unwrap();
        assert_eq!(
            options.rules,
            vec![CheckRule::NoEmptyValues, CheckRule::NoOrphanKeys]
        );
        assert_eq!(options.severity_of(CheckRule::NoEmptyValues), Severity::Error);

        let flagged = config
            .apply_check(CheckOptions::new(), &["no-duplicate-keys".to_string()])
            .unwrap();
        assert_eq!(flagged.rules, vec![CheckRule::NoDuplicateKeys]);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = ProjectConfig::from_toml_str("[defaults]\nbase = \"en\"\n").unwrap_err();
        assert!(err.contains("Invalid configuration"));

        let bad_rule = ProjectConfig::from_toml_str("[check.severity]\nno-such-rule = \"info\"\n")
            .unwrap()
            .apply_check(CheckOptions::new(), &[]);
        assert!(bad_rule.is_err());
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let err = ProjectConfig::load(Some(Path::new("/definitely/missing/l10nkit.toml")))
            .unwrap_err();
        assert!(err.contains("does not exist"));
    }
}
