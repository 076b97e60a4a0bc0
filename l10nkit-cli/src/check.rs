use std::path::PathBuf;

use l10nkit::{CheckOptions, CheckReport, Checker, FormatRegistry, Severity};

use crate::config::ProjectConfig;
use crate::render::{
    ReportArgs, Tone, ci_result, color_enabled, paint, print_or_write, to_json,
};
use crate::validation::{validate_input_path, validate_language_code, validate_rule_names};

#[derive(clap::Args, Debug, Clone)]
pub struct CheckCommand {
    /// File or directory to check
    pub path: PathBuf,

    /// Rules to run, comma separated (default: all)
    #[arg(long = "rule", value_delimiter = ',')]
    pub rules: Vec<String>,

    /// Base culture used by the orphan and placeholder rules
    #[arg(short, long)]
    pub base: Option<String>,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Skip files whose name contains this text (repeatable)
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Regex used to extract placeholders
    #[arg(long)]
    pub placeholder_pattern: Option<String>,

    #[command(flatten)]
    pub report: ReportArgs,
}

pub fn build_check_options(
    cmd: &CheckCommand,
    config: &ProjectConfig,
) -> Result<CheckOptions, String> {
    let options = CheckOptions::new()
        .with_base_culture(config.base_culture(cmd.base.as_deref()))
        .with_recursive(config.recursive(cmd.recursive))
        .with_ignore(config.ignore(&cmd.ignore))
        .with_placeholder_pattern(config.placeholder_pattern(cmd.placeholder_pattern.as_deref()));
    config.apply_check(options, &cmd.rules)
}

fn severity_tone(severity: Severity) -> Tone {
    match severity {
        Severity::Error => Tone::Bad,
        Severity::Warning => Tone::Warn,
        Severity::Info => Tone::Muted,
    }
}

pub fn render_check_human(report: &CheckReport, color: bool) -> String {
    let mut lines = Vec::new();
    lines.push("=== Check ===".to_string());
    lines.push(format!("Files checked: {}", report.files_checked));

    for violation in &report.violations {
        let label = format!("[{}]", violation.severity);
        let location = match &violation.key {
            Some(key) => format!("{} ({})", violation.file_path.display(), key),
            None => violation.file_path.display().to_string(),
        };
        lines.push(format!(
            "{} {}: {} {}",
            paint(&label, severity_tone(violation.severity), color),
            violation.rule_name,
            location,
            violation.message
        ));
    }

    if report.has_issues() {
        lines.push(paint(
            &format!(
                "❌ {} violation(s): {} error(s), {} warning(s), {} info",
                report.violations.len(),
                report.count(Severity::Error),
                report.count(Severity::Warning),
                report.count(Severity::Info)
            ),
            if report.has_errors() { Tone::Bad } else { Tone::Warn },
            color,
        ));
    } else {
        lines.push(paint("✅ No violations", Tone::Good, color));
    }
    lines.join("\n")
}

pub fn run_check_command(cmd: CheckCommand, config: &ProjectConfig) -> Result<(), String> {
    validate_input_path(&cmd.path)?;
    validate_rule_names(&cmd.rules)?;
    if let Some(base) = &cmd.base {
        validate_language_code(base)?;
    }

    let options = build_check_options(&cmd, config)?;
    let registry = FormatRegistry::default();
    let report = Checker::new(&registry)
        .check(&cmd.path, &options)
        .map_err(|e| e.to_string())?;

    let rendered = if cmd.report.json {
        to_json(&report)?
    } else {
        render_check_human(&report, color_enabled() && cmd.report.output.is_none())
    };
    print_or_write(cmd.report.output.as_deref(), &rendered)?;
    ci_result(cmd.report.ci, report.violations.len())
}
