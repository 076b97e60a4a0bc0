use std::path::PathBuf;

use l10nkit::{DiffOptions, DiffReport, Differ, FormatRegistry};

use crate::config::ProjectConfig;
use crate::render::{
    ReportArgs, Tone, ci_result, color_enabled, paint, print_or_write, push_key_list, to_json,
};
use crate::validation::validate_file_path;

#[derive(clap::Args, Debug, Clone)]
pub struct DiffCommand {
    /// Reference file
    pub first: PathBuf,

    /// File compared against the reference
    pub second: PathBuf,

    /// Skip placeholder consistency checks
    #[arg(long)]
    pub no_placeholders: bool,

    /// Regex used to extract placeholders
    #[arg(long)]
    pub placeholder_pattern: Option<String>,

    #[command(flatten)]
    pub report: ReportArgs,
}

pub fn render_diff_human(report: &DiffReport, color: bool) -> String {
    let mut lines = Vec::new();
    lines.push("=== Diff ===".to_string());
    lines.push(format!("First:  {}", report.first_path.display()));
    lines.push(format!("Second: {}", report.second_path.display()));
    lines.push(format!(
        "Totals: only_in_first={}, only_in_second={}, empty_in_second={}, placeholder_mismatches={}",
        report.only_in_first.len(),
        report.only_in_second.len(),
        report.empty_in_second.len(),
        report.placeholder_mismatches.len()
    ));

    push_key_list(&mut lines, "", "only in first", &report.only_in_first);
    push_key_list(&mut lines, "", "only in second", &report.only_in_second);
    push_key_list(&mut lines, "", "empty in second", &report.empty_in_second);
    for mismatch in &report.placeholder_mismatches {
        lines.push(format!(
            "placeholder mismatch: {} [{}] vs [{}]",
            mismatch.key,
            mismatch.base_placeholders.join(", "),
            mismatch.target_placeholders.join(", ")
        ));
    }

    if report.has_issues() {
        lines.push(paint(
            &format!("❌ {} difference(s)", report.total_issues()),
            Tone::Bad,
            color,
        ));
    } else {
        lines.push(paint("✅ Files are consistent", Tone::Good, color));
    }
    lines.join("\n")
}

pub fn run_diff_command(cmd: DiffCommand, config: &ProjectConfig) -> Result<(), String> {
    validate_file_path(&cmd.first)?;
    validate_file_path(&cmd.second)?;

    let options = DiffOptions::new()
        .with_check_placeholders(!cmd.no_placeholders)
        .with_placeholder_pattern(config.placeholder_pattern(cmd.placeholder_pattern.as_deref()));
    let registry = FormatRegistry::default();
    let report = Differ::new(&registry)
        .diff(&cmd.first, &cmd.second, &options)
        .map_err(|e| e.to_string())?;

    let rendered = if cmd.report.json {
        to_json(&report)?
    } else {
        render_diff_human(&report, color_enabled() && cmd.report.output.is_none())
    };
    print_or_write(cmd.report.output.as_deref(), &rendered)?;
    ci_result(cmd.report.ci, report.total_issues())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_diff_human() {
        let report = DiffReport {
            first_path: PathBuf::from("a.json"),
            second_path: PathBuf::from("b.json"),
            only_in_first: vec!["x".to_string(), "y".to_string()],
            empty_in_second: vec!["z".to_string()],
            ..Default::default()
        };
        let text = render_diff_human(&report, false);
        assert!(text.contains("only in first: x, y"));
        assert!(text.contains("empty in second: z"));
        assert!(!text.contains("only in second:"));
        assert!(text.ends_with("❌ 3 difference(s)"));

        let clean = render_diff_human(&DiffReport::default(), false);
        assert!(clean.ends_with("✅ Files are consistent"));
    }
}
