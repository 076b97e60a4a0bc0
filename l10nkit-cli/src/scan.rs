use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use l10nkit::{FormatRegistry, ScanOptions, ScanReport, Scanner};

use crate::config::ProjectConfig;
use crate::render::{
    ReportArgs, Tone, ci_result, color_enabled, column_width, pad, paint, print_or_write,
    push_key_list, to_json,
};
use crate::validation::{validate_input_path, validate_language_code, validate_language_codes};

#[derive(clap::Args, Debug, Clone)]
pub struct ScanCommand {
    /// Directory (or single file) to scan
    pub path: PathBuf,

    /// Base culture every target is compared with
    #[arg(short, long)]
    pub base: Option<String>,

    /// Target cultures to compare (default: every other culture found)
    #[arg(short, long = "target", value_delimiter = ',')]
    pub targets: Vec<String>,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Skip files whose name contains this text (repeatable)
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Skip placeholder consistency checks
    #[arg(long)]
    pub no_placeholders: bool,

    /// Regex used to extract placeholders
    #[arg(long)]
    pub placeholder_pattern: Option<String>,

    #[command(flatten)]
    pub report: ReportArgs,
}

pub fn build_scan_options(cmd: &ScanCommand, config: &ProjectConfig) -> ScanOptions {
    ScanOptions::new()
        .with_base_culture(config.base_culture(cmd.base.as_deref()))
        .with_target_cultures(cmd.targets.iter().cloned())
        .with_recursive(config.recursive(cmd.recursive))
        .with_ignore(config.ignore(&cmd.ignore))
        .with_check_placeholders(!cmd.no_placeholders)
        .with_placeholder_pattern(config.placeholder_pattern(cmd.placeholder_pattern.as_deref()))
}

pub fn render_scan_human(report: &ScanReport, color: bool) -> String {
    let mut lines = Vec::new();
    lines.push("=== Scan ===".to_string());
    lines.push(format!(
        "Base culture: {} ({} keys, {} files scanned)",
        report.base_culture, report.base_key_count, report.files_scanned
    ));

    if report.base_key_count == 0 && report.results.is_empty() {
        lines.push(paint(
            &format!("No files found for base culture '{}'", report.base_culture),
            Tone::Warn,
            color,
        ));
        return lines.join("\n");
    }

    let width = column_width(report.results.iter().map(|r| r.culture.as_str()));
    for result in &report.results {
        let status = if result.has_issues() {
            paint(&format!("{} issue(s)", result.total_issues()), Tone::Bad, color)
        } else {
            paint("ok", Tone::Good, color)
        };
        lines.push(format!(
            "\n{}  missing={} orphan={} empty={} placeholders={}  {}",
            pad(&result.culture, width),
            result.missing_keys.len(),
            result.orphan_keys.len(),
            result.empty_values.len(),
            result.placeholder_mismatches.len(),
            status
        ));
        push_key_list(&mut lines, "  ", "missing keys", &result.missing_keys);
        push_key_list(&mut lines, "  ", "orphan keys", &result.orphan_keys);
        push_key_list(&mut lines, "  ", "empty values", &result.empty_values);
        for mismatch in &result.placeholder_mismatches {
            lines.push(format!(
                "  placeholder mismatch: {} [{}] vs [{}]",
                mismatch.key,
                mismatch.base_placeholders.join(", "),
                mismatch.target_placeholders.join(", ")
            ));
        }
    }

    let summary = format!("\nTotal issues: {}", report.total_issues());
    let tone = if report.has_issues() { Tone::Bad } else { Tone::Good };
    lines.push(paint(&summary, tone, color));
    lines.join("\n")
}

pub fn run_scan_command(cmd: ScanCommand, config: &ProjectConfig) -> Result<(), String> {
    validate_input_path(&cmd.path)?;
    if let Some(base) = &cmd.base {
        validate_language_code(base)?;
    }
    validate_language_codes(&cmd.targets)?;

    let options = build_scan_options(&cmd, config);
    let registry = FormatRegistry::default();

    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {wide_msg}")
            .map_err(|e| format!("Failed to set progress style: {}", e))?,
    );
    progress_bar.set_message(format!("Scanning {}...", cmd.path.display()));

    let report = match Scanner::new(&registry).scan(&cmd.path, &options) {
        Ok(report) => report,
        Err(e) => {
            progress_bar.finish_with_message("❌ Scan failed");
            return Err(e.to_string());
        }
    };
    progress_bar.finish_and_clear();

    let rendered = if cmd.report.json {
        to_json(&report)?
    } else {
        render_scan_human(&report, color_enabled() && cmd.report.output.is_none())
    };
    print_or_write(cmd.report.output.as_deref(), &rendered)?;
    ci_result(cmd.report.ci, report.total_issues())
}
