//! Shared output helpers for the report commands.

use std::path::{Path, PathBuf};

use crossterm::style::Stylize;
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

/// Output switches shared by scan, diff and check.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ReportArgs {
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Exit with a non-zero status when the report has issues
    #[arg(long)]
    pub ci: bool,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Good,
    Warn,
    Bad,
    Muted,
}

/// Colors are used only when stdout is a terminal and `NO_COLOR` is unset.
pub fn color_enabled() -> bool {
    atty::is(atty::Stream::Stdout) && std::env::var_os("NO_COLOR").is_none()
}

pub fn paint(text: &str, tone: Tone, color: bool) -> String {
    if !color {
        return text.to_string();
    }
    match tone {
        Tone::Good => text.green().to_string(),
        Tone::Warn => text.yellow().to_string(),
        Tone::Bad => text.red().bold().to_string(),
        Tone::Muted => text.dark_grey().to_string(),
    }
}

/// Pads `text` to `width` terminal columns.
pub fn pad(text: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(text);
    let mut padded = text.to_string();
    padded.extend(std::iter::repeat_n(' ', width.saturating_sub(used)));
    padded
}

/// Widest entry in terminal columns.
pub fn column_width<'a>(items: impl IntoIterator<Item = &'a str>) -> usize {
    items
        .into_iter()
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0)
}

/// Appends `label: a, b, c` when `keys` is non-empty.
pub fn push_key_list(lines: &mut Vec<String>, indent: &str, label: &str, keys: &[String]) {
    if !keys.is_empty() {
        lines.push(format!("{}{}: {}", indent, label, keys.join(", ")));
    }
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("Failed to serialize report JSON: {}", e))
}

pub fn print_or_write(output: Option<&Path>, content: &str) -> Result<(), String> {
    if let Some(path) = output {
        crate::validation::validate_output_path(path)?;
        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
        println!("Report written: {}", path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

/// Turns an issue count into the CI-mode failure.
pub fn ci_result(ci: bool, issues: usize) -> Result<(), String> {
    if ci && issues > 0 {
        Err(format!("{} issue(s) found", issues))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_uses_display_width() {
        assert_eq!(pad("tr", 4), "tr  ");
        assert_eq!(pad("日本", 5), "日本 ");
        assert_eq!(pad("toolong", 3), "toolong");
        assert_eq!(column_width(["en", "zh-hant", "日本語"]), 7);
    }

    #[test]
    fn test_paint_without_color_is_plain() {
        assert_eq!(paint("ok", Tone::Good, false), "ok");
        assert_eq!(paint("3 missing", Tone::Bad, false), "3 missing");
    }

    #[test]
    fn test_ci_result() {
        assert!(ci_result(false, 3).is_ok());
        assert!(ci_result(true, 0).is_ok());
        assert_eq!(ci_result(true, 2).unwrap_err(), "2 issue(s) found");
    }
}
