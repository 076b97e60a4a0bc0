//! Support for SubRip (`.srt`) subtitles.
//!
//! Each cue becomes one entry: the sequence number is the key, the cue text (trimmed,
//! lines joined with `\n`) is the value, and the raw timing line is kept in `comment` so
//! that writing the resource back reproduces the original timings.

use std::{io::Write, path::Path};

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    error::Error,
    traits::FormatHandler,
    types::{Entry, Resource},
};

lazy_static! {
    static ref SRT_CUE_REGEX: Regex = Regex::new(
        r"(?m)^(\d+)[ \t]*\n(\d{2}:\d{2}:\d{2},\d{3} --> \d{2}:\d{2}:\d{2},\d{3}[^\n]*)\n((?:.+\n?)*)"
    )
    .unwrap();
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SrtFormat;

/// Formats milliseconds as `HH:MM:SS<sep>mmm`.
pub(crate) fn format_clock(ms: u64, separator: char) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let millis = ms % 1000;
    format!(
        "{:02}:{:02}:{:02}{}{:03}",
        hours, minutes, seconds, separator, millis
    )
}

/// A one-second timing slot for the cue at `position`, used when an entry carries no
/// original timing.
pub(crate) fn synthetic_timing(position: usize, separator: char) -> String {
    let start = position as u64 * 1000;
    format!(
        "{} --> {}",
        format_clock(start, separator),
        format_clock(start + 1000, separator)
    )
}

/// The preserved timing line of an entry, if it has one.
pub(crate) fn preserved_timing(entry: &Entry) -> Option<&str> {
    entry
        .comment
        .as_deref()
        .map(str::trim)
        .filter(|c| c.contains("-->"))
}

/// Subtitle text is normalized to `\n` line endings before matching.
pub(crate) fn normalize_newlines(content: &str) -> String {
    let mut text = content.replace("\r\n", "\n").replace('\r', "\n");
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

impl FormatHandler for SrtFormat {
    fn format_id(&self) -> &'static str {
        "srt"
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &["srt"]
    }

    fn parse(&self, content: &str, path: Option<&Path>) -> Result<Resource, Error> {
        let culture = path.and_then(|p| self.detect_culture(p));
        let text = normalize_newlines(content);

        let entries = SRT_CUE_REGEX
            .captures_iter(&text)
            .map(|caps| {
                let body = caps[3]
                    .lines()
                    .map(str::trim_end)
                    .collect::<Vec<_>>()
                    .join("\n");
                Entry::text_entry(&caps[1], body.trim())
                    .with_comment(Some(caps[2].trim_end().to_string()))
            })
            .collect();

        Ok(Resource::new(
            path.unwrap_or(Path::new("")),
            culture,
            self.format_id(),
            entries,
        ))
    }

    fn write(&self, resource: &Resource, writer: &mut dyn Write) -> Result<(), Error> {
        for (i, entry) in resource.entries.iter().enumerate() {
            let index = match entry.key.trim().parse::<u64>() {
                Ok(n) => n.to_string(),
                Err(_) => (i + 1).to_string(),
            };
            let timing = match preserved_timing(entry) {
                Some(t) => t.to_string(),
                None => synthetic_timing(i, ','),
            };
            writeln!(writer, "{}", index)?;
            writeln!(writer, "{}", timing)?;
            writeln!(writer, "{}", entry.text())?;
            writeln!(writer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const SAMPLE: &str = indoc! {"
        1
        00:00:01,000 --> 00:00:04,000
        Hello there.

        2
        00:00:05,500 --> 00:00:08,250
        Two lines
        of text

    "};

    #[test]
    fn test_parse_srt() {
        let res = SrtFormat
            .parse(SAMPLE, Some(Path::new("movie.tr.srt")))
            .unwrap();
        assert_eq!(res.culture.as_deref(), Some("tr"));
        assert_eq!(res.len(), 2);

        let first = res.get("1").unwrap();
        assert_eq!(first.text(), "Hello there.");
        assert_eq!(
            first.comment.as_deref(),
            Some("00:00:01,000 --> 00:00:04,000")
        );
        assert_eq!(res.get("2").unwrap().text(), "Two lines\nof text");
    }

    #[test]
    fn test_parse_crlf() {
        let content = SAMPLE.replace('\n', "\r\n");
        let res = SrtFormat.parse(&content, None).unwrap();
        assert_eq!(res.len(), 2);
        assert_eq!(res.get("2").unwrap().text(), "Two lines\nof text");
    }

    #[test]
    fn test_write_preserves_timing() {
        let res = SrtFormat.parse(SAMPLE, None).unwrap();
        let out = SrtFormat.write_to_string(&res).unwrap();
        assert_eq!(out, SAMPLE.trim_end().to_string() + "\n\n");
    }

    #[test]
    fn test_write_synthesizes_missing_timings() {
        let res = Resource::new(
            "out.srt",
            None,
            "srt",
            (0..62)
                .map(|i| Entry::text_entry(format!("line{}", i), "text"))
                .collect(),
        );
        let out = SrtFormat.write_to_string(&res).unwrap();
        assert!(out.starts_with("1\n00:00:00,000 --> 00:00:01,000\ntext\n\n"));
        assert!(out.contains("62\n00:01:01,000 --> 00:01:02,000\n"));

        let back = SrtFormat.parse(&out, None).unwrap();
        assert_eq!(back.len(), 62);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(3_723_045, ','), "01:02:03,045");
        assert_eq!(format_clock(0, '.'), "00:00:00.000");
    }
}
