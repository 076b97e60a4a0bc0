//! Support for WebVTT (`.vtt`) subtitles.
//!
//! Cues are blank-line separated blocks. A line before the timing line is the cue
//! identifier and becomes the key; cues without one are keyed by their running position.
//! `NOTE`, `STYLE` and `REGION` blocks are skipped.

use std::{io::Write, path::Path};

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    error::Error,
    formats::srt::{normalize_newlines, preserved_timing, synthetic_timing},
    traits::FormatHandler,
    types::{Entry, Resource},
};

lazy_static! {
    static ref VTT_TIMING_REGEX: Regex = Regex::new(
        r"^(?:\d{2,}:)?\d{2}:\d{2}\.\d{3}[ \t]+-->[ \t]+(?:\d{2,}:)?\d{2}:\d{2}\.\d{3}"
    )
    .unwrap();
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VttFormat;

fn is_metadata_block(first_line: &str) -> bool {
    ["WEBVTT", "NOTE", "STYLE", "REGION"].iter().any(|kw| {
        first_line
            .strip_prefix(kw)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with([' ', '\t']))
    })
}

impl FormatHandler for VttFormat {
    fn format_id(&self) -> &'static str {
        "vtt"
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &["vtt"]
    }

    fn parse(&self, content: &str, path: Option<&Path>) -> Result<Resource, Error> {
        let culture = path.and_then(|p| self.detect_culture(p));
        let text = normalize_newlines(content);
        let text = text.trim_start_matches('\u{feff}');
        let mut entries = Vec::new();

        for block in text.split("\n\n") {
            let lines: Vec<&str> = block.lines().filter(|l| !l.trim().is_empty()).collect();
            let Some(first) = lines.first() else {
                continue;
            };
            if is_metadata_block(first.trim()) {
                continue;
            }
            let Some(timing_at) = lines
                .iter()
                .position(|l| VTT_TIMING_REGEX.is_match(l.trim()))
            else {
                continue;
            };
            let key = match timing_at {
                0 => (entries.len() + 1).to_string(),
                1 => lines[0].trim().to_string(),
                _ => continue,
            };
            let body = lines[timing_at + 1..]
                .iter()
                .map(|l| l.trim_end())
                .collect::<Vec<_>>()
                .join("\n");
            entries.push(
                Entry::text_entry(key, body.trim())
                    .with_comment(Some(lines[timing_at].trim().to_string())),
            );
        }

        Ok(Resource::new(
            path.unwrap_or(Path::new("")),
            culture,
            self.format_id(),
            entries,
        ))
    }

    fn write(&self, resource: &Resource, writer: &mut dyn Write) -> Result<(), Error> {
        writeln!(writer, "WEBVTT")?;
        for (i, entry) in resource.entries.iter().enumerate() {
            let timing = match preserved_timing(entry) {
                Some(t) => t.to_string(),
                None => synthetic_timing(i, '.'),
            };
            writeln!(writer)?;
            writeln!(writer, "{}", entry.key)?;
            writeln!(writer, "{}", timing)?;
            writeln!(writer, "{}", entry.text())?;
        }
        Ok(())
    }
}
