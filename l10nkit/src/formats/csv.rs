//! Support for CSV localization tables.
//!
//! The first row is a header and the first column holds keys. A file may carry one value
//! column or one column per culture (`key,en,tr,comment`); a parse extracts exactly one
//! value column: the one whose header matches the detected culture, otherwise column 1.
//! A column headed `comment` fills the entry comment.
//!
//! Writing emits `key,<culture>` (or `key,value` when the culture is unknown), plus a
//! `comment` column when any entry has a comment.

use std::{io::Write, path::Path};

use crate::{
    culture::normalize_culture,
    error::Error,
    traits::FormatHandler,
    types::{Entry, Resource},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvFormat;

const COMMENT_HEADER: &str = "comment";

fn value_column(headers: &csv::StringRecord, culture: Option<&str>) -> usize {
    culture
        .and_then(|culture| {
            headers
                .iter()
                .enumerate()
                .skip(1)
                .find(|(_, h)| normalize_culture(h) == culture)
                .map(|(i, _)| i)
        })
        .unwrap_or(1)
}

fn comment_column(headers: &csv::StringRecord, value_col: usize) -> Option<usize> {
    headers
        .iter()
        .enumerate()
        .skip(1)
        .find(|(i, h)| *i != value_col && h.trim().eq_ignore_ascii_case(COMMENT_HEADER))
        .map(|(i, _)| i)
}

impl FormatHandler for CsvFormat {
    fn format_id(&self) -> &'static str {
        "csv"
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &["csv"]
    }

    fn parse(&self, content: &str, path: Option<&Path>) -> Result<Resource, Error> {
        let culture = path.and_then(|p| self.detect_culture(p));
        let mut entries = Vec::new();

        if !content.trim().is_empty() {
            let mut rdr = csv::ReaderBuilder::new()
                .has_headers(true)
                .flexible(true)
                .from_reader(content.as_bytes());
            let headers = rdr.headers()?.clone();
            let value_col = value_column(&headers, culture.as_deref());
            let comment_col = comment_column(&headers, value_col);

            for record in rdr.records() {
                let record = record?;
                let Some(key) = record.get(0).filter(|k| !k.trim().is_empty()) else {
                    continue;
                };
                let value = record.get(value_col).map(str::to_string);
                let comment = comment_col
                    .and_then(|i| record.get(i))
                    .filter(|c| !c.is_empty())
                    .map(str::to_string);
                entries.push(Entry::new(key, value).with_comment(comment));
            }
        }

        Ok(Resource::new(
            path.unwrap_or(Path::new("")),
            culture,
            self.format_id(),
            entries,
        ))
    }

    fn write(&self, resource: &Resource, writer: &mut dyn Write) -> Result<(), Error> {
        let with_comments = resource.entries.iter().any(|e| e.comment.is_some());
        let mut wtr = csv::WriterBuilder::new().from_writer(writer);

        let value_header = resource.culture.as_deref().unwrap_or("value");
        if with_comments {
            wtr.write_record(["key", value_header, COMMENT_HEADER])?;
        } else {
            wtr.write_record(["key", value_header])?;
        }

        for entry in &resource.entries {
            if with_comments {
                wtr.write_record([
                    entry.key.as_str(),
                    entry.text(),
                    entry.comment.as_deref().unwrap_or_default(),
                ])?;
            } else {
                wtr.write_record([entry.key.as_str(), entry.text()])?;
            }
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_csv() {
        let content = "key,value\nhello,Hello\nbye,Goodbye\n";
        let res = CsvFormat.parse(content, None).unwrap();
        assert_eq!(res.len(), 2);
        assert_eq!(res.get("hello").unwrap().text(), "Hello");
        assert_eq!(res.get("bye").unwrap().text(), "Goodbye");
    }

    #[test]
    fn test_quoted_fields() {
        let content = "key,value\ngreeting,\"Hello, \"\"friend\"\"\"\nmulti,\"a\nb\"\n";
        let res = CsvFormat.parse(content, None).unwrap();
        assert_eq!(res.get("greeting").unwrap().text(), "Hello, \"friend\"");
        assert_eq!(res.get("multi").unwrap().text(), "a\nb");
    }

    #[test]
    fn test_culture_selects_column() {
        let content = "key,en,tr,Comment\nhello,Hello,Merhaba,greeting\nshort,Hi\n";
        let res = CsvFormat
            .parse(content, Some(Path::new("strings.tr.csv")))
            .unwrap();
        assert_eq!(res.culture.as_deref(), Some("tr"));
        let hello = res.get("hello").unwrap();
        assert_eq!(hello.text(), "Merhaba");
        assert_eq!(hello.comment.as_deref(), Some("greeting"));
        assert_eq!(res.get("short").unwrap().value, None);

        let res = CsvFormat.parse(content, None).unwrap();
        assert_eq!(res.get("hello").unwrap().text(), "Hello");
    }

    #[test]
    fn test_csv_row_with_empty_value() {
        let res = CsvFormat.parse("key,value\nempty,\n", None).unwrap();
        let entry = res.get("empty").unwrap();
        assert_eq!(entry.value.as_deref(), Some(""));
        assert!(entry.is_empty());
    }

    #[test]
    fn test_write_csv() {
        let res = Resource::new(
            "strings.de.csv",
            Some("de".to_string()),
            "csv",
            vec![
                Entry::text_entry("a", "x, y").with_comment(Some("note".to_string())),
                Entry::text_entry("b", "plain"),
            ],
        );
        let out = CsvFormat.write_to_string(&res).unwrap();
        assert_eq!(out, "key,de,comment\na,\"x, y\",note\nb,plain,\n");

        let back = CsvFormat.parse(&out, Some(Path::new("strings.de.csv"))).unwrap();
        assert_eq!(back.entries, res.entries);
    }
}
