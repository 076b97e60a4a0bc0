//! Support for nested JSON translation files.
//!
//! Objects flatten to dot-joined keys, arrays to `key[i]`, `null` to an absent value and
//! non-string scalars to their JSON text. Writing rebuilds nested objects from the keys.

use std::{io::Write, path::Path};

use serde_json::Value;

use crate::{
    error::Error,
    formats::tree::{flatten_json, unflatten_json},
    traits::FormatHandler,
    types::{Entry, Resource},
};

/// Plain nested JSON (`en.json`, `messages.fr.json`).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl FormatHandler for JsonFormat {
    fn format_id(&self) -> &'static str {
        "json"
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn parse(&self, content: &str, path: Option<&Path>) -> Result<Resource, Error> {
        let culture = path.and_then(|p| self.detect_culture(p));
        let entries = parse_json_entries(content)?;
        Ok(Resource::new(
            path.unwrap_or(Path::new("")),
            culture,
            self.format_id(),
            entries,
        ))
    }

    fn write(&self, resource: &Resource, writer: &mut dyn Write) -> Result<(), Error> {
        write_json_entries(&resource.entries, writer)
    }
}

pub(crate) fn parse_json_entries(content: &str) -> Result<Vec<Entry>, Error> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let root: Value = serde_json::from_str(content)?;
    let mut entries = Vec::new();
    flatten_json(&root, "", &mut entries);
    Ok(entries)
}

pub(crate) fn write_json_entries(entries: &[Entry], writer: &mut dyn Write) -> Result<(), Error> {
    let tree = unflatten_json(entries);
    serde_json::to_writer_pretty(&mut *writer, &tree)?;
    writer.write_all(b"\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_json() {
        let json = r#"{"home": {"title": "Home", "items": ["a", "b"]}, "empty": null, "n": 2}"#;
        let res = JsonFormat.parse(json, Some(Path::new("locales/en.json"))).unwrap();
        assert_eq!(res.culture.as_deref(), Some("en"));
        assert_eq!(res.format_id, "json");
        let keys: Vec<_> = res.keys().collect();
        assert_eq!(
            keys,
            vec!["home.title", "home.items[0]", "home.items[1]", "empty", "n"]
        );
        assert_eq!(res.get("empty").unwrap().value, None);
        assert_eq!(res.get("n").unwrap().text(), "2");
    }

    #[test]
    fn test_empty_input_yields_no_entries() {
        let res = JsonFormat.parse("  \n", None).unwrap();
        assert!(res.is_empty());
    }

    #[test]
    fn test_malformed_json_fails() {
        let err = JsonFormat.parse("{ \"a\": ", None).unwrap_err();
        assert!(err.is_malformed_content());
    }

    #[test]
    fn test_write_nested_json() {
        let res = Resource::new(
            "en.json",
            Some("en".to_string()),
            "json",
            vec![
                Entry::text_entry("home.title", "Home"),
                Entry::text_entry("home.body", "Body"),
                Entry::new("missing", None),
            ],
        );
        let out = JsonFormat.write_to_string(&res).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"home": {"title": "Home", "body": "Body"}, "missing": null})
        );
        assert!(out.find("title").unwrap() < out.find("body").unwrap());
    }

    #[test]
    fn test_round_trip_preserves_pairs() {
        let json = r#"{"a": {"b": "1", "c": ""}, "d": "x {name}"}"#;
        let res = JsonFormat.parse(json, None).unwrap();
        let out = JsonFormat.write_to_string(&res).unwrap();
        let back = JsonFormat.parse(&out, None).unwrap();
        assert_eq!(res.entries, back.entries);
    }
}
