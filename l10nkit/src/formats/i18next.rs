//! Support for i18next JSON resources.
//!
//! The grammar is the same nested JSON as [`super::json`]; only file matching and culture
//! detection differ. This handler must be registered before the generic JSON handler.

use std::{io::Write, path::Path};

use crate::{
    culture,
    error::Error,
    formats::json::{parse_json_entries, write_json_entries},
    traits::{FormatHandler, has_extension},
    types::Resource,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct I18nextFormat;

impl FormatHandler for I18nextFormat {
    fn format_id(&self) -> &'static str {
        "i18next"
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &["i18n.json"]
    }

    fn can_handle(&self, path: &Path) -> bool {
        if has_extension(path, self.supported_extensions()) {
            return true;
        }
        if !has_extension(path, &["json"]) {
            return false;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        name.contains("i18next") || name.contains("translation.json")
    }

    fn detect_culture(&self, path: &Path) -> Option<String> {
        culture::detect_i18next_culture(path)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_handle_heuristics() {
        let h = I18nextFormat;
        assert!(h.can_handle(Path::new("common.tr.i18n.json")));
        assert!(h.can_handle(Path::new("locales/en/translation.json")));
        assert!(h.can_handle(Path::new("app.i18next.json")));
        assert!(!h.can_handle(Path::new("i18next-demo/locales/en.json")));
        assert!(!h.can_handle(Path::new("locales/en.json")));
        assert!(!h.can_handle(Path::new("translation.yaml")));
    }

    #[test]
    fn test_culture_detection() {
        let res = I18nextFormat
            .parse(r#"{"a": "b"}"#, Some(Path::new("common.tr.i18n.json")))
            .unwrap();
        assert_eq!(res.culture.as_deref(), Some("tr"));
        assert_eq!(res.format_id, "i18next");

        let res = I18nextFormat
            .parse("{}", Some(Path::new("public/locales/de/translation.json")))
            .unwrap();
        assert_eq!(res.culture.as_deref(), Some("de"));
    }
}
