//! Best-effort, read-only support for Visual Basic resource wrappers (`Resources.vb`).
//!
//! Two shapes are recognized: designer property getters calling
//! `ResourceManager.GetString("Key", ...)` (key only, no value) and
//! `Const Name As String = "literal"` declarations (key and value, `""` unescaped to `"`).

use std::{collections::HashSet, io::Write, path::Path};

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    error::Error,
    traits::FormatHandler,
    types::{Entry, Resource},
};

lazy_static! {
    static ref GET_STRING_REGEX: Regex =
        Regex::new(r#"ResourceManager\.GetString\("([^"]+)""#).unwrap();
    static ref CONST_STRING_REGEX: Regex =
        Regex::new(r#"(?i)Const\s+(\w+)\s+As\s+String\s*=\s*"((?:[^"]|"")*)""#).unwrap();
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VbFormat;

impl FormatHandler for VbFormat {
    fn format_id(&self) -> &'static str {
        "vb"
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &["vb"]
    }

    fn is_writable(&self) -> bool {
        false
    }

    fn parse(&self, content: &str, path: Option<&Path>) -> Result<Resource, Error> {
        let culture = path.and_then(|p| self.detect_culture(p));
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for caps in GET_STRING_REGEX.captures_iter(content) {
            let key = caps[1].to_string();
            if seen.insert(key.clone()) {
                entries.push(Entry::new(key, None));
            }
        }
        for caps in CONST_STRING_REGEX.captures_iter(content) {
            let key = caps[1].to_string();
            if seen.insert(key.clone()) {
                entries.push(Entry::text_entry(key, caps[2].replace("\"\"", "\"")));
            }
        }

        Ok(Resource::new(
            path.unwrap_or(Path::new("")),
            culture,
            self.format_id(),
            entries,
        ))
    }

    fn write(&self, _resource: &Resource, _writer: &mut dyn Write) -> Result<(), Error> {
        Err(Error::ReadOnlyFormat(self.format_id().to_string()))
    }
}
