//! Support for nested YAML translation files, flattened the same way as JSON.

use std::{io::Write, path::Path};

use serde_yaml::Value;

use crate::{
    error::Error,
    formats::tree::{flatten_yaml, unflatten_yaml},
    traits::FormatHandler,
    types::Resource,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFormat;

impl FormatHandler for YamlFormat {
    fn format_id(&self) -> &'static str {
        "yaml"
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &["yaml", "yml"]
    }

    fn parse(&self, content: &str, path: Option<&Path>) -> Result<Resource, Error> {
        let culture = path.and_then(|p| self.detect_culture(p));
        let mut entries = Vec::new();
        if !content.trim().is_empty() {
            let root: Value = serde_yaml::from_str(content)?;
            flatten_yaml(&root, "", &mut entries);
        }
        Ok(Resource::new(
            path.unwrap_or(Path::new("")),
            culture,
            self.format_id(),
            entries,
        ))
    }

    fn write(&self, resource: &Resource, writer: &mut dyn Write) -> Result<(), Error> {
        let tree = unflatten_yaml(&resource.entries);
        serde_yaml::to_writer(&mut *writer, &tree)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Entry;
    use indoc::indoc;

    #[test]
    fn test_parse_nested_yaml() {
        let yaml = indoc! {"
            home:
              title: Home
              tags:
                - one
                - two
            count: 3
            nothing:
        "};
        let res = YamlFormat
            .parse(yaml, Some(Path::new("messages.en-US.yml")))
            .unwrap();
        assert_eq!(res.culture.as_deref(), Some("en-us"));
        let pairs: Vec<_> = res
            .entries
            .iter()
            .map(|e| (e.key.as_str(), e.value.as_deref()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("home.title", Some("Home")),
                ("home.tags[0]", Some("one")),
                ("home.tags[1]", Some("two")),
                ("count", Some("3")),
                ("nothing", None),
            ]
        );
    }

    #[test]
    fn test_write_keeps_numeric_looking_strings() {
        let res = Resource::new(
            "en.yaml",
            None,
            "yaml",
            vec![
                Entry::text_entry("version", "1.0"),
                Entry::text_entry("flag", "true"),
                Entry::text_entry("menu.file", "File"),
            ],
        );
        let out = YamlFormat.write_to_string(&res).unwrap();
        let back = YamlFormat.parse(&out, None).unwrap();
        assert_eq!(back.entries, res.entries);
    }

    #[test]
    fn test_malformed_yaml_fails() {
        assert!(YamlFormat.parse("a: [unclosed", None).is_err());
    }
}
