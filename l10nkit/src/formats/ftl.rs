//! Support for Project Fluent (`.ftl`) files, simplified to messages, attributes and
//! comments.
//!
//! `id = value` starts a message. An indented `.attr = value` line becomes a separate entry
//! keyed `id.attr`. Other indented lines continue the message value (newline-joined). A
//! `#` comment attaches to the next message. Blank lines inside a message are kept when an
//! indented continuation follows them; otherwise they end the message.
//! Selectors and variants are kept as raw text.
//!
//! When writing, a dotted key whose prefix is itself a key is treated as an attribute of
//! that message and nested under it. A legitimately dotted top-level id that collides
//! with another id is misclassified by this rule.

use std::{collections::HashSet, io::Write, path::Path};

use crate::{
    error::Error,
    traits::FormatHandler,
    types::{Entry, Resource},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct FtlFormat;

#[derive(Debug, Default)]
struct Message {
    id: String,
    lines: Vec<String>,
    comment: Option<String>,
    attributes: Vec<Entry>,
}

impl Message {
    /// The message entry followed by its attribute entries.
    fn flush_into(self, entries: &mut Vec<Entry>) {
        let value = self.lines.join("\n");
        entries.push(Entry::text_entry(self.id, value).with_comment(self.comment));
        entries.extend(self.attributes);
    }
}

/// Message ids also accept `.` so that flattened keys from other formats survive a
/// round-trip; attribute names do not.
fn is_identifier(s: &str, allow_dots: bool) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '-')
        && chars.all(|c| {
            c.is_ascii_alphanumeric() || c == '-' || c == '_' || (allow_dots && c == '.')
        })
}

/// Splits `name = value`, returning `None` when the left side is not an identifier.
fn split_assignment(line: &str, allow_dots: bool) -> Option<(&str, &str)> {
    let (name, value) = line.split_once('=')?;
    let name = name.trim();
    is_identifier(name, allow_dots).then(|| (name, value.trim()))
}

impl FormatHandler for FtlFormat {
    fn format_id(&self) -> &'static str {
        "ftl"
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &["ftl"]
    }

    fn parse(&self, content: &str, path: Option<&Path>) -> Result<Resource, Error> {
        let culture = path.and_then(|p| self.detect_culture(p));
        let mut entries = Vec::new();
        let mut current: Option<Message> = None;
        let mut pending_comment: Option<String> = None;
        let mut blank_lines = 0usize;

        for raw in content.lines() {
            let line = raw.trim_end();

            if line.trim().is_empty() {
                if current.is_some() {
                    blank_lines += 1;
                }
                continue;
            }

            if line.starts_with('#') {
                if let Some(message) = current.take() {
                    message.flush_into(&mut entries);
                }
                blank_lines = 0;
                let text = line.trim_start_matches('#').trim();
                pending_comment = Some(match pending_comment.take() {
                    Some(previous) if !text.is_empty() => format!("{}\n{}", previous, text),
                    Some(previous) => previous,
                    None => text.to_string(),
                });
                continue;
            }

            let indented = line.starts_with([' ', '\t']);
            if indented {
                let Some(message) = current.as_mut() else {
                    continue;
                };
                let trimmed = line.trim();
                if let Some((attr, value)) = trimmed
                    .strip_prefix('.')
                    .and_then(|rest| split_assignment(rest, false))
                {
                    let key = format!("{}.{}", message.id, attr);
                    message.attributes.push(Entry::text_entry(key, value));
                } else {
                    message
                        .lines
                        .extend(std::iter::repeat_n(String::new(), blank_lines));
                    message.lines.push(trimmed.to_string());
                }
                blank_lines = 0;
                continue;
            }

            if let Some((id, value)) = split_assignment(line, true) {
                if let Some(message) = current.take() {
                    message.flush_into(&mut entries);
                }
                blank_lines = 0;
                let mut message = Message {
                    id: id.to_string(),
                    comment: pending_comment.take().filter(|c| !c.is_empty()),
                    ..Default::default()
                };
                if !value.is_empty() {
                    message.lines.push(value.to_string());
                }
                current = Some(message);
            }
        }
        if let Some(message) = current.take() {
            message.flush_into(&mut entries);
        }

        Ok(Resource::new(
            path.unwrap_or(Path::new("")),
            culture,
            self.format_id(),
            entries,
        ))
    }

    fn write(&self, resource: &Resource, writer: &mut dyn Write) -> Result<(), Error> {
        let keys: HashSet<&str> = resource.entries.iter().map(|e| e.key.as_str()).collect();
        let parent_of = |key: &str| -> Option<String> {
            let (parent, _) = key.rsplit_once('.')?;
            keys.contains(parent).then(|| parent.to_string())
        };

        let mut first = true;
        for entry in &resource.entries {
            if parent_of(&entry.key).is_some() {
                continue;
            }
            if !first {
                writeln!(writer)?;
            }
            first = false;

            if let Some(comment) = &entry.comment {
                for line in comment.lines() {
                    writeln!(writer, "# {}", line)?;
                }
            }
            write_message_value(writer, &entry.key, entry.text(), "")?;

            for attribute in resource
                .entries
                .iter()
                .filter(|a| parent_of(&a.key).as_deref() == Some(entry.key.as_str()))
            {
                let name = &attribute.key[entry.key.len() + 1..];
                write_message_value(writer, &format!(".{}", name), attribute.text(), "    ")?;
            }
        }
        Ok(())
    }
}

fn write_message_value(
    writer: &mut dyn Write,
    name: &str,
    value: &str,
    indent: &str,
) -> Result<(), Error> {
    if value.contains('\n') {
        writeln!(writer, "{}{} =", indent, name)?;
        for line in value.lines() {
            if line.trim().is_empty() {
                writeln!(writer)?;
            } else {
                writeln!(writer, "{}    {}", indent, line)?;
            }
        }
    } else {
        writeln!(writer, "{}{} = {}", indent, name, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_parse_attribute() {
        let content = "submit-button = Submit\n    .title = Click to submit\n";
        let res = FtlFormat.parse(content, None).unwrap();
        let pairs: Vec<_> = res
            .entries
            .iter()
            .map(|e| (e.key.as_str(), e.text()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("submit-button", "Submit"),
                ("submit-button.title", "Click to submit"),
            ]
        );
    }

    #[test]
    fn test_write_nests_attribute() {
        let content = "submit-button = Submit\n    .title = Click to submit\n";
        let res = FtlFormat.parse(content, None).unwrap();
        let out = FtlFormat.write_to_string(&res).unwrap();
        assert_eq!(out, content);
        assert_eq!(out.matches(" = ").count(), 2);
        assert!(!out.contains("submit-button.title"));
    }

    #[test]
    fn test_parse_comments_and_multiline() {
        let content = indoc! {"
            # Shown on the home page
            welcome = Welcome, { $name }!

            about =
                First line
                Second line
            -brand = Acme
        "};
        let res = FtlFormat
            .parse(content, Some(Path::new("main.fr.ftl")))
            .unwrap();
        assert_eq!(res.culture.as_deref(), Some("fr"));

        let welcome = res.get("welcome").unwrap();
        assert_eq!(welcome.text(), "Welcome, { $name }!");
        assert_eq!(welcome.comment.as_deref(), Some("Shown on the home page"));

        assert_eq!(res.get("about").unwrap().text(), "First line\nSecond line");
        assert_eq!(res.get("-brand").unwrap().text(), "Acme");
    }

    #[test]
    fn test_multiline_round_trip() {
        let res = Resource::new(
            "x.ftl",
            None,
            "ftl",
            vec![
                Entry::text_entry("about", "First line\nSecond line")
                    .with_comment(Some("note".to_string())),
                Entry::text_entry("about.label", "About"),
                Entry::text_entry("empty", ""),
            ],
        );
        let out = FtlFormat.write_to_string(&res).unwrap();
        assert_eq!(
            out,
            "# note\nabout =\n    First line\n    Second line\n    .label = About\n\nempty = \n"
        );
        let back = FtlFormat.parse(&out, None).unwrap();
        assert_eq!(back.entries, res.entries);
    }

    #[test]
    fn test_blank_line_inside_value_survives_round_trip() {
        let res = Resource::new(
            "x.ftl",
            None,
            "ftl",
            vec![
                Entry::text_entry("welcome", "line one\n\nline three"),
                Entry::text_entry("bye", "Bye"),
            ],
        );
        let out = FtlFormat.write_to_string(&res).unwrap();
        assert_eq!(out, "welcome =\n    line one\n\n    line three\n\nbye = Bye\n");
        let back = FtlFormat.parse(&out, None).unwrap();
        let pairs: Vec<_> = back
            .entries
            .iter()
            .map(|e| (e.key.as_str(), e.text()))
            .collect();
        assert_eq!(
            pairs,
            vec![("welcome", "line one\n\nline three"), ("bye", "Bye")]
        );
    }

    #[test]
    fn test_blank_line_before_next_message_ends_value() {
        let content = "a =\n    first\n\n\nb = B\n    .hint = H\n";
        let res = FtlFormat.parse(content, None).unwrap();
        assert_eq!(res.get("a").unwrap().text(), "first");
        assert_eq!(res.get("b.hint").unwrap().text(), "H");
    }

    #[test]
    fn test_dotted_key_without_parent_is_top_level() {
        let res = Resource::new(
            "x.ftl",
            None,
            "ftl",
            vec![Entry::text_entry("menu.file", "File")],
        );
        let out = FtlFormat.write_to_string(&res).unwrap();
        assert_eq!(out, "menu.file = File\n");
    }
}
