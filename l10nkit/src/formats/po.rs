//! Support for GNU gettext PO catalogs.
//!
//! The `msgid` is both the key and the entry's `source`; `msgstr` is the value. The
//! catalog header (the entry with an empty `msgid`) is metadata and never becomes an entry.
//! For plural entries only `msgstr[0]` is kept.

use std::{io::Write, path::Path};

use crate::{
    error::Error,
    traits::FormatHandler,
    types::{Entry, Resource},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct PoFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Context,
    Id,
    IdPlural,
    Str,
    OtherPluralStr,
}

#[derive(Debug, Default)]
struct PendingMessage {
    msgid: Option<String>,
    msgstr: Option<String>,
    comments: Vec<String>,
    field: Option<Field>,
}

impl PendingMessage {
    fn is_started(&self) -> bool {
        self.msgid.is_some() || self.msgstr.is_some()
    }

    fn append(&mut self, text: &str) {
        let target = match self.field {
            Some(Field::Id) => self.msgid.get_or_insert_with(String::new),
            Some(Field::Str) => self.msgstr.get_or_insert_with(String::new),
            _ => return,
        };
        target.push_str(text);
    }

    /// Moves the finished message into `entries`, leaving `self` ready for the next one.
    fn flush(&mut self, entries: &mut Vec<Entry>) {
        let message = std::mem::take(self);
        let Some(msgid) = message.msgid else {
            return;
        };
        if msgid.is_empty() {
            // header
            return;
        }
        let comment = if message.comments.is_empty() {
            None
        } else {
            Some(message.comments.join("\n"))
        };
        entries.push(
            Entry::new(msgid.clone(), Some(message.msgstr.unwrap_or_default()))
                .with_source(Some(msgid))
                .with_comment(comment),
        );
    }
}

impl FormatHandler for PoFormat {
    fn format_id(&self) -> &'static str {
        "po"
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &["po", "pot"]
    }

    fn parse(&self, content: &str, path: Option<&Path>) -> Result<Resource, Error> {
        let culture = path.and_then(|p| self.detect_culture(p));
        let mut entries = Vec::new();
        let mut pending = PendingMessage::default();

        for raw in content.lines() {
            let line = raw.trim();

            if line.is_empty() {
                pending.flush(&mut entries);
                continue;
            }

            if let Some(comment) = line.strip_prefix('#') {
                // A comment after a complete message starts the next one.
                if pending.msgstr.is_some() {
                    pending.flush(&mut entries);
                }
                // Only extracted (`#.`) and translator (`# `) comments are kept.
                if let Some(text) = comment.strip_prefix('.').or_else(|| comment.strip_prefix(' ')) {
                    let text = text.trim();
                    if !text.is_empty() {
                        pending.comments.push(text.to_string());
                    }
                }
                continue;
            }

            if line.starts_with("msgctxt") {
                if pending.is_started() {
                    pending.flush(&mut entries);
                }
                pending.field = Some(Field::Context);
            } else if line.starts_with("msgid_plural") {
                pending.field = Some(Field::IdPlural);
            } else if let Some(rest) = line.strip_prefix("msgid") {
                if pending.msgstr.is_some() {
                    pending.flush(&mut entries);
                }
                pending.msgid = Some(unquote(rest));
                pending.field = Some(Field::Id);
            } else if let Some(rest) = line.strip_prefix("msgstr[") {
                let (index, value) = rest.split_once(']').unwrap_or((rest, ""));
                if index.trim() == "0" {
                    pending.msgstr = Some(unquote(value));
                    pending.field = Some(Field::Str);
                } else {
                    pending.field = Some(Field::OtherPluralStr);
                }
            } else if let Some(rest) = line.strip_prefix("msgstr") {
                pending.msgstr = Some(unquote(rest));
                pending.field = Some(Field::Str);
            } else if line.starts_with('"') {
                pending.append(&unquote(line));
            } else {
                return Err(Error::DataMismatch(format!(
                    "unexpected line in PO file: {}",
                    line
                )));
            }
        }
        pending.flush(&mut entries);

        Ok(Resource::new(
            path.unwrap_or(Path::new("")),
            culture,
            self.format_id(),
            entries,
        ))
    }

    fn write(&self, resource: &Resource, writer: &mut dyn Write) -> Result<(), Error> {
        writeln!(writer, "msgid \"\"")?;
        writeln!(writer, "msgstr \"\"")?;
        if let Some(culture) = &resource.culture {
            writeln!(writer, "\"Language: {}\\n\"", escape(culture))?;
        }
        writeln!(writer, "\"MIME-Version: 1.0\\n\"")?;
        writeln!(writer, "\"Content-Type: text/plain; charset=UTF-8\\n\"")?;
        writeln!(writer, "\"Content-Transfer-Encoding: 8bit\\n\"")?;

        for entry in &resource.entries {
            writeln!(writer)?;
            if let Some(comment) = &entry.comment {
                for line in comment.lines() {
                    writeln!(writer, "#. {}", line)?;
                }
            }
            writeln!(writer, "msgid \"{}\"", escape(&entry.key))?;
            writeln!(writer, "msgstr \"{}\"", escape(entry.text()))?;
        }
        Ok(())
    }
}

/// Strips the surrounding quotes and decodes C-style escapes in one pass.
fn unquote(s: &str) -> String {
    let s = s.trim();
    let s = s.strip_prefix('"').unwrap_or(s);
    let s = s.strip_suffix('"').unwrap_or(s);

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const SAMPLE: &str = indoc! {r#"
        # Translators file
        msgid ""
        msgstr ""
        "Language: fr\n"
        "Content-Type: text/plain; charset=UTF-8\n"

        #. Greeting on the home page
        #: src/home.rs:10
        msgid "Hello"
        msgstr "Bonjour"

        msgctxt "menu"
        msgid "File"
        msgstr "Fichier"

        msgid ""
        "Long "
        "text"
        msgstr ""
        "Texte "
        "long"

        msgid "Untranslated"
        msgstr ""

        msgid "One file"
        msgid_plural "%d files"
        msgstr[0] "Un fichier"
        msgstr[1] "%d fichiers"
    "#};

    #[test]
    fn test_parse_po() {
        let res = PoFormat.parse(SAMPLE, Some(Path::new("fr.po"))).unwrap();
        assert_eq!(res.culture.as_deref(), Some("fr"));
        let keys: Vec<_> = res.keys().collect();
        assert_eq!(
            keys,
            vec!["Hello", "File", "Long text", "Untranslated", "One file"]
        );

        let hello = res.get("Hello").unwrap();
        assert_eq!(hello.text(), "Bonjour");
        assert_eq!(hello.source.as_deref(), Some("Hello"));
        assert_eq!(hello.comment.as_deref(), Some("Greeting on the home page"));

        assert_eq!(res.get("Long text").unwrap().text(), "Texte long");
        assert!(res.get("Untranslated").unwrap().is_empty());
        assert_eq!(res.get("One file").unwrap().text(), "Un fichier");
    }

    #[test]
    fn test_messages_without_blank_separators() {
        let content = "msgid \"a\"\nmsgstr \"1\"\nmsgid \"b\"\nmsgstr \"2\"\n";
        let res = PoFormat.parse(content, None).unwrap();
        assert_eq!(res.len(), 2);
        assert_eq!(res.get("b").unwrap().text(), "2");
    }

    #[test]
    fn test_escapes() {
        assert_eq!(unquote(r#""a\nb\t\"c\"""#), "a\nb\t\"c\"");
        assert_eq!(unquote(r#""line\\nend""#), "line\\nend");
        assert_eq!(escape("a\nb \"q\" \\"), r#"a\nb \"q\" \\"#);
    }

    #[test]
    fn test_write_po() {
        let res = Resource::new(
            "tr.po",
            Some("tr".to_string()),
            "po",
            vec![
                Entry::text_entry("Hello", "Merhaba").with_comment(Some("greeting".to_string())),
                Entry::text_entry("Two\nlines", "İki\nsatır"),
                Entry::new("Empty", None),
            ],
        );
        let out = PoFormat.write_to_string(&res).unwrap();
        assert!(out.starts_with("msgid \"\"\nmsgstr \"\"\n\"Language: tr\\n\"\n"));
        assert!(out.contains("#. greeting\nmsgid \"Hello\"\nmsgstr \"Merhaba\"\n"));
        assert!(out.contains("msgid \"Two\\nlines\"\nmsgstr \"İki\\nsatır\"\n"));

        let back = PoFormat.parse(&out, None).unwrap();
        assert_eq!(back.len(), 3);
        assert_eq!(back.get("Two\nlines").unwrap().text(), "İki\nsatır");
        assert_eq!(back.get("Empty").unwrap().text(), "");
    }

    #[test]
    fn test_unexpected_line_is_malformed() {
        assert!(PoFormat.parse("msgid \"a\"\ngarbage\n", None).is_err());
    }
}
