//! Support for XLIFF bilingual files.
//!
//! Parsing tries three shapes in order and keeps the first that yields units:
//! XLIFF 1.2 (`trans-unit`), XLIFF 2.0 (`unit`/`segment`), then elements of either name
//! outside any namespace. The unit `id` is the key, `<target>` the value (falling back to
//! `<source>` for untranslated units) and the first note the comment.
//!
//! Writing always produces XLIFF 1.2.

use std::{io::Write, path::Path};

use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, Event},
};

use crate::{
    error::Error,
    formats::xml::{self, XmlElement, write_indent, write_text_element},
    traits::FormatHandler,
    types::{Entry, Resource},
};

pub const XLIFF_12_NAMESPACE: &str = "urn:oasis:names:tc:xliff:document:1.2";
pub const XLIFF_20_NAMESPACE: &str = "urn:oasis:names:tc:xliff:document:2.0";

#[derive(Debug, Clone)]
pub struct XliffFormat {
    source_language: String,
}

impl Default for XliffFormat {
    fn default() -> Self {
        XliffFormat {
            source_language: "en".to_string(),
        }
    }
}

impl XliffFormat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `source-language` written on the `<file>` element.
    pub fn with_source_language(mut self, language: impl Into<String>) -> Self {
        self.source_language = language.into();
        self
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }
}

/// Reads one unit in 1.2 shape: `source`, `target` and `note` are direct children.
fn entry_from_trans_unit(unit: &XmlElement) -> Option<Entry> {
    let id = unit.attr("id").or_else(|| unit.attr("resname"))?;
    let source = unit.child("source").map(|s| s.inner_text());
    let target = unit.child("target").map(|t| t.inner_text());
    let note = unit.child("note").map(|n| n.inner_text());
    Some(make_entry(id, source, target, note))
}

/// Reads one unit in 2.0 shape: text lives in `segment`s and notes under `notes`.
fn entry_from_unit(unit: &XmlElement) -> Option<Entry> {
    let id = unit.attr("id")?;
    let segments: Vec<&XmlElement> = unit.elements().filter(|e| e.name == "segment").collect();
    let (source, target) = if segments.is_empty() {
        (
            unit.child("source").map(|s| s.inner_text()),
            unit.child("target").map(|t| t.inner_text()),
        )
    } else {
        let join = |name: &str| -> Option<String> {
            let parts: Vec<String> = segments
                .iter()
                .filter_map(|s| s.child(name).map(|e| e.inner_text()))
                .collect();
            if parts.is_empty() { None } else { Some(parts.concat()) }
        };
        (join("source"), join("target"))
    };
    let note = unit
        .child("notes")
        .and_then(|notes| notes.child("note"))
        .or_else(|| unit.child("note"))
        .map(|n| n.inner_text());
    Some(make_entry(id, source, target, note))
}

fn make_entry(
    id: &str,
    source: Option<String>,
    target: Option<String>,
    note: Option<String>,
) -> Entry {
    let value = target.or_else(|| source.clone());
    Entry::new(id, value)
        .with_source(source)
        .with_comment(note.filter(|n| !n.is_empty()))
}

fn collect_units<'a>(
    root: &'a XmlElement,
    name: &str,
    namespace: Option<&str>,
) -> Vec<&'a XmlElement> {
    root.descendants()
        .into_iter()
        .filter(|e| e.name == name && e.in_namespace(namespace))
        .collect()
}

fn parse_units(root: &XmlElement) -> Vec<Entry> {
    let v12: Vec<Entry> = collect_units(root, "trans-unit", Some(XLIFF_12_NAMESPACE))
        .into_iter()
        .filter_map(entry_from_trans_unit)
        .collect();
    if !v12.is_empty() {
        return v12;
    }

    let v20: Vec<Entry> = collect_units(root, "unit", Some(XLIFF_20_NAMESPACE))
        .into_iter()
        .filter_map(entry_from_unit)
        .collect();
    if !v20.is_empty() {
        return v20;
    }

    let mut bare: Vec<Entry> = collect_units(root, "trans-unit", None)
        .into_iter()
        .filter_map(entry_from_trans_unit)
        .collect();
    if bare.is_empty() {
        bare = collect_units(root, "unit", None)
            .into_iter()
            .filter_map(entry_from_unit)
            .collect();
    }
    bare
}

/// `target-language` on a 1.2 `<file>`, or `trgLang` on a 2.0 root.
fn declared_culture(root: &XmlElement) -> Option<String> {
    root.attr("trgLang")
        .or_else(|| {
            root.descendants()
                .into_iter()
                .find(|e| e.name == "file")
                .and_then(|file| file.attr("target-language"))
        })
        .map(|c| c.trim().to_ascii_lowercase())
        .filter(|c| !c.is_empty())
}

impl FormatHandler for XliffFormat {
    fn format_id(&self) -> &'static str {
        "xliff"
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &["xlf", "xliff"]
    }

    fn parse(&self, content: &str, path: Option<&Path>) -> Result<Resource, Error> {
        let mut culture = path.and_then(|p| self.detect_culture(p));
        let mut entries = Vec::new();

        if let Some(root) = xml::parse_document(content)? {
            entries = parse_units(&root);
            if culture.is_none() {
                culture = declared_culture(&root);
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
        let mut xml_writer = Writer::new(writer);
        xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        write_indent(&mut xml_writer, 0)?;

        let mut xliff = BytesStart::new("xliff");
        xliff.push_attribute(("version", "1.2"));
        xliff.push_attribute(("xmlns", XLIFF_12_NAMESPACE));
        xml_writer.write_event(Event::Start(xliff))?;

        let original = resource
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "messages".to_string());
        let mut file = BytesStart::new("file");
        file.push_attribute(("source-language", self.source_language.as_str()));
        if let Some(culture) = &resource.culture {
            file.push_attribute(("target-language", culture.as_str()));
        }
        file.push_attribute(("datatype", "plaintext"));
        file.push_attribute(("original", original.as_str()));
        write_indent(&mut xml_writer, 1)?;
        xml_writer.write_event(Event::Start(file))?;
        write_indent(&mut xml_writer, 2)?;
        xml_writer.write_event(Event::Start(BytesStart::new("body")))?;

        for entry in &resource.entries {
            let mut unit = BytesStart::new("trans-unit");
            unit.push_attribute(("id", entry.key.as_str()));
            write_indent(&mut xml_writer, 3)?;
            xml_writer.write_event(Event::Start(unit))?;

            let source = entry.source.as_deref().unwrap_or_else(|| entry.text());
            write_indent(&mut xml_writer, 4)?;
            write_text_element(&mut xml_writer, "source", &[], source)?;
            write_indent(&mut xml_writer, 4)?;
            write_text_element(&mut xml_writer, "target", &[], entry.text())?;
            if let Some(note) = entry.comment.as_deref().filter(|n| !n.is_empty()) {
                write_indent(&mut xml_writer, 4)?;
                write_text_element(&mut xml_writer, "note", &[], note)?;
            }

            write_indent(&mut xml_writer, 3)?;
            xml_writer.write_event(Event::End(BytesEnd::new("trans-unit")))?;
        }

        write_indent(&mut xml_writer, 2)?;
        xml_writer.write_event(Event::End(BytesEnd::new("body")))?;
        write_indent(&mut xml_writer, 1)?;
        xml_writer.write_event(Event::End(BytesEnd::new("file")))?;
        write_indent(&mut xml_writer, 0)?;
        xml_writer.write_event(Event::End(BytesEnd::new("xliff")))?;
        write_indent(&mut xml_writer, 0)?;
        Ok(())
    }
}
