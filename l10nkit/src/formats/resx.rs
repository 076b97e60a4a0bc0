//! Support for .NET RESX resource files.
//!
//! Each `<data name="...">` element under `<root>` becomes one entry. RESX names use `_`
//! where flattened keys use `.`, so `Home_Title` reads as `Home.Title` and is written back
//! the same way. Non-string resources (`type` or `mimetype` attributes) are skipped.

use std::{io::Write, path::Path};

use indoc::indoc;
use quick_xml::{
    Writer,
    events::{BytesEnd, BytesStart, Event},
};

use crate::{
    error::Error,
    formats::xml::{self, write_indent, write_text_element},
    traits::FormatHandler,
    types::{Entry, Resource},
};

const RESX_PREAMBLE: &str = indoc! {r#"
    <?xml version="1.0" encoding="utf-8"?>
    <root>"#};

const RESX_HEADERS: [(&str, &str); 4] = [
    ("resmimetype", "text/microsoft-resx"),
    ("version", "2.0"),
    (
        "reader",
        "System.Resources.ResXResourceReader, System.Windows.Forms, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089",
    ),
    (
        "writer",
        "System.Resources.ResXResourceWriter, System.Windows.Forms, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089",
    ),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct ResxFormat;

fn key_from_name(name: &str) -> String {
    name.replace('_', ".")
}

fn name_from_key(key: &str) -> String {
    key.replace('.', "_")
}

impl FormatHandler for ResxFormat {
    fn format_id(&self) -> &'static str {
        "resx"
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &["resx"]
    }

    fn parse(&self, content: &str, path: Option<&Path>) -> Result<Resource, Error> {
        let culture = path.and_then(|p| self.detect_culture(p));
        let mut entries = Vec::new();

        if let Some(root) = xml::parse_document(content)? {
            for data in root.elements().filter(|e| e.name == "data") {
                let Some(name) = data.attr("name") else {
                    continue;
                };
                if data.has_attr("type") || data.has_attr("mimetype") {
                    continue;
                }
                let value = data.child("value").map(|v| v.text());
                let comment = data
                    .child("comment")
                    .map(|c| c.text())
                    .filter(|c| !c.is_empty());
                entries.push(Entry::new(key_from_name(name), value).with_comment(comment));
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
        writer.write_all(RESX_PREAMBLE.as_bytes())?;
        let mut xml_writer = Writer::new(writer);

        for (name, value) in RESX_HEADERS {
            write_indent(&mut xml_writer, 1)?;
            let mut header = BytesStart::new("resheader");
            header.push_attribute(("name", name));
            xml_writer.write_event(Event::Start(header))?;
            write_indent(&mut xml_writer, 2)?;
            write_text_element(&mut xml_writer, "value", &[], value)?;
            write_indent(&mut xml_writer, 1)?;
            xml_writer.write_event(Event::End(BytesEnd::new("resheader")))?;
        }

        for entry in &resource.entries {
            let name = name_from_key(&entry.key);
            write_indent(&mut xml_writer, 1)?;
            let mut data = BytesStart::new("data");
            data.push_attribute(("name", name.as_str()));
            data.push_attribute(("xml:space", "preserve"));
            xml_writer.write_event(Event::Start(data))?;
            write_indent(&mut xml_writer, 2)?;
            write_text_element(&mut xml_writer, "value", &[], entry.text())?;
            if let Some(comment) = entry.comment.as_deref().filter(|c| !c.is_empty()) {
                write_indent(&mut xml_writer, 2)?;
                write_text_element(&mut xml_writer, "comment", &[], comment)?;
            }
            write_indent(&mut xml_writer, 1)?;
            xml_writer.write_event(Event::End(BytesEnd::new("data")))?;
        }

        write_indent(&mut xml_writer, 0)?;
        xml_writer.write_event(Event::End(BytesEnd::new("root")))?;
        write_indent(&mut xml_writer, 0)?;
        Ok(())
    }
}
