//! A minimal, namespace-aware element tree over `quick-xml`, shared by the RESX and XLIFF
//! handlers, plus small writer helpers.

use std::io::Write;

use quick_xml::{
    NsReader, Writer,
    events::{BytesEnd, BytesStart, BytesText, Event},
    name::ResolveResult,
};

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct XmlElement {
    /// Local name, prefix stripped.
    pub name: String,
    /// Resolved namespace URI.
    pub namespace: Option<String>,
    /// Attributes by local name; `xmlns` declarations are dropped.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Concatenated direct text (and CDATA) children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(t) => Some(t.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// All text below this element, including text nested in inline child elements.
    pub fn inner_text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.name == name)
    }

    /// All elements below this one, depth-first in document order.
    pub fn descendants(&self) -> Vec<&XmlElement> {
        let mut out = Vec::new();
        collect_descendants(self, &mut out);
        out
    }

    pub fn in_namespace(&self, namespace: Option<&str>) -> bool {
        self.namespace.as_deref() == namespace
    }
}

fn collect_text(element: &XmlElement, out: &mut String) {
    for node in &element.children {
        match node {
            XmlNode::Text(t) => out.push_str(t),
            XmlNode::Element(e) => collect_text(e, out),
        }
    }
}

fn collect_descendants<'a>(element: &'a XmlElement, out: &mut Vec<&'a XmlElement>) {
    for child in element.elements() {
        out.push(child);
        collect_descendants(child, out);
    }
}

/// Parses a whole document and returns its root element, or `None` for a document
/// without elements (e.g. empty input).
pub(crate) fn parse_document(content: &str) -> Result<Option<XmlElement>, Error> {
    let mut reader = NsReader::from_str(content);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_resolved_event()? {
            (ns, Event::Start(e)) => {
                let element = element_from(&ns, &e)?;
                stack.push(element);
            }
            (ns, Event::Empty(e)) => {
                let element = element_from(&ns, &e)?;
                attach(&mut stack, &mut root, element);
            }
            (_, Event::End(_)) => {
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element);
                }
            }
            (_, Event::Text(t)) => {
                if let Some(parent) = stack.last_mut() {
                    let text = t.unescape().map_err(Error::XmlParse)?.into_owned();
                    parent.children.push(XmlNode::Text(text));
                }
            }
            (_, Event::CData(c)) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                    parent.children.push(XmlNode::Text(text));
                }
            }
            (_, Event::Eof) => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::InvalidResource(format!(
            "unclosed element <{}>",
            open.name
        )));
    }
    Ok(root)
}

fn element_from(ns: &ResolveResult, e: &BytesStart) -> Result<XmlElement, Error> {
    let namespace = match ns {
        ResolveResult::Bound(n) => Some(String::from_utf8_lossy(n.as_ref()).into_owned()),
        _ => None,
    };
    let mut attributes = Vec::new();
    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(|e| Error::DataMismatch(e.to_string()))?;
        if attr.key.as_ref().starts_with(b"xmlns") {
            continue;
        }
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }
    Ok(XmlElement {
        name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
        namespace,
        attributes,
        children: Vec::new(),
    })
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

pub(crate) fn write_indent<W: Write>(writer: &mut Writer<W>, depth: usize) -> Result<(), Error> {
    let indent = format!("\n{}", "  ".repeat(depth));
    writer.write_event(Event::Text(BytesText::new(&indent)))?;
    Ok(())
}

/// Writes `<name attrs...>text</name>`.
pub(crate) fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    attributes: &[(&str, &str)],
    text: &str,
) -> Result<(), Error> {
    let mut start = BytesStart::new(name);
    for attr in attributes {
        start.push_attribute(*attr);
    }
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
