//! The format registry: an ordered list of handlers and lookup by id or by file path.
//!
//! Lookup by path returns the *first* registered handler whose
//! [`FormatHandler::can_handle`] accepts the path, so registration order matters:
//! the i18next handler must come before the generic JSON handler.

use std::{collections::BTreeSet, fmt, path::Path};

use crate::{
    error::Error,
    formats::FormatType,
    traits::FormatHandler,
    types::Resource,
};

/// An ordered collection of format handlers, built once and passed to the services
/// that need to read or write files.
pub struct FormatRegistry {
    handlers: Vec<Box<dyn FormatHandler>>,
}

impl FormatRegistry {
    /// A registry with no handlers.
    pub fn empty() -> Self {
        FormatRegistry {
            handlers: Vec::new(),
        }
    }

    /// Appends a handler. Handlers registered earlier win ties in [`Self::get_for_file`].
    pub fn register(&mut self, handler: Box<dyn FormatHandler>) {
        self.handlers.push(handler);
    }

    /// Builder-style [`Self::register`].
    pub fn with_handler(mut self, handler: Box<dyn FormatHandler>) -> Self {
        self.register(handler);
        self
    }

    pub fn get_by_id(&self, id: &str) -> Option<&dyn FormatHandler> {
        self.handlers
            .iter()
            .find(|h| h.format_id().eq_ignore_ascii_case(id))
            .map(|h| h.as_ref())
    }

    /// Resolves a format name or alias (`yml`, `xlf`, ...) to a registered handler.
    pub fn get_by_name(&self, name: &str) -> Result<&dyn FormatHandler, Error> {
        if let Some(handler) = self.get_by_id(name) {
            return Ok(handler);
        }
        let format: FormatType = name.parse()?;
        self.get_by_id(format.id())
            .ok_or_else(|| Error::UnsupportedFormat(name.to_string()))
    }

    pub fn get_for_file(&self, path: &Path) -> Option<&dyn FormatHandler> {
        self.handlers
            .iter()
            .find(|h| h.can_handle(path))
            .map(|h| h.as_ref())
    }

    pub fn is_supported(&self, path: &Path) -> bool {
        self.get_for_file(path).is_some()
    }

    pub fn supported_extensions(&self) -> BTreeSet<&'static str> {
        self.handlers
            .iter()
            .flat_map(|h| h.supported_extensions().iter().copied())
            .collect()
    }

    /// Handlers in registration order.
    pub fn handlers(&self) -> impl Iterator<Item = &dyn FormatHandler> {
        self.handlers.iter().map(|h| h.as_ref())
    }

    /// Reads and parses `path` with the handler selected for it.
    pub fn read_file(&self, path: &Path) -> Result<Resource, Error> {
        let handler = self
            .get_for_file(path)
            .ok_or_else(|| Error::UnsupportedFormat(path.display().to_string()))?;
        handler.read_from(path)
    }
}

/// The standard handler set: i18next, json, yaml, resx, po, xliff, srt, vtt, csv, ftl, vb.
impl Default for FormatRegistry {
    fn default() -> Self {
        let mut registry = FormatRegistry::empty();
        for format in FormatType::ALL {
            registry.register(format.handler());
        }
        registry
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.handlers.iter().map(|h| h.format_id()))
            .finish()
    }
}
