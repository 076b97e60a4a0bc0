//! Core, format-agnostic types for l10nkit.
//! Parsers decode into these; writers serialize these.

use std::{
    collections::HashMap,
    fmt::Display,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

/// A single translation record.
///
/// Two entries are equal when their keys and values match; `comment` and `source` are
/// annotations and do not take part in equality.
#[derive(Debug, Clone, Eq, Deserialize, Serialize)]
pub struct Entry {
    /// Unique key within a resource. Nested formats use the flattened, dot-joined path
    /// (e.g. `home.title`).
    pub key: String,

    /// The translated text. `None` and `Some("")` both count as empty for comparisons,
    /// but handlers keep the distinction on round-trips where the format can express it.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub value: Option<String>,

    /// Free-form annotation. Subtitle handlers keep the raw timing line here.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub comment: Option<String>,

    /// Original-language text for bilingual formats (XLIFF, PO).
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub source: Option<String>,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: Option<String>) -> Self {
        Entry {
            key: key.into(),
            value,
            comment: None,
            source: None,
        }
    }

    /// Shorthand for an entry with a present value.
    pub fn text_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        Entry::new(key, Some(value.into()))
    }

    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    pub fn with_source(mut self, source: Option<String>) -> Self {
        self.source = source;
        self
    }

    /// The value, or `""` when absent.
    pub fn text(&self) -> &str {
        self.value.as_deref().unwrap_or_default()
    }

    /// True when the value is absent or whitespace-only.
    pub fn is_empty(&self) -> bool {
        self.value.as_deref().is_none_or(|v| v.trim().is_empty())
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.value == other.value
    }
}

impl Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Entry {{ key: {}, value: {} }}",
            self.key,
            self.value.as_deref().unwrap_or("<absent>")
        )
    }
}

/// One parsed localization document.
///
/// Built once by a format handler (or by a service synthesizing output) and not mutated
/// afterwards; services that change entries build a new `Resource` via [`Resource::with_entries`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Resource {
    /// Path the resource was read from or will be written to.
    pub path: PathBuf,

    /// Lowercase culture code (e.g. `en`, `tr-tr`), if one could be detected.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub culture: Option<String>,

    /// Registry id of the format that produced this resource.
    pub format_id: String,

    /// Entries in document order. Duplicate keys are kept as found.
    #[serde(default)]
    pub entries: Vec<Entry>,
}

impl Resource {
    pub fn new(
        path: impl Into<PathBuf>,
        culture: Option<String>,
        format_id: impl Into<String>,
        entries: Vec<Entry>,
    ) -> Self {
        Resource {
            path: path.into(),
            culture,
            format_id: format_id.into(),
            entries,
        }
    }

    /// An entry-less resource, used for empty or missing source files.
    pub fn empty(path: impl Into<PathBuf>, culture: Option<String>, format_id: &str) -> Self {
        Resource::new(path, culture, format_id, Vec::new())
    }

    /// A copy of this resource's identity holding a different set of entries.
    pub fn with_entries(&self, entries: Vec<Entry>) -> Self {
        Resource {
            path: self.path.clone(),
            culture: self.culture.clone(),
            format_id: self.format_id.clone(),
            entries,
        }
    }

    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = path.as_ref().to_path_buf();
        self
    }

    pub fn with_culture(mut self, culture: Option<String>) -> Self {
        self.culture = culture;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Key → entry index. Later duplicates win.
    pub fn key_map(&self) -> HashMap<&str, &Entry> {
        self.entries.iter().map(|e| (e.key.as_str(), e)).collect()
    }

    /// Looks up an entry by key with the same last-write-wins rule as [`Resource::key_map`].
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().rev().find(|e| e.key == key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    /// Keys in document order, duplicates included.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    /// Number of times each key occurs, in order of first appearance.
    pub fn key_counts(&self) -> Vec<(&str, usize)> {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        let mut slot: HashMap<&str, usize> = HashMap::new();
        for entry in &self.entries {
            match slot.get(entry.key.as_str()) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    slot.insert(&entry.key, counts.len());
                    counts.push((&entry.key, 1));
                }
            }
        }
        counts
    }

    /// File name component of `path`, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}
