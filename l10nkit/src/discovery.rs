//! Discovery of localization files below a directory.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::debug;

use crate::{error::Error, registry::FormatRegistry, types::Resource};

/// Which files to pick up while walking a directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoverOptions {
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Files whose name contains any of these substrings are skipped.
    pub ignore: Vec<String>,
}

impl DiscoverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_ignore<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_ignored(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
            return false;
        };
        self.ignore
            .iter()
            .filter(|p| !p.is_empty())
            .any(|p| name.contains(p.as_str()))
    }
}

/// Paths of every supported, non-ignored file under `root`, in walk order with each
/// directory's entries sorted by name.
///
/// A `root` that is itself a file is returned as-is when supported.
pub fn discover_paths(
    root: &Path,
    registry: &FormatRegistry,
    options: &DiscoverOptions,
) -> Result<Vec<PathBuf>, Error> {
    if root.is_file() {
        let supported = registry.is_supported(root) && !options.is_ignored(root);
        return Ok(if supported { vec![root.to_path_buf()] } else { Vec::new() });
    }
    if !root.is_dir() {
        return Err(Error::NotFound(root.to_path_buf()));
    }

    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b));
    if !options.recursive {
        builder.max_depth(Some(1));
    }

    let mut paths = Vec::new();
    for dent in builder.build() {
        let dent = match dent {
            Ok(d) => d,
            Err(e) => {
                debug!("skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !dent.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let path = dent.path();
        if options.is_ignored(path) || !registry.is_supported(path) {
            continue;
        }
        paths.push(path.to_path_buf());
    }
    Ok(paths)
}

/// Lazily parses every discovered file. Files that fail to read or parse are skipped.
pub fn discover_files<'a>(
    root: &Path,
    registry: &'a FormatRegistry,
    options: &DiscoverOptions,
) -> Result<impl Iterator<Item = Resource> + use<'a>, Error> {
    let paths = discover_paths(root, registry, options)?;
    Ok(paths
        .into_iter()
        .filter_map(move |path| match registry.read_file(&path) {
            Ok(resource) => Some(resource),
            Err(e) => {
                debug!("skipping {}: {}", path.display(), e);
                None
            }
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("en.json"), r#"{"a": "A"}"#).unwrap();
        fs::write(dir.path().join("tr.json"), "{ not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a resource").unwrap();
        fs::write(dir.path().join("de.backup.json"), r#"{"a": "B"}"#).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("fr.yaml"), "a: C\n").unwrap();
        dir
    }

    #[test]
    fn test_discover_paths_flat() {
        let dir = fixture();
        let registry = FormatRegistry::default();
        let paths = discover_paths(dir.path(), &registry, &DiscoverOptions::new()).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["de.backup.json", "en.json", "tr.json"]);
    }

    #[test]
    fn test_discover_paths_recursive_with_ignore() {
        let dir = fixture();
        let registry = FormatRegistry::default();
        let options = DiscoverOptions::new()
            .with_recursive(true)
            .with_ignore(["backup"]);
        let paths = discover_paths(dir.path(), &registry, &options).unwrap();
        assert_eq!(paths.len(), 3);
        assert!(paths.iter().any(|p| p.ends_with("nested/fr.yaml")));
        assert!(!paths.iter().any(|p| p.ends_with("de.backup.json")));
    }

    #[test]
    fn test_discover_files_skips_unparsable() {
        let dir = fixture();
        let registry = FormatRegistry::default();
        let options = DiscoverOptions::new().with_ignore(["backup"]);
        let files: Vec<_> = discover_files(dir.path(), &registry, &options)
            .unwrap()
            .collect();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].culture.as_deref(), Some("en"));
    }

    #[test]
    fn test_missing_root() {
        let registry = FormatRegistry::default();
        let missing = Path::new("/definitely/not/here");
        let err = discover_paths(missing, &registry, &DiscoverOptions::new()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
