//! Format conversion between any two registered formats.
//!
//! Conversion always goes through the unified [`Resource`] model: the source is parsed by
//! its handler and the resulting entries are serialized by the target handler. Keys,
//! values and comments survive as far as the target format can carry them.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::{
    discovery::{DiscoverOptions, discover_paths},
    error::Error,
    registry::FormatRegistry,
    traits::FormatHandler,
    types::Resource,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Target format id or alias. When absent, it is inferred from the destination path.
    pub target_format: Option<String>,
    /// Replace an existing destination file.
    pub overwrite: bool,
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target_format(mut self, format: impl Into<String>) -> Self {
        self.target_format = Some(format.into());
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertDirectoryOptions {
    pub target_format: String,
    pub recursive: bool,
    pub overwrite: bool,
    pub ignore: Vec<String>,
}

impl ConvertDirectoryOptions {
    pub fn new(target_format: impl Into<String>) -> Self {
        ConvertDirectoryOptions {
            target_format: target_format.into(),
            recursive: false,
            overwrite: false,
            ignore: Vec::new(),
        }
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
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
}

/// Outcome of one successful conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertResult {
    pub source_path: PathBuf,
    pub destination_path: PathBuf,
    pub source_format: String,
    pub target_format: String,
    pub entry_count: usize,
}

/// One row of a directory conversion; failures are kept per file.
#[derive(Debug)]
pub struct ConvertItem {
    pub source_path: PathBuf,
    pub outcome: Result<ConvertResult, Error>,
}

impl ConvertItem {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Converter<'a> {
    registry: &'a FormatRegistry,
}

impl<'a> Converter<'a> {
    pub fn new(registry: &'a FormatRegistry) -> Self {
        Converter { registry }
    }

    /// Converts `source` into `destination`.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] when `source` is not a file.
    /// - [`Error::UnsupportedFormat`] when no handler matches either side.
    /// - [`Error::ReadOnlyFormat`] when the target handler cannot write.
    /// - [`Error::OutputExists`] when `destination` exists and `overwrite` is off.
    /// - Any parse error of the source file.
    pub fn convert(
        &self,
        source: &Path,
        destination: &Path,
        options: &ConvertOptions,
    ) -> Result<ConvertResult, Error> {
        if !source.is_file() {
            return Err(Error::NotFound(source.to_path_buf()));
        }
        let source_handler = self.source_handler(source)?;
        let target_handler = match &options.target_format {
            Some(name) => self.registry.get_by_name(name)?,
            None => self.registry.get_for_file(destination).ok_or_else(|| {
                Error::UnsupportedFormat(format!(
                    "cannot infer target format from {}",
                    destination.display()
                ))
            })?,
        };
        convert_with(
            source_handler,
            target_handler,
            source,
            destination,
            options.overwrite,
        )
    }

    /// Converts every supported file under `source_dir` into `target_dir`, mirroring the
    /// relative layout and swapping the file extension.
    ///
    /// The target format is resolved up front, so an unknown or read-only target fails the
    /// whole call. Per-file failures are recorded in the returned items.
    pub fn convert_directory(
        &self,
        source_dir: &Path,
        target_dir: &Path,
        options: &ConvertDirectoryOptions,
    ) -> Result<Vec<ConvertItem>, Error> {
        if !source_dir.is_dir() {
            return Err(Error::NotFound(source_dir.to_path_buf()));
        }
        let target_handler = self.registry.get_by_name(&options.target_format)?;
        if !target_handler.is_writable() {
            return Err(Error::ReadOnlyFormat(target_handler.format_id().to_string()));
        }

        let discover = DiscoverOptions::new()
            .with_recursive(options.recursive)
            .with_ignore(options.ignore.iter().cloned());
        let paths = discover_paths(source_dir, self.registry, &discover)?;

        let items = paths
            .into_iter()
            .map(|path| {
                let outcome = self.source_handler(&path).and_then(|source_handler| {
                    let relative = path.strip_prefix(source_dir).unwrap_or(path.as_path());
                    let destination = target_dir.join(swap_extension(
                        relative,
                        source_handler,
                        target_handler,
                    ));
                    convert_with(
                        source_handler,
                        target_handler,
                        &path,
                        &destination,
                        options.overwrite,
                    )
                });
                if let Err(e) = &outcome {
                    debug!("failed to convert {}: {}", path.display(), e);
                }
                ConvertItem {
                    source_path: path,
                    outcome,
                }
            })
            .collect();
        Ok(items)
    }

    fn source_handler(&self, path: &Path) -> Result<&'a dyn FormatHandler, Error> {
        self.registry.get_for_file(path).ok_or_else(|| {
            Error::UnsupportedFormat(format!("no handler for {}", path.display()))
        })
    }
}

fn convert_with(
    source_handler: &dyn FormatHandler,
    target_handler: &dyn FormatHandler,
    source: &Path,
    destination: &Path,
    overwrite: bool,
) -> Result<ConvertResult, Error> {
    if !target_handler.is_writable() {
        return Err(Error::ReadOnlyFormat(target_handler.format_id().to_string()));
    }
    if destination.exists() && !overwrite {
        return Err(Error::OutputExists(destination.to_path_buf()));
    }

    let resource = source_handler.read_from(source)?;
    let culture = resource
        .culture
        .clone()
        .or_else(|| target_handler.detect_culture(destination));
    let output = Resource::new(
        destination,
        culture,
        target_handler.format_id(),
        resource.entries,
    );
    target_handler.write_to(&output, destination)?;

    Ok(ConvertResult {
        source_path: source.to_path_buf(),
        destination_path: destination.to_path_buf(),
        source_format: source_handler.format_id().to_string(),
        target_format: target_handler.format_id().to_string(),
        entry_count: output.len(),
    })
}

/// Replaces the source handler's extension on `path` with the target's primary extension.
///
/// The longest matching source extension is stripped (`a.i18n.json` loses `i18n.json`);
/// files picked up by a name heuristic lose only their last extension.
pub fn swap_extension(
    path: &Path,
    source: &dyn FormatHandler,
    target: &dyn FormatHandler,
) -> PathBuf {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return path.to_path_buf();
    };
    let lower = name.to_ascii_lowercase();
    let stem_len = source
        .supported_extensions()
        .iter()
        .filter(|ext| lower.ends_with(&format!(".{}", ext)))
        .map(|ext| name.len() - ext.len() - 1)
        .min()
        .or_else(|| name.rfind('.'))
        .unwrap_or(name.len());

    let target_ext = target.supported_extensions().first().copied().unwrap_or("txt");
    path.with_file_name(format!("{}.{}", &name[..stem_len], target_ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::{I18nextFormat, JsonFormat, XliffFormat, YamlFormat};
    use std::fs;

    #[test]
    fn test_swap_extension() {
        let json = JsonFormat;
        let yaml = YamlFormat;
        assert_eq!(
            swap_extension(Path::new("a/en.json"), &json, &yaml),
            PathBuf::from("a/en.yaml")
        );
        assert_eq!(
            swap_extension(
                Path::new("common.tr.i18n.json"),
                &I18nextFormat,
                &XliffFormat::new()
            ),
            PathBuf::from("common.tr.xlf")
        );
        assert_eq!(
            swap_extension(Path::new("tr/translation.json"), &I18nextFormat, &yaml),
            PathBuf::from("tr/translation.yaml")
        );
    }

    #[test]
    fn test_convert_json_to_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("en.json");
        let dst = dir.path().join("out").join("en.yaml");
        fs::write(&src, r#"{"home": {"title": "Home"}, "bye": "Bye"}"#).unwrap();

        let registry = FormatRegistry::default();
        let converter = Converter::new(&registry);
        let result = converter.convert(&src, &dst, &ConvertOptions::new()).unwrap();
        assert_eq!(result.source_format, "json");
        assert_eq!(result.target_format, "yaml");
        assert_eq!(result.entry_count, 2);

        let back = registry.read_file(&dst).unwrap();
        assert_eq!(back.get("home.title").unwrap().text(), "Home");
        assert_eq!(back.culture.as_deref(), Some("en"));

        let err = converter
            .convert(&src, &dst, &ConvertOptions::new())
            .unwrap_err();
        assert!(matches!(err, Error::OutputExists(_)));
        assert!(
            converter
                .convert(&src, &dst, &ConvertOptions::new().with_overwrite(true))
                .is_ok()
        );
    }

    #[test]
    fn test_convert_errors() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("en.json");
        fs::write(&src, r#"{"a": "A"}"#).unwrap();

        let registry = FormatRegistry::default();
        let converter = Converter::new(&registry);

        let err = converter
            .convert(
                &dir.path().join("nope.json"),
                &dir.path().join("x.yaml"),
                &ConvertOptions::new(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let err = converter
            .convert(&src, &dir.path().join("en.bin"), &ConvertOptions::new())
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));

        let err = converter
            .convert(&src, &dir.path().join("en.vb"), &ConvertOptions::new())
            .unwrap_err();
        assert!(matches!(err, Error::ReadOnlyFormat(_)));

        let options = ConvertOptions::new().with_target_format("bogus");
        let err = converter
            .convert(&src, &dir.path().join("en.txt"), &options)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownFormat(_)));
    }

    #[test]
    fn test_convert_directory_mirrors_layout() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("en.json"), r#"{"a": "A"}"#).unwrap();
        fs::write(src.join("nested").join("tr.yaml"), "a: B\n").unwrap();
        fs::write(src.join("de.json"), "{").unwrap();

        let registry = FormatRegistry::default();
        let out = dir.path().join("out");
        let items = Converter::new(&registry)
            .convert_directory(
                &src,
                &out,
                &ConvertDirectoryOptions::new("resx").with_recursive(true),
            )
            .unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items.iter().filter(|i| i.is_ok()).count(), 2);
        assert!(out.join("en.resx").is_file());
        assert!(out.join("nested").join("tr.resx").is_file());
        assert!(!out.join("de.resx").exists());
    }
}
