//! Generate: create (or top up) target-culture files from a base-culture file.

use std::{
    collections::HashSet,
    ffi::OsStr,
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::Serialize;
use tracing::debug;

use crate::{
    culture::normalize_culture,
    discovery::{DiscoverOptions, discover_files},
    error::Error,
    registry::FormatRegistry,
    traits::FormatHandler,
    types::{Entry, Resource},
};

/// How keys missing from a target file are filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FillMode {
    /// Empty values, ready for translators.
    #[default]
    Empty,
    /// The base culture's values.
    CopyBase,
}

impl fmt::Display for FillMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillMode::Empty => write!(f, "empty"),
            FillMode::CopyBase => write!(f, "copy-base"),
        }
    }
}

impl FromStr for FillMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "empty" => Ok(FillMode::Empty),
            "copy-base" | "copy" | "base" => Ok(FillMode::CopyBase),
            other => Err(Error::InvalidArgument(format!("unknown fill mode `{}`", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    pub target_cultures: Vec<String>,
    pub fill_mode: FillMode,
    /// Replace existing target files instead of merging into them.
    pub overwrite: bool,
    /// Culture of the base files; a single base file with a detectable culture overrides it.
    pub base_culture: String,
    pub recursive: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions {
            target_cultures: Vec::new(),
            fill_mode: FillMode::Empty,
            overwrite: false,
            base_culture: "en".to_string(),
            recursive: false,
        }
    }
}

impl GenerateOptions {
    pub fn new<I, S>(target_cultures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GenerateOptions {
            target_cultures: target_cultures.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_fill_mode(mut self, fill_mode: FillMode) -> Self {
        self.fill_mode = fill_mode;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_base_culture(mut self, culture: impl Into<String>) -> Self {
        self.base_culture = culture.into();
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateResult {
    pub culture: String,
    pub output_path: PathBuf,
    /// False when an existing file was merged into.
    pub created: bool,
    pub added_keys: usize,
    pub total_keys: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct Generator<'a> {
    registry: &'a FormatRegistry,
}

impl<'a> Generator<'a> {
    pub fn new(registry: &'a FormatRegistry) -> Self {
        Generator { registry }
    }

    /// Generates target-culture files for `base_path`, a base file or a directory of them.
    ///
    /// Outputs go next to each base file, or under `out_dir` when given. In directory mode
    /// unparsable files and files of other cultures are skipped.
    pub fn generate(
        &self,
        base_path: &Path,
        out_dir: Option<&Path>,
        options: &GenerateOptions,
    ) -> Result<Vec<GenerateResult>, Error> {
        if options.target_cultures.is_empty() {
            return Err(Error::InvalidArgument(
                "at least one target culture is required".to_string(),
            ));
        }

        if base_path.is_dir() {
            let base_culture = normalize_culture(&options.base_culture);
            let discover = DiscoverOptions::new().with_recursive(options.recursive);
            let mut results = Vec::new();
            for resource in discover_files(base_path, self.registry, &discover)? {
                if resource.culture.as_deref() != Some(base_culture.as_str()) {
                    continue;
                }
                let target_dir =
                    out_dir.map(|dir| mirrored_dir(&resource.path, base_path, &base_culture, dir));
                let generated =
                    self.generate_from(&resource, &base_culture, target_dir.as_deref(), options);
                match generated {
                    Ok(mut r) => results.append(&mut r),
                    Err(e) => debug!("skipping {}: {}", resource.path.display(), e),
                }
            }
            return Ok(results);
        }

        let resource = self.registry.read_file(base_path)?;
        let base_culture = resource
            .culture
            .clone()
            .unwrap_or_else(|| normalize_culture(&options.base_culture));
        self.generate_from(&resource, &base_culture, out_dir, options)
    }

    fn generate_from(
        &self,
        base: &Resource,
        base_culture: &str,
        out_dir: Option<&Path>,
        options: &GenerateOptions,
    ) -> Result<Vec<GenerateResult>, Error> {
        let handler = self
            .registry
            .get_by_id(&base.format_id)
            .or_else(|| self.registry.get_for_file(&base.path))
            .ok_or_else(|| Error::UnsupportedFormat(base.format_id.clone()))?;
        if !handler.is_writable() {
            return Err(Error::ReadOnlyFormat(handler.format_id().to_string()));
        }

        let mut results = Vec::new();
        for culture in &options.target_cultures {
            let culture = normalize_culture(culture);
            if culture == base_culture {
                continue;
            }
            let output = localized_output_path(&base.path, base_culture, &culture, out_dir);
            results.push(self.generate_one(handler, base, &culture, &output, options)?);
        }
        Ok(results)
    }

    fn generate_one(
        &self,
        handler: &dyn FormatHandler,
        base: &Resource,
        culture: &str,
        output: &Path,
        options: &GenerateOptions,
    ) -> Result<GenerateResult, Error> {
        let created = !output.exists();
        let mut entries = if options.overwrite {
            Vec::new()
        } else {
            handler.read_or_empty(output)?.entries
        };

        let mut present: HashSet<String> = entries.iter().map(|e| e.key.clone()).collect();
        let mut added_keys = 0;
        for entry in &base.entries {
            if !present.insert(entry.key.clone()) {
                continue;
            }
            let value = match options.fill_mode {
                FillMode::Empty => String::new(),
                FillMode::CopyBase => entry.text().to_string(),
            };
            entries.push(
                Entry::new(entry.key.clone(), Some(value))
                    .with_comment(entry.comment.clone())
                    .with_source(entry.source.clone()),
            );
            added_keys += 1;
        }

        let total_keys = entries.len();
        if created || added_keys > 0 || options.overwrite {
            let resource = Resource::new(
                output,
                Some(culture.to_string()),
                handler.format_id(),
                entries,
            );
            handler.write_to(&resource, output)?;
        }

        Ok(GenerateResult {
            culture: culture.to_string(),
            output_path: output.to_path_buf(),
            created,
            added_keys,
            total_keys,
        })
    }
}

/// Directory under `out_dir` that mirrors `file`'s location below `root`. A trailing
/// culture directory is dropped, since [`localized_output_path`] re-adds it.
pub(crate) fn mirrored_dir(file: &Path, root: &Path, culture: &str, out_dir: &Path) -> PathBuf {
    let parent = file.parent().unwrap_or(root);
    let mut relative = parent.strip_prefix(root).unwrap_or(parent).to_path_buf();
    if relative.file_name() == Some(OsStr::new(culture)) {
        relative.pop();
    }
    out_dir.join(relative)
}

/// Path of the `target` culture's counterpart of `base_file`.
///
/// - `messages.en.json` → `messages.tr.json`
/// - `en.json` → `tr.json`
/// - `en/translation.json` → `tr/translation.json`
/// - otherwise the culture is inserted before the extension: `messages.json` → `messages.tr.json`
pub fn localized_path(base_file: &Path, base_culture: &str, target_culture: &str) -> PathBuf {
    let Some(name) = base_file.file_name().and_then(|n| n.to_str()) else {
        return base_file.to_path_buf();
    };

    let mut segments: Vec<&str> = name.split('.').collect();
    let last = segments.len().saturating_sub(1);
    if let Some(idx) = segments[..last]
        .iter()
        .rposition(|s| s.eq_ignore_ascii_case(base_culture))
    {
        segments[idx] = target_culture;
        return base_file.with_file_name(segments.join("."));
    }

    let parent = base_file.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(parent) = parent {
        let is_culture_dir = parent
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.eq_ignore_ascii_case(base_culture));
        if is_culture_dir {
            return parent.with_file_name(target_culture).join(name);
        }
    }

    let lower = name.to_ascii_lowercase();
    let insert_at = if lower.ends_with(".i18n.json") {
        name.len() - ".i18n.json".len()
    } else {
        name.rfind('.').filter(|i| *i > 0).unwrap_or(name.len())
    };
    base_file.with_file_name(format!(
        "{}.{}{}",
        &name[..insert_at],
        target_culture,
        &name[insert_at..]
    ))
}

/// [`localized_path`], optionally re-rooted under `out_dir`. A culture directory
/// (`en/translation.json`) is kept as part of the relocated name.
pub fn localized_output_path(
    base_file: &Path,
    base_culture: &str,
    target_culture: &str,
    out_dir: Option<&Path>,
) -> PathBuf {
    let Some(out_dir) = out_dir else {
        return localized_path(base_file, base_culture, target_culture);
    };
    let Some(name) = base_file.file_name() else {
        return out_dir.to_path_buf();
    };
    let mut anchor = PathBuf::new();
    if let Some(dir) = base_file
        .parent()
        .and_then(|p| p.file_name())
        .filter(|d| d.to_str().is_some_and(|d| d.eq_ignore_ascii_case(base_culture)))
    {
        anchor.push(dir);
    }
    anchor.push(name);
    out_dir.join(localized_path(&anchor, base_culture, target_culture))
}
