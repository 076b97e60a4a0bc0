use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use l10nkit::FormatRegistry;
use rayon::prelude::*;

pub fn has_glob_meta(s: &str) -> bool {
    s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
}

/// Directory prefix before the first glob meta-character.
fn static_prefix_dir(pattern: &str) -> PathBuf {
    let end = pattern
        .find(['*', '?', '[', '{'])
        .unwrap_or(pattern.len());
    let prefix = Path::new(&pattern[..end]);
    if prefix.is_dir() {
        return prefix.to_path_buf();
    }
    match prefix.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn build_glob_set(patterns: &[&String]) -> Result<GlobSet, String> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern.trim_start_matches("./"))
            .literal_separator(true)
            .build()
            .map_err(|e| format!("Invalid glob pattern '{}': {}", pattern, e))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| format!("Failed to build glob set: {}", e))
}

/// Expands the command-line inputs into localization files.
///
/// Literal paths are kept as given so that missing files surface as errors later. Glob
/// patterns are matched with one .gitignore-aware walk per distinct root, run in
/// parallel, and only files a registered handler supports are kept.
pub fn expand_inputs(inputs: &[String], registry: &FormatRegistry) -> Result<Vec<PathBuf>, String> {
    let (patterns, literals): (Vec<&String>, Vec<&String>) =
        inputs.iter().partition(|s| has_glob_meta(s));

    let mut results: Vec<PathBuf> = literals.iter().map(PathBuf::from).collect();
    if patterns.is_empty() {
        return Ok(results);
    }

    let set = build_glob_set(&patterns)?;
    let mut roots: Vec<PathBuf> = Vec::new();
    for pattern in &patterns {
        let root = static_prefix_dir(pattern);
        if !roots.contains(&root) {
            roots.push(root);
        }
    }

    let mut matched: Vec<PathBuf> = roots
        .par_iter()
        .flat_map_iter(|root| {
            WalkBuilder::new(root)
                .git_ignore(true)
                .git_exclude(true)
                .hidden(false)
                .parents(true)
                .build()
                .filter_map(Result::ok)
                .filter(|dent| dent.file_type().is_some_and(|t| t.is_file()))
                .map(|dent| dent.into_path())
                .filter(|path| {
                    let relative = path.strip_prefix(".").unwrap_or(path);
                    set.is_match(relative) && registry.is_supported(path)
                })
                .collect::<Vec<_>>()
        })
        .collect();
    matched.sort();

    let mut seen: HashSet<PathBuf> = results.iter().cloned().collect();
    for path in matched {
        if seen.insert(path.clone()) {
            results.push(path);
        }
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_expand_inputs_matches_supported_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("locales/sub")).unwrap();
        fs::write(dir.path().join("locales/en.json"), "{}").unwrap();
        fs::write(dir.path().join("locales/tr.json"), "{}").unwrap();
        fs::write(dir.path().join("locales/notes.json.bak"), "").unwrap();
        fs::write(dir.path().join("locales/sub/de.json"), "{}").unwrap();

        let registry = FormatRegistry::default();
        let pattern = format!("{}/locales/*.json", dir.path().display());
        let found = expand_inputs(&[pattern], &registry).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["en.json", "tr.json"]);

        let deep = format!("{}/locales/**/*.json", dir.path().display());
        assert_eq!(expand_inputs(&[deep], &registry).unwrap().len(), 3);
    }

    #[test]
    fn test_literal_inputs_pass_through() {
        let registry = FormatRegistry::default();
        let inputs = vec!["missing/en.json".to_string()];
        assert_eq!(
            expand_inputs(&inputs, &registry).unwrap(),
            vec![PathBuf::from("missing/en.json")]
        );
        assert!(!has_glob_meta("plain/path.json"));
        assert!(has_glob_meta("src/**/*.resx"));
    }
}
