//! Culture-code detection from file names.
//!
//! A culture code is the last dot-separated segment of the file stem, e.g. `en` in
//! `messages.en.json` or `en-us` in `messages.en-US.yaml`. Detection never fails: a name
//! without a recognizable code yields `None`.

use std::path::Path;

/// Detects the culture code of a file name (no directory part expected, but one is tolerated).
///
/// # Example
/// ```rust
/// use l10nkit::culture::detect_culture;
/// assert_eq!(detect_culture("en.json").as_deref(), Some("en"));
/// assert_eq!(detect_culture("messages.en-US.yaml").as_deref(), Some("en-us"));
/// assert_eq!(detect_culture("messages.json"), None);
/// ```
pub fn detect_culture(file_name: &str) -> Option<String> {
    let name = base_name(file_name);
    let stem = strip_extension(name);
    culture_of_stem(stem)
}

/// Culture detection for i18next files.
///
/// A trailing `.i18n` marker is stripped from the stem before the normal rule runs
/// (`common.tr.i18n.json` → `tr`). When the name carries no code, the parent directory
/// name is tried instead (`locales/de/translation.json` → `de`).
pub fn detect_i18next_culture(path: &Path) -> Option<String> {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let stem = strip_extension(name);
    let stem = strip_suffix_ignore_case(stem, ".i18n").unwrap_or(stem);

    culture_of_stem(stem).or_else(|| {
        path.parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .filter(|dir| is_culture_code(dir))
            .map(str::to_ascii_lowercase)
    })
}

/// True when `segment` has the shape of a culture code: two letters (`en`), or a two-letter
/// language, a single `-` and a region of two or more alphanumerics, at most five
/// characters overall (`en-US`).
pub fn is_culture_code(segment: &str) -> bool {
    if segment.len() == 2 {
        return segment.chars().all(|c| c.is_ascii_alphabetic());
    }
    if !(4..=5).contains(&segment.len()) || segment.matches('-').count() != 1 {
        return false;
    }
    match segment.split_once('-') {
        Some((lang, region)) => {
            lang.len() == 2
                && lang.chars().all(|c| c.is_ascii_alphabetic())
                && region.len() >= 2
                && region.chars().all(|c| c.is_ascii_alphanumeric())
        }
        None => false,
    }
}

/// Normalizes a user-supplied culture code to the detector's lowercase form.
pub fn normalize_culture(culture: &str) -> String {
    culture.trim().replace('_', "-").to_ascii_lowercase()
}

fn culture_of_stem(stem: &str) -> Option<String> {
    let segment = stem.rsplit('.').next().unwrap_or(stem);
    if is_culture_code(segment) {
        Some(segment.to_ascii_lowercase())
    } else {
        None
    }
}

fn base_name(file_name: &str) -> &str {
    file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
}

fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

fn strip_suffix_ignore_case<'a>(value: &'a str, suffix: &str) -> Option<&'a str> {
    if value.len() >= suffix.len()
        && value.is_char_boundary(value.len() - suffix.len())
        && value[value.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
    {
        Some(&value[..value.len() - suffix.len()])
    } else {
        None
    }
}
