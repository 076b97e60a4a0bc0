use std::path::Path;

use l10nkit::{CheckRule, FormatType};
use unic_langid::LanguageIdentifier;

/// Validate file path exists and is a regular file
pub fn validate_file_path(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Err(format!("File does not exist: {}", path.display()));
    }
    if !path.is_file() {
        return Err(format!("Path is not a file: {}", path.display()));
    }
    Ok(())
}

/// Validate a path that may be either a file or a directory
pub fn validate_input_path(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Err(format!("Path does not exist: {}", path.display()));
    }
    Ok(())
}

/// Validate output directory exists or can be created
pub fn validate_output_path(path: &Path) -> Result<(), String> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if !parent.as_os_str().is_empty() && !parent.exists() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Cannot create output directory: {}", e))?;
    }
    Ok(())
}

/// Validate a culture code as a BCP 47 identifier. Underscore separators (`en_US`) are
/// accepted since file names commonly use them.
pub fn validate_language_code(lang: &str) -> Result<(), String> {
    if lang.trim().is_empty() {
        return Err("Language code cannot be empty".to_string());
    }

    let invalid = || {
        format!(
            "Invalid language code format: {}. Expected valid BCP 47 language identifier",
            lang
        )
    };
    let normalized = lang.trim().replace('_', "-");
    let lang_id: LanguageIdentifier = normalized.parse().map_err(|_| invalid())?;
    if lang_id.language.is_empty() {
        return Err(invalid());
    }
    Ok(())
}

pub fn validate_language_codes(langs: &[String]) -> Result<(), String> {
    for lang in langs {
        validate_language_code(lang)?;
    }
    Ok(())
}

/// Validate a format name or alias against the built-in handlers
pub fn validate_format_name(format: &str) -> Result<(), String> {
    if format.trim().is_empty() {
        return Err("Format cannot be empty".to_string());
    }
    format.parse::<FormatType>().map(|_| ()).map_err(|_| {
        let supported: Vec<_> = FormatType::ALL.iter().map(|f| f.id()).collect();
        format!(
            "Unsupported format: {}. Supported formats: {}",
            format,
            supported.join(", ")
        )
    })
}

/// Validate check rule names
pub fn validate_rule_names(names: &[String]) -> Result<(), String> {
    for name in names {
        if name.parse::<CheckRule>().is_err() {
            let known: Vec<_> = CheckRule::ALL.iter().map(|r| r.name()).collect();
            return Err(format!(
                "Unknown check rule: {}. Available rules: {}",
                name,
                known.join(", ")
            ));
        }
    }
    Ok(())
}
