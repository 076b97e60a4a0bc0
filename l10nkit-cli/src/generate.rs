use std::path::PathBuf;

use l10nkit::{FillMode, FormatRegistry, GenerateOptions, GenerateResult, Generator};

use crate::config::ProjectConfig;
use crate::validation::{validate_input_path, validate_language_code, validate_language_codes};

#[derive(clap::Args, Debug, Clone)]
pub struct GenerateCommand {
    /// Base-culture file, or a directory of them
    pub base: PathBuf,

    /// Cultures to generate, comma separated or repeated
    #[arg(short, long = "target", value_delimiter = ',', required = true)]
    pub targets: Vec<String>,

    /// Directory for the generated files (default: next to each base file)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// How new keys are filled: `empty` or `copy-base`
    #[arg(long, default_value = "empty", value_parser = parse_fill_mode)]
    pub fill: FillMode,

    /// Rewrite existing target files even when no key is missing
    #[arg(long)]
    pub overwrite: bool,

    /// Culture of the base files when generating from a directory
    #[arg(short, long)]
    pub base_culture: Option<String>,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,
}

fn parse_fill_mode(s: &str) -> Result<FillMode, String> {
    s.parse::<FillMode>().map_err(|e| e.to_string())
}

pub fn describe_result(result: &GenerateResult) -> String {
    let action = if result.created {
        "created"
    } else if result.added_keys > 0 {
        "updated"
    } else {
        "unchanged"
    };
    format!(
        "✅ [{}] {} {} (+{} keys, {} total)",
        result.culture,
        action,
        result.output_path.display(),
        result.added_keys,
        result.total_keys
    )
}

pub fn run_generate_command(cmd: GenerateCommand, config: &ProjectConfig) -> Result<(), String> {
    validate_input_path(&cmd.base)?;
    validate_language_codes(&cmd.targets)?;
    if let Some(base) = &cmd.base_culture {
        validate_language_code(base)?;
    }

    let options = GenerateOptions::new(cmd.targets.iter().cloned())
        .with_fill_mode(cmd.fill)
        .with_overwrite(cmd.overwrite)
        .with_base_culture(config.base_culture(cmd.base_culture.as_deref()))
        .with_recursive(config.recursive(cmd.recursive));

    let registry = FormatRegistry::default();
    let results = Generator::new(&registry)
        .generate(&cmd.base, cmd.output_dir.as_deref(), &options)
        .map_err(|e| e.to_string())?;

    if results.is_empty() {
        return Err(format!(
            "No base-culture files found in {}",
            cmd.base.display()
        ));
    }
    for result in &results {
        println!("{}", describe_result(result));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_result() {
        let mut result = GenerateResult {
            culture: "tr".to_string(),
            output_path: PathBuf::from("tr.json"),
            created: true,
            added_keys: 3,
            total_keys: 3,
        };
        assert_eq!(
            describe_result(&result),
            "✅ [tr] created tr.json (+3 keys, 3 total)"
        );
        result.created = false;
        result.added_keys = 0;
        assert!(describe_result(&result).contains("unchanged"));
    }

    #[test]
    fn test_parse_fill_mode() {
        assert_eq!(parse_fill_mode("copy-base").unwrap(), FillMode::CopyBase);
        assert!(parse_fill_mode("random").is_err());
    }
}
