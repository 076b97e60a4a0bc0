use std::path::{Path, PathBuf};

use l10nkit::converter::swap_extension;
use l10nkit::{
    ConvertDirectoryOptions, ConvertItem, ConvertOptions, ConvertResult, Converter, FormatRegistry,
};
use tracing::info;

use crate::config::ProjectConfig;
use crate::path_glob::expand_inputs;
use crate::validation::{validate_format_name, validate_output_path};

#[derive(clap::Args, Debug, Clone)]
pub struct ConvertCommand {
    /// Input file, directory or glob pattern (repeatable)
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Output file, or output directory for directory and multi-file input
    #[arg(short, long)]
    pub output: PathBuf,

    /// Target format (default: inferred from the output extension)
    #[arg(short = 't', long = "to")]
    pub to: Option<String>,

    /// Descend into subdirectories of a directory input
    #[arg(short, long)]
    pub recursive: bool,

    /// Replace existing output files
    #[arg(long)]
    pub overwrite: bool,

    /// Skip files whose name contains this text (repeatable)
    #[arg(long)]
    pub ignore: Vec<String>,
}

enum ConvertPlan {
    Single(PathBuf),
    Directory(PathBuf),
    Batch(Vec<PathBuf>),
}

fn plan(cmd: &ConvertCommand, registry: &FormatRegistry) -> Result<ConvertPlan, String> {
    if let [only] = cmd.input.as_slice() {
        let path = Path::new(only);
        if path.is_dir() {
            return Ok(ConvertPlan::Directory(path.to_path_buf()));
        }
    }

    let mut files = expand_inputs(&cmd.input, registry)?;
    match files.len() {
        0 => Err(format!("No localization files match: {}", cmd.input.join(", "))),
        1 if !cmd.output.is_dir() => Ok(ConvertPlan::Single(files.remove(0))),
        _ => Ok(ConvertPlan::Batch(files)),
    }
}

fn required_target<'a>(cmd: &'a ConvertCommand) -> Result<&'a str, String> {
    cmd.to
        .as_deref()
        .ok_or_else(|| "--to is required when converting several files".to_string())
}

/// Converts each file into `out_dir`, keeping its file name and swapping the extension.
fn convert_batch(
    registry: &FormatRegistry,
    files: &[PathBuf],
    out_dir: &Path,
    target: &str,
    overwrite: bool,
) -> Result<Vec<ConvertItem>, String> {
    let target_handler = registry.get_by_name(target).map_err(|e| e.to_string())?;
    let options = ConvertOptions::new()
        .with_target_format(target)
        .with_overwrite(overwrite);
    let converter = Converter::new(registry);

    let items = files
        .iter()
        .map(|file| {
            let outcome = match registry.get_for_file(file) {
                Some(source_handler) => {
                    let renamed = swap_extension(file, source_handler, target_handler);
                    let name = renamed.file_name().map(PathBuf::from).unwrap_or(renamed);
                    converter.convert(file, &out_dir.join(name), &options)
                }
                None => Err(l10nkit::Error::UnsupportedFormat(file.display().to_string())),
            };
            ConvertItem {
                source_path: file.clone(),
                outcome,
            }
        })
        .collect();
    Ok(items)
}

fn describe(result: &ConvertResult) -> String {
    format!(
        "✅ {} -> {} ({} -> {}, {} entries)",
        result.source_path.display(),
        result.destination_path.display(),
        result.source_format,
        result.target_format,
        result.entry_count
    )
}

/// Prints one line per item and fails when any item failed.
fn report_items(items: &[ConvertItem]) -> Result<(), String> {
    let mut failed = 0usize;
    for item in items {
        match &item.outcome {
            Ok(result) => println!("{}", describe(result)),
            Err(e) => {
                failed += 1;
                eprintln!("❌ {}: {}", item.source_path.display(), e);
            }
        }
    }
    println!(
        "Converted {} of {} file(s)",
        items.len() - failed,
        items.len()
    );
    if failed > 0 {
        return Err(format!("{} file(s) failed to convert", failed));
    }
    Ok(())
}

pub fn run_convert_command(cmd: ConvertCommand, config: &ProjectConfig) -> Result<(), String> {
    if let Some(to) = &cmd.to {
        validate_format_name(to)?;
    }
    let registry = FormatRegistry::default();

    match plan(&cmd, &registry)? {
        ConvertPlan::Single(file) => {
            validate_output_path(&cmd.output)?;
            let mut options = ConvertOptions::new().with_overwrite(cmd.overwrite);
            if let Some(to) = &cmd.to {
                options = options.with_target_format(to);
            }
            let result = Converter::new(&registry)
                .convert(&file, &cmd.output, &options)
                .map_err(|e| e.to_string())?;
            println!("{}", describe(&result));
            Ok(())
        }
        ConvertPlan::Directory(dir) => {
            let options = ConvertDirectoryOptions::new(required_target(&cmd)?)
                .with_recursive(config.recursive(cmd.recursive))
                .with_overwrite(cmd.overwrite)
                .with_ignore(config.ignore(&cmd.ignore));
            info!("converting directory {}", dir.display());
            let items = Converter::new(&registry)
                .convert_directory(&dir, &cmd.output, &options)
                .map_err(|e| e.to_string())?;
            report_items(&items)
        }
        ConvertPlan::Batch(files) => {
            let target = required_target(&cmd)?;
            let items = convert_batch(&registry, &files, &cmd.output, target, cmd.overwrite)?;
            report_items(&items)
        }
    }
}
