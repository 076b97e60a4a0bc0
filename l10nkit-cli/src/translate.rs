use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use l10nkit::{
    FileTranslation, FormatRegistry, TranslateOptions, TranslationEngine, TranslationProgress,
    Translator,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::ProjectConfig;
use crate::providers::{Provider, ProviderConfig, build_translator};
use crate::validation::{validate_input_path, validate_language_code, validate_language_codes};

#[derive(clap::Args, Debug, Clone)]
pub struct TranslateCommand {
    /// Source-culture file, or a directory of them
    pub path: PathBuf,

    /// Translation provider (default: `[translate] provider` from the config)
    #[arg(short, long, value_enum)]
    pub provider: Option<Provider>,

    /// Source culture (default: the configured base culture)
    #[arg(short, long)]
    pub source: Option<String>,

    /// Target cultures, comma separated or repeated
    #[arg(short, long = "target", value_delimiter = ',', required = true)]
    pub targets: Vec<String>,

    /// Maximum concurrent requests
    #[arg(long)]
    pub parallelism: Option<usize>,

    /// Cooldown after each request before its slot is reused, in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Only translate keys that are missing or empty in existing target files
    #[arg(long)]
    pub only_missing: bool,

    /// Directory for translated files (default: next to each source file)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Override the provider endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Model name for chat-model providers
    #[arg(long)]
    pub model: Option<String>,

    /// Environment variable holding the API key
    #[arg(long)]
    pub api_key_env: Option<String>,
}

/// Command flags merged with the `[translate]` config section.
#[derive(Debug, Clone)]
pub struct TranslatePlan {
    pub provider: Provider,
    pub provider_config: ProviderConfig,
    pub source: String,
    pub targets: Vec<String>,
    pub parallelism: usize,
    pub delay: Duration,
    pub only_missing: bool,
    pub recursive: bool,
}

pub fn resolve_plan(cmd: &TranslateCommand, config: &ProjectConfig) -> Result<TranslatePlan, String> {
    let section = &config.translate;
    let provider = match (cmd.provider, section.provider.as_deref()) {
        (Some(provider), _) => provider,
        (None, Some(name)) => Provider::parse(name)?,
        (None, None) => {
            return Err(
                "No translation provider given; pass --provider or set [translate] provider"
                    .to_string(),
            );
        }
    };

    let api_key_env = cmd.api_key_env.as_deref().or(section.api_key_env.as_deref());
    let provider_config = ProviderConfig::from_env(
        provider,
        api_key_env,
        cmd.endpoint.clone().or_else(|| section.endpoint.clone()),
        cmd.model.clone().or_else(|| section.model.clone()),
    );

    Ok(TranslatePlan {
        provider,
        provider_config,
        source: config.base_culture(cmd.source.as_deref()),
        targets: cmd.targets.clone(),
        parallelism: cmd.parallelism.or(section.parallelism).unwrap_or(1).max(1),
        delay: Duration::from_millis(cmd.delay_ms.or(section.delay_ms).unwrap_or(0)),
        only_missing: cmd.only_missing,
        recursive: config.recursive(cmd.recursive),
    })
}

fn progress_bar() -> Result<ProgressBar, String> {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
            .map_err(|e| format!("Failed to set progress style: {}", e))?
            .progress_chars("=> "),
    );
    Ok(bar)
}

fn print_file_result(target: &str, result: &FileTranslation) {
    let outcome = &result.outcome;
    let mark = if outcome.failed > 0 { "❌" } else { "✅" };
    let action = if result.written { "wrote" } else { "skipped" };
    println!(
        "{} [{}] {} {} (translated {}, skipped {}, failed {})",
        mark,
        target,
        action,
        result.output_path.display(),
        outcome.translated,
        outcome.skipped,
        outcome.failed
    );
    for entry in outcome.entries.iter().filter(|e| {
        e.comment
            .as_deref()
            .is_some_and(|c| c.starts_with("Translation failed"))
    }) {
        if let Some(comment) = &entry.comment {
            eprintln!("  {}: {}", entry.key, comment);
        }
    }
}

/// Translates `path` into every target culture. Returns the number of failed entries
/// and whether the run was cancelled.
pub async fn translate_all(
    translator: Arc<dyn Translator>,
    plan: &TranslatePlan,
    path: &Path,
    output_dir: Option<&Path>,
    cancel: CancellationToken,
) -> Result<(usize, bool), String> {
    let registry = FormatRegistry::default();
    let mut failed = 0usize;

    for target in &plan.targets {
        if cancel.is_cancelled() {
            break;
        }
        let bar = progress_bar()?;
        let progress = bar.clone();
        let options = TranslateOptions::new(&plan.source, target)
            .with_parallelism(plan.parallelism)
            .with_delay(plan.delay)
            .with_only_missing(plan.only_missing)
            .with_recursive(plan.recursive);
        let engine = TranslationEngine::new(translator.clone(), options)
            .with_cancellation(cancel.clone())
            .with_progress(Arc::new(move |p: TranslationProgress| {
                progress.set_length(p.total as u64);
                progress.set_position(p.completed as u64);
                progress.set_message(p.key);
            }));

        info!("translating {} into {}", path.display(), target);
        let results = if path.is_dir() {
            engine.translate_directory(&registry, path, output_dir).await
        } else {
            engine
                .translate_file(&registry, path, output_dir)
                .await
                .map(|r| vec![r])
        };
        bar.finish_and_clear();

        let results = results.map_err(|e| format!("Failed to translate into {}: {}", target, e))?;
        for result in &results {
            print_file_result(target, result);
            failed += result.outcome.failed;
        }
    }
    Ok((failed, cancel.is_cancelled()))
}

pub fn run_translate_command(cmd: TranslateCommand, config: &ProjectConfig) -> Result<(), String> {
    validate_input_path(&cmd.path)?;
    validate_language_codes(&cmd.targets)?;
    if let Some(source) = &cmd.source {
        validate_language_code(source)?;
    }

    let plan = resolve_plan(&cmd, config)?;
    if plan.targets.iter().any(|t| t.eq_ignore_ascii_case(&plan.source)) {
        return Err(format!(
            "Target cultures must differ from the source culture '{}'",
            plan.source
        ));
    }
    let translator = build_translator(plan.provider, plan.provider_config.clone())?;
    println!(
        "Translating with {} (parallelism {}, delay {} ms)",
        translator.name(),
        plan.parallelism,
        plan.delay.as_millis()
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start async runtime: {}", e))?;

    let (failed, cancelled) = runtime.block_on(async {
        let cancel = CancellationToken::new();
        let on_signal = cancel.clone();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("Cancelling, waiting for in-flight requests...");
                on_signal.cancel();
            }
        });
        let outcome = translate_all(
            translator,
            &plan,
            &cmd.path,
            cmd.output_dir.as_deref(),
            cancel,
        )
        .await;
        watcher.abort();
        outcome
    })?;

    if cancelled {
        println!("Cancelled; translations finished so far were written");
    }
    if failed > 0 {
        return Err(format!("{} entry translation(s) failed", failed));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        cmd: TranslateCommand,
    }

    fn parse(args: &[&str]) -> TranslateCommand {
        let mut argv = vec!["translate"];
        argv.extend_from_slice(args);
        Wrapper::parse_from(argv).cmd
    }

    #[test]
    fn test_plan_uses_config_defaults() {
        let config = ProjectConfig::from_toml_str(
            "[defaults]\nbase_culture = \"en\"\n[translate]\nprovider = \"libretranslate\"\nparallelism = 3\ndelay_ms = 100\n",
        )
        .unwrap();
        let plan = resolve_plan(&parse(&["locales", "-t", "tr,de"]), &config).unwrap();
        assert_eq!(plan.provider, Provider::Libretranslate);
        assert_eq!(plan.targets, vec!["tr", "de"]);
        assert_eq!(plan.parallelism, 3);
        assert_eq!(plan.delay, Duration::from_millis(100));
        assert_eq!(plan.source, "en");
    }

    #[test]
    fn test_flags_override_config() {
        let config =
            ProjectConfig::from_toml_str("[translate]\nprovider = \"deepl\"\nparallelism = 3\n")
                .unwrap();
        let plan = resolve_plan(
            &parse(&[
                "x.json",
                "-t",
                "fr",
                "--provider",
                "ollama",
                "--parallelism",
                "0",
                "--source",
                "de",
            ]),
            &config,
        )
        .unwrap();
        assert_eq!(plan.provider, Provider::Ollama);
        assert_eq!(plan.parallelism, 1);
        assert_eq!(plan.source, "de");
    }

    #[test]
    fn test_provider_is_required() {
        let err = resolve_plan(&parse(&["x.json", "-t", "fr"]), &ProjectConfig::default())
            .unwrap_err();
        assert!(err.contains("--provider"));
    }
}
