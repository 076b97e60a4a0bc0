//! Machine translation of resource entries through a pluggable [`Translator`].
//!
//! [`TranslationEngine`] runs a bounded worker pool: at most `degree_of_parallelism`
//! requests are in flight, and each worker holds its slot for `delay_between_calls` after
//! its request finishes. Results land in a slot per entry index, so output order always
//! matches input order. A failing entry never aborts the batch; it keeps its prior value
//! and carries a `Translation failed: ...` comment.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::{sync::Semaphore, task::JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    culture::normalize_culture,
    discovery::{DiscoverOptions, discover_files},
    error::Error,
    generate::{localized_output_path, mirrored_dir},
    registry::FormatRegistry,
    types::{Entry, Resource},
};

/// A remote (or fake) text translation capability.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Short provider name for messages.
    fn name(&self) -> &str;

    async fn translate_text(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, Error>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateOptions {
    pub source_language: String,
    pub target_language: String,
    /// Maximum concurrent requests; values below 1 are treated as 1.
    pub degree_of_parallelism: usize,
    /// Cooldown each worker observes after its request before freeing its slot.
    pub delay_between_calls: Duration,
    /// Skip keys that already have a value in the existing target file.
    pub only_missing: bool,
    /// Descend into subdirectories in [`TranslationEngine::translate_directory`].
    pub recursive: bool,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        TranslateOptions {
            source_language: "en".to_string(),
            target_language: String::new(),
            degree_of_parallelism: 1,
            delay_between_calls: Duration::ZERO,
            only_missing: false,
            recursive: false,
        }
    }
}

impl TranslateOptions {
    pub fn new(source_language: impl Into<String>, target_language: impl Into<String>) -> Self {
        TranslateOptions {
            source_language: source_language.into(),
            target_language: target_language.into(),
            ..Default::default()
        }
    }

    pub fn with_parallelism(mut self, degree: usize) -> Self {
        self.degree_of_parallelism = degree;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay_between_calls = delay;
        self
    }

    pub fn with_only_missing(mut self, only_missing: bool) -> Self {
        self.only_missing = only_missing;
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn parallelism(&self) -> usize {
        self.degree_of_parallelism.max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationStatus {
    Translated,
    Skipped,
    Failed,
}

/// Reported once per finished entry. `completed` only grows; callbacks may arrive out of
/// key order when running in parallel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationProgress {
    pub completed: usize,
    pub total: usize,
    pub key: String,
    pub status: TranslationStatus,
}

pub type ProgressCallback = Arc<dyn Fn(TranslationProgress) + Send + Sync>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationOutcome {
    /// Output entries in input order. Shorter than the input only when cancelled.
    pub entries: Vec<Entry>,
    pub translated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub cancelled: bool,
}

/// Result of translating one file.
#[derive(Debug, Clone)]
pub struct FileTranslation {
    pub source_path: PathBuf,
    pub output_path: PathBuf,
    /// Whether the output file was written.
    pub written: bool,
    pub outcome: TranslationOutcome,
}

#[derive(Default)]
struct Counters {
    translated: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
    completed: AtomicUsize,
}

#[derive(Clone)]
struct ProgressReporter {
    counters: Arc<Counters>,
    callback: Option<ProgressCallback>,
    total: usize,
}

impl ProgressReporter {
    fn finish(&self, key: &str, status: TranslationStatus) {
        let counter = match status {
            TranslationStatus::Translated => &self.counters.translated,
            TranslationStatus::Skipped => &self.counters.skipped,
            TranslationStatus::Failed => &self.counters.failed,
        };
        counter.fetch_add(1, Ordering::SeqCst);
        let completed = self.counters.completed.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(callback) = &self.callback {
            callback(TranslationProgress {
                completed,
                total: self.total,
                key: key.to_string(),
                status,
            });
        }
    }
}

pub struct TranslationEngine {
    translator: Arc<dyn Translator>,
    options: TranslateOptions,
    progress: Option<ProgressCallback>,
    cancel: CancellationToken,
}

impl TranslationEngine {
    pub fn new(translator: Arc<dyn Translator>, options: TranslateOptions) -> Self {
        TranslationEngine {
            translator,
            options,
            progress: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Shares an externally owned cancellation token (e.g. one tripped by Ctrl-C).
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn options(&self) -> &TranslateOptions {
        &self.options
    }

    /// Translates `entries`. `existing` is the current target file, if any: it supplies
    /// values kept for failed entries and, with `only_missing`, the entries to skip.
    ///
    /// Entries with no text are passed through as skipped. Cancellation is checked before
    /// each entry; in-flight requests finish and the collected prefix is returned.
    pub async fn translate_entries(
        &self,
        entries: &[Entry],
        existing: Option<&Resource>,
    ) -> TranslationOutcome {
        let total = entries.len();
        let source = self.options.source_language.clone();
        let target = self.options.target_language.clone();
        let delay = self.options.delay_between_calls;
        let reporter = ProgressReporter {
            counters: Arc::new(Counters::default()),
            callback: self.progress.clone(),
            total,
        };
        let prior_values: HashMap<&str, &Entry> = existing
            .map(|r| r.entries.iter().map(|e| (e.key.as_str(), e)).collect())
            .unwrap_or_default();

        let semaphore = Arc::new(Semaphore::new(self.options.parallelism()));
        let mut slots: Vec<Option<Entry>> = vec![None; total];
        let mut workers = JoinSet::new();
        let mut cancelled = false;

        for (index, entry) in entries.iter().enumerate() {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let prior = prior_values.get(entry.key.as_str()).copied();
            let text = entry
                .value
                .as_deref()
                .or(entry.source.as_deref())
                .unwrap_or_default()
                .to_string();
            if text.trim().is_empty() {
                slots[index] = Some(entry.clone());
                reporter.finish(&entry.key, TranslationStatus::Skipped);
                continue;
            }
            if let Some(prior) = prior.filter(|p| self.options.only_missing && !p.is_empty()) {
                slots[index] = Some(prior.clone());
                reporter.finish(&entry.key, TranslationStatus::Skipped);
                continue;
            }

            let permit = tokio::select! {
                _ = self.cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let translator = self.translator.clone();
            let reporter = reporter.clone();
            let source = source.clone();
            let target = target.clone();
            let entry = entry.clone();
            let fallback = prior.and_then(|p| p.value.clone());
            workers.spawn(async move {
                let result = translator.translate_text(&text, &source, &target).await;
                let (output, status) = match result {
                    Ok(translated) => (
                        Entry::new(entry.key.clone(), Some(translated))
                            .with_comment(entry.comment.clone())
                            .with_source(Some(text)),
                        TranslationStatus::Translated,
                    ),
                    Err(e) => {
                        debug!("translation of `{}` failed: {}", entry.key, e);
                        (
                            Entry::new(entry.key.clone(), Some(fallback.unwrap_or_default()))
                                .with_comment(Some(format!("Translation failed: {}", e)))
                                .with_source(Some(text)),
                            TranslationStatus::Failed,
                        )
                    }
                };
                reporter.finish(&entry.key, status);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                drop(permit);
                (index, output)
            });
        }

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((index, entry)) => slots[index] = Some(entry),
                Err(e) => debug!("translation worker aborted: {}", e),
            }
        }

        let counters = &reporter.counters;
        TranslationOutcome {
            entries: slots.into_iter().flatten().collect(),
            translated: counters.translated.load(Ordering::SeqCst),
            skipped: counters.skipped.load(Ordering::SeqCst),
            failed: counters.failed.load(Ordering::SeqCst),
            cancelled,
        }
    }

    /// Translates one file into the target culture, writing next to it or under `out_dir`.
    /// The output name follows [`localized_output_path`].
    ///
    /// Read and parse errors of `path` are returned. After a cancellation, untouched keys
    /// keep whatever the existing target file had.
    pub async fn translate_file(
        &self,
        registry: &FormatRegistry,
        path: &Path,
        out_dir: Option<&Path>,
    ) -> Result<FileTranslation, Error> {
        let resource = registry.read_file(path)?;
        self.translate_resource(registry, &resource, out_dir).await
    }

    /// Translates every source-culture file under `dir`. Unparsable files are skipped and
    /// the walk stops early once cancelled.
    pub async fn translate_directory(
        &self,
        registry: &FormatRegistry,
        dir: &Path,
        out_dir: Option<&Path>,
    ) -> Result<Vec<FileTranslation>, Error> {
        let source = normalize_culture(&self.options.source_language);
        let discover = DiscoverOptions::new().with_recursive(self.options.recursive);
        let resources: Vec<Resource> = discover_files(dir, registry, &discover)?
            .filter(|r| r.culture.as_deref() == Some(source.as_str()))
            .collect();

        let mut results = Vec::new();
        for resource in resources {
            if self.cancel.is_cancelled() {
                break;
            }
            let target_dir = out_dir.map(|o| mirrored_dir(&resource.path, dir, &source, o));
            match self
                .translate_resource(registry, &resource, target_dir.as_deref())
                .await
            {
                Ok(result) => results.push(result),
                Err(e) => debug!("skipping {}: {}", resource.path.display(), e),
            }
        }
        Ok(results)
    }

    async fn translate_resource(
        &self,
        registry: &FormatRegistry,
        resource: &Resource,
        out_dir: Option<&Path>,
    ) -> Result<FileTranslation, Error> {
        let source = normalize_culture(&self.options.source_language);
        let target = normalize_culture(&self.options.target_language);
        if target.is_empty() {
            return Err(Error::InvalidArgument("target language is required".to_string()));
        }
        if target == source {
            return Err(Error::InvalidArgument(format!(
                "source and target language are both `{}`",
                target
            )));
        }

        let handler = registry
            .get_by_id(&resource.format_id)
            .ok_or_else(|| Error::UnsupportedFormat(resource.format_id.clone()))?;
        if !handler.is_writable() {
            return Err(Error::ReadOnlyFormat(handler.format_id().to_string()));
        }

        let base_culture = resource.culture.clone().unwrap_or_else(|| source.clone());
        let output_path = localized_output_path(&resource.path, &base_culture, &target, out_dir);
        let existing = handler.read_or_empty(&output_path)?;

        let outcome = self
            .translate_entries(&resource.entries, Some(&existing))
            .await;

        let entries = if outcome.cancelled {
            let done: HashMap<&str, &Entry> =
                outcome.entries.iter().map(|e| (e.key.as_str(), e)).collect();
            resource
                .entries
                .iter()
                .filter_map(|e| {
                    done.get(e.key.as_str())
                        .copied()
                        .or_else(|| existing.get(&e.key))
                        .cloned()
                })
                .collect()
        } else {
            outcome.entries.clone()
        };

        let written = !outcome.cancelled || outcome.translated > 0;
        if written {
            let output = Resource::new(
                &output_path,
                Some(target.clone()),
                handler.format_id(),
                entries,
            );
            handler.write_to(&output, &output_path)?;
        }

        Ok(FileTranslation {
            source_path: resource.path.clone(),
            output_path,
            written,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Upper;

    #[async_trait]
    impl Translator for Upper {
        fn name(&self) -> &str {
            "upper"
        }

        async fn translate_text(&self, text: &str, _: &str, _: &str) -> Result<String, Error> {
            Ok(text.to_uppercase())
        }
    }

    fn entries(pairs: &[(&str, &str)]) -> Vec<Entry> {
        pairs
            .iter()
            .map(|(k, v)| Entry::text_entry(*k, *v))
            .collect()
    }

    #[tokio::test]
    async fn test_translates_and_skips_empty() {
        let engine = TranslationEngine::new(Arc::new(Upper), TranslateOptions::new("en", "tr"));
        let outcome = engine
            .translate_entries(&entries(&[("a", "hi"), ("b", " "), ("c", "yo")]), None)
            .await;
        assert_eq!(outcome.translated, 2);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.entries.len(), 3);
        assert_eq!(outcome.entries[0].text(), "HI");
        assert_eq!(outcome.entries[0].source.as_deref(), Some("hi"));
        assert_eq!(outcome.entries[1].text(), " ");
    }

    #[tokio::test]
    async fn test_only_missing_keeps_existing() {
        let existing = Resource::new(
            "tr.json",
            Some("tr".to_string()),
            "json",
            entries(&[("a", "Merhaba")]),
        );
        let options = TranslateOptions::new("en", "tr").with_only_missing(true);
        let engine = TranslationEngine::new(Arc::new(Upper), options);
        let outcome = engine
            .translate_entries(&entries(&[("a", "hi"), ("b", "yo")]), Some(&existing))
            .await;
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.entries[0].text(), "Merhaba");
        assert_eq!(outcome.entries[1].text(), "YO");
    }

    #[tokio::test]
    async fn test_progress_counts_every_entry() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let engine = TranslationEngine::new(
            Arc::new(Upper),
            TranslateOptions::new("en", "tr").with_parallelism(3),
        )
        .with_progress(Arc::new(move |p: TranslationProgress| {
            sink.lock().unwrap().push(p.completed)
        }));
        let input = entries(&[("a", "1"), ("b", "2"), ("c", ""), ("d", "4")]);
        engine.translate_entries(&input, None).await;
        let mut seen = seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let engine = TranslationEngine::new(Arc::new(Upper), TranslateOptions::new("en", "tr"));
        engine.cancellation_token().cancel();
        let outcome = engine.translate_entries(&entries(&[("a", "hi")]), None).await;
        assert!(outcome.cancelled);
        assert!(outcome.entries.is_empty());
    }

    #[tokio::test]
    async fn test_translate_file_writes_target() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("messages.en.json");
        std::fs::write(&base, r#"{"greet": "hello"}"#).unwrap();

        let registry = FormatRegistry::default();
        let engine = TranslationEngine::new(Arc::new(Upper), TranslateOptions::new("en", "de"));
        let result = engine.translate_file(&registry, &base, None).await.unwrap();
        assert!(result.written);
        assert_eq!(result.output_path, dir.path().join("messages.de.json"));

        let de = registry.read_file(&result.output_path).unwrap();
        assert_eq!(de.get("greet").unwrap().text(), "HELLO");
    }

    #[tokio::test]
    async fn test_same_language_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("en.json");
        std::fs::write(&base, "{}").unwrap();
        let registry = FormatRegistry::default();
        let engine = TranslationEngine::new(Arc::new(Upper), TranslateOptions::new("en", "EN"));
        let err = engine.translate_file(&registry, &base, None).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
