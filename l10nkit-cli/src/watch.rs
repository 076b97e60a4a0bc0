//! Polling watcher that re-runs scan (and optionally check) after changes settle.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use l10nkit::{
    CheckOptions, Checker, DiscoverOptions, FormatRegistry, ScanOptions, Scanner, discover_paths,
};
use tracing::{debug, info};

use crate::check::render_check_human;
use crate::config::ProjectConfig;
use crate::render::color_enabled;
use crate::scan::render_scan_human;
use crate::validation::{validate_language_code, validate_language_codes};

#[derive(clap::Args, Debug, Clone)]
pub struct WatchCommand {
    /// Directory to watch
    pub path: PathBuf,

    /// Base culture every target is compared with
    #[arg(short, long)]
    pub base: Option<String>,

    /// Target cultures to compare (default: every other culture found)
    #[arg(short, long = "target", value_delimiter = ',')]
    pub targets: Vec<String>,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Skip files whose name contains this text (repeatable)
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Also run check after each change
    #[arg(long)]
    pub check: bool,

    /// How often the tree is polled, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub interval_ms: u64,

    /// Quiet period required after the last change, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub debounce_ms: u64,
}

/// Modification time of every supported file under the watched root.
pub type Snapshot = BTreeMap<PathBuf, SystemTime>;

pub fn snapshot(root: &Path, registry: &FormatRegistry, options: &DiscoverOptions) -> Snapshot {
    let paths = match discover_paths(root, registry, options) {
        Ok(paths) => paths,
        Err(e) => {
            debug!("cannot list {}: {}", root.display(), e);
            return Snapshot::new();
        }
    };
    paths
        .into_iter()
        .filter_map(|path| {
            let modified = std::fs::metadata(&path).and_then(|m| m.modified()).ok()?;
            Some((path, modified))
        })
        .collect()
}

/// Paths added, removed or modified between two snapshots.
pub fn changed_paths(previous: &Snapshot, current: &Snapshot) -> Vec<PathBuf> {
    let mut changed: Vec<PathBuf> = current
        .iter()
        .filter(|(path, modified)| previous.get(*path) != Some(*modified))
        .map(|(path, _)| path.clone())
        .collect();
    changed.extend(
        previous
            .keys()
            .filter(|path| !current.contains_key(*path))
            .cloned(),
    );
    changed.sort();
    changed
}

/// Collapses a burst of change events into one run.
#[derive(Debug, Clone)]
pub struct Debouncer {
    debounce: Duration,
    pending_since: Option<Instant>,
}

impl Debouncer {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            pending_since: None,
        }
    }

    /// Records one poll. Returns true exactly once after a change, as soon as no further
    /// change has been seen for the debounce window.
    pub fn observe(&mut self, changed: bool, now: Instant) -> bool {
        if changed {
            self.pending_since = Some(now);
            return false;
        }
        match self.pending_since {
            Some(since) if now.saturating_duration_since(since) >= self.debounce => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }
}

struct WatchPass {
    scan: ScanOptions,
    check: Option<CheckOptions>,
}

fn run_pass(path: &Path, registry: &FormatRegistry, pass: &WatchPass) {
    let color = color_enabled();
    match Scanner::new(registry).scan(path, &pass.scan) {
        Ok(report) => println!("{}", render_scan_human(&report, color)),
        Err(e) => eprintln!("❌ Scan failed: {}", e),
    }
    if let Some(check) = &pass.check {
        match Checker::new(registry).check(path, check) {
            Ok(report) => println!("{}", render_check_human(&report, color)),
            Err(e) => eprintln!("❌ Check failed: {}", e),
        }
    }
}

pub fn run_watch_command(cmd: WatchCommand, config: &ProjectConfig) -> Result<(), String> {
    if !cmd.path.is_dir() {
        return Err(format!("Path is not a directory: {}", cmd.path.display()));
    }
    if let Some(base) = &cmd.base {
        validate_language_code(base)?;
    }
    validate_language_codes(&cmd.targets)?;

    let base = config.base_culture(cmd.base.as_deref());
    let recursive = config.recursive(cmd.recursive);
    let ignore = config.ignore(&cmd.ignore);
    let pattern = config.placeholder_pattern(None);
    let pass = WatchPass {
        scan: ScanOptions::new()
            .with_base_culture(base.clone())
            .with_target_cultures(cmd.targets.iter().cloned())
            .with_recursive(recursive)
            .with_ignore(ignore.iter().cloned())
            .with_placeholder_pattern(pattern.clone()),
        check: if cmd.check {
            let options = CheckOptions::new()
                .with_base_culture(base)
                .with_recursive(recursive)
                .with_ignore(ignore.iter().cloned())
                .with_placeholder_pattern(pattern);
            Some(config.apply_check(options, &[])?)
        } else {
            None
        },
    };
    let discover = DiscoverOptions::new()
        .with_recursive(recursive)
        .with_ignore(ignore);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start async runtime: {}", e))?;

    runtime.block_on(async {
        let registry = FormatRegistry::default();
        let mut previous = snapshot(&cmd.path, &registry, &discover);
        let mut debouncer = Debouncer::new(Duration::from_millis(cmd.debounce_ms));
        let mut ticker = tokio::time::interval(Duration::from_millis(cmd.interval_ms.max(50)));

        run_pass(&cmd.path, &registry, &pass);
        println!(
            "Watching {} ({} files, Ctrl-C to stop)",
            cmd.path.display(),
            previous.len()
        );

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    println!("Stopped watching");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    let current = snapshot(&cmd.path, &registry, &discover);
                    let changed = changed_paths(&previous, &current);
                    for path in &changed {
                        info!("changed: {}", path.display());
                    }
                    previous = current;
                    if debouncer.observe(!changed.is_empty(), Instant::now()) {
                        println!("\n--- change detected, re-running ---");
                        run_pass(&cmd.path, &registry, &pass);
                    }
                }
            }
        }
    })
}
