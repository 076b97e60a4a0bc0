use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

use l10nkit_cli::ProjectConfig;
use l10nkit_cli::check::{CheckCommand, run_check_command};
use l10nkit_cli::convert::{ConvertCommand, run_convert_command};
use l10nkit_cli::diff::{DiffCommand, run_diff_command};
use l10nkit_cli::generate::{GenerateCommand, run_generate_command};
use l10nkit_cli::scan::{ScanCommand, run_scan_command};
use l10nkit_cli::translate::{TranslateCommand, run_translate_command};
use l10nkit_cli::watch::{WatchCommand, run_watch_command};

#[derive(Parser, Debug)]
#[command(name = "l10nkit", author, version, about, long_about = None)]
struct Args {
    /// Project config file (default: ./l10nkit.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare every target culture under a directory with the base culture.
    Scan(ScanCommand),

    /// Compare two localization files key by key.
    Diff(DiffCommand),

    /// Validate files against rules such as no-empty-values.
    Check(CheckCommand),

    /// Convert localization files between formats.
    Convert(ConvertCommand),

    /// Create or top up target-culture files from a base file.
    Generate(GenerateCommand),

    /// Re-run scan whenever files under a directory change.
    Watch(WatchCommand),

    /// Machine-translate files through a translation provider.
    Translate(TranslateCommand),

    /// Print shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("l10nkit={level},l10nkit_cli={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Args) -> Result<(), String> {
    if let Commands::Completions { shell } = args.commands {
        clap_complete::generate(shell, &mut Args::command(), "l10nkit", &mut std::io::stdout());
        return Ok(());
    }

    let config = ProjectConfig::load(args.config.as_deref())?;
    match args.commands {
        Commands::Scan(cmd) => run_scan_command(cmd, &config),
        Commands::Diff(cmd) => run_diff_command(cmd, &config),
        Commands::Check(cmd) => run_check_command(cmd, &config),
        Commands::Convert(cmd) => run_convert_command(cmd, &config),
        Commands::Generate(cmd) => run_generate_command(cmd, &config),
        Commands::Watch(cmd) => run_watch_command(cmd, &config),
        Commands::Translate(cmd) => run_translate_command(cmd, &config),
        Commands::Completions { .. } => Ok(()),
    }
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
