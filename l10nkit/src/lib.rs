#![forbid(unsafe_code)]
//! Localization file toolkit for Rust.
//!
//! Parses, compares, converts and machine-translates key-value translation files. Every
//! format is reduced to one flat model ([`Resource`] of [`Entry`] values) so that the
//! comparison engine and the conversion services work uniformly across formats.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use l10nkit::{FormatRegistry, ScanOptions, Scanner};
//!
//! let registry = FormatRegistry::default();
//! let report = Scanner::new(&registry).scan(
//!     "locales".as_ref(),
//!     &ScanOptions::new().with_base_culture("en"),
//! )?;
//! for result in &report.results {
//!     println!("{}: {} missing", result.culture, result.missing_keys.len());
//! }
//! # Ok::<(), l10nkit::Error>(())
//! ```
//!
//! # Supported Formats
//!
//! - **JSON** and **i18next JSON**: nested objects flattened to dotted keys
//! - **YAML**: same flattening over mappings and sequences
//! - **RESX**: .NET XML resources (`Home_Title` is read as `Home.Title`)
//! - **PO**: gettext catalogs
//! - **XLIFF**: 1.2 and 2.0 on read, 1.2 on write
//! - **SRT** / **VTT**: subtitle cues keyed by index or cue identifier
//! - **CSV**: `key,value` or wide multi-language tables
//! - **Fluent**: messages, attributes and multi-line values
//! - **VB**: read-only extraction from Visual Basic resource wrappers
//!
//! # Operations
//!
//! - [`Scanner`]: compare every target culture under a directory with a base culture
//! - [`Differ`]: compare two files key by key
//! - [`Checker`]: rule-based validation with severities
//! - [`Converter`]: convert files or whole directories between formats
//! - [`Generator`]: create or top up target-culture files from a base file
//! - [`TranslationEngine`]: bounded-concurrency machine translation via a [`Translator`]

pub mod check;
pub mod converter;
pub mod culture;
pub mod diff;
pub mod discovery;
pub mod error;
pub mod formats;
pub mod generate;
pub mod placeholder;
pub mod registry;
pub mod report;
pub mod scan;
pub mod traits;
pub mod translate;
pub mod types;

// Re-export most used types for easy consumption
pub use crate::{
    check::{CheckOptions, CheckRule, Checker, check_resource},
    converter::{
        ConvertDirectoryOptions, ConvertItem, ConvertOptions, ConvertResult, Converter,
    },
    culture::detect_culture,
    diff::{DiffOptions, Differ, diff_resources},
    discovery::{DiscoverOptions, discover_files, discover_paths},
    error::Error,
    formats::FormatType,
    generate::{FillMode, GenerateOptions, GenerateResult, Generator, localized_path},
    placeholder::{PlaceholderMatcher, extract_placeholders},
    registry::FormatRegistry,
    report::{
        CheckReport, CultureComparisonResult, DiffReport, PlaceholderMismatch, ScanReport,
        Severity, Violation,
    },
    scan::{ScanOptions, Scanner, scan_resources},
    traits::FormatHandler,
    translate::{
        FileTranslation, ProgressCallback, TranslateOptions, TranslationEngine,
        TranslationOutcome, TranslationProgress, TranslationStatus, Translator,
    },
    types::{Entry, Resource},
};
