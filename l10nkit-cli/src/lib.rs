//! CLI library for testing purposes

pub mod check;
pub mod config;
pub mod convert;
pub mod diff;
pub mod generate;
pub mod path_glob;
pub mod providers;
pub mod render;
pub mod scan;
pub mod translate;
pub mod validation;
pub mod watch;

pub use config::ProjectConfig;
pub use providers::{Provider, ProviderConfig, build_translator};
