//! All supported localization file formats for l10nkit.
//!
//! Each submodule provides one [`FormatHandler`] implementation. This module re-exports
//! them and provides the [`FormatType`] enum for naming a format on the command line or
//! in configuration.

pub mod csv;
pub mod ftl;
pub mod i18next;
pub mod json;
pub mod po;
pub mod resx;
pub mod srt;
pub mod vb;
pub mod vtt;
pub mod xliff;
pub mod yaml;

pub(crate) mod tree;
pub(crate) mod xml;

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

pub use csv::CsvFormat;
pub use ftl::FtlFormat;
pub use i18next::I18nextFormat;
pub use json::JsonFormat;
pub use po::PoFormat;
pub use resx::ResxFormat;
pub use srt::SrtFormat;
pub use vb::VbFormat;
pub use vtt::VttFormat;
pub use xliff::XliffFormat;
pub use yaml::YamlFormat;

use crate::{Error, traits::FormatHandler};

/// Names every built-in format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatType {
    I18next,
    Json,
    Yaml,
    Resx,
    Po,
    Xliff,
    Srt,
    Vtt,
    Csv,
    Ftl,
    Vb,
}

impl FormatType {
    /// All formats, in default registration order.
    pub const ALL: [FormatType; 11] = [
        FormatType::I18next,
        FormatType::Json,
        FormatType::Yaml,
        FormatType::Resx,
        FormatType::Po,
        FormatType::Xliff,
        FormatType::Srt,
        FormatType::Vtt,
        FormatType::Csv,
        FormatType::Ftl,
        FormatType::Vb,
    ];

    /// The registry id, as stored in `Resource::format_id`.
    pub fn id(&self) -> &'static str {
        match self {
            FormatType::I18next => "i18next",
            FormatType::Json => "json",
            FormatType::Yaml => "yaml",
            FormatType::Resx => "resx",
            FormatType::Po => "po",
            FormatType::Xliff => "xliff",
            FormatType::Srt => "srt",
            FormatType::Vtt => "vtt",
            FormatType::Csv => "csv",
            FormatType::Ftl => "ftl",
            FormatType::Vb => "vb",
        }
    }

    /// Returns the typical file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatType::I18next => "i18n.json",
            FormatType::Json => "json",
            FormatType::Yaml => "yaml",
            FormatType::Resx => "resx",
            FormatType::Po => "po",
            FormatType::Xliff => "xlf",
            FormatType::Srt => "srt",
            FormatType::Vtt => "vtt",
            FormatType::Csv => "csv",
            FormatType::Ftl => "ftl",
            FormatType::Vb => "vb",
        }
    }

    /// A fresh handler for this format with default settings.
    pub fn handler(&self) -> Box<dyn FormatHandler> {
        match self {
            FormatType::I18next => Box::new(I18nextFormat),
            FormatType::Json => Box::new(JsonFormat),
            FormatType::Yaml => Box::new(YamlFormat),
            FormatType::Resx => Box::new(ResxFormat),
            FormatType::Po => Box::new(PoFormat),
            FormatType::Xliff => Box::new(XliffFormat::default()),
            FormatType::Srt => Box::new(SrtFormat),
            FormatType::Vtt => Box::new(VttFormat),
            FormatType::Csv => Box::new(CsvFormat),
            FormatType::Ftl => Box::new(FtlFormat),
            FormatType::Vb => Box::new(VbFormat),
        }
    }

    pub fn is_writable(&self) -> bool {
        !matches!(self, FormatType::Vb)
    }
}

/// Displays the registry id, e.g. `FormatType::Xliff` → `"xliff"`.
///
/// # Example
/// ```rust
/// use l10nkit::formats::FormatType;
/// assert_eq!(FormatType::Xliff.to_string(), "xliff");
/// assert_eq!(FormatType::I18next.to_string(), "i18next");
/// ```
impl Display for FormatType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Parses a format name, case-insensitively. Besides the registry ids, common aliases
/// are accepted: `yml`, `xlf`, `gettext`, `pot`, `fluent`, `webvtt`, `subrip`.
///
/// Returns [`crate::error::Error::UnknownFormat`] for unknown strings.
///
/// # Example
/// ```rust
/// use l10nkit::formats::FormatType;
/// use std::str::FromStr;
/// assert_eq!(FormatType::from_str("yml").unwrap(), FormatType::Yaml);
/// assert_eq!(FormatType::from_str("Gettext").unwrap(), FormatType::Po);
/// assert!(FormatType::from_str("strings").is_err());
/// ```
impl FromStr for FormatType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('.').to_ascii_lowercase();
        match s.as_str() {
            "i18next" | "i18n.json" => Ok(FormatType::I18next),
            "json" => Ok(FormatType::Json),
            "yaml" | "yml" => Ok(FormatType::Yaml),
            "resx" => Ok(FormatType::Resx),
            "po" | "pot" | "gettext" => Ok(FormatType::Po),
            "xliff" | "xlf" => Ok(FormatType::Xliff),
            "srt" | "subrip" => Ok(FormatType::Srt),
            "vtt" | "webvtt" => Ok(FormatType::Vtt),
            "csv" => Ok(FormatType::Csv),
            "ftl" | "fluent" => Ok(FormatType::Ftl),
            "vb" => Ok(FormatType::Vb),
            other => Err(Error::UnknownFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_type_display() {
        assert_eq!(FormatType::Json.to_string(), "json");
        assert_eq!(FormatType::Po.to_string(), "po");
        assert_eq!(FormatType::Vb.to_string(), "vb");
    }

    #[test]
    fn test_format_type_from_str() {
        assert_eq!(FormatType::from_str("JSON").unwrap(), FormatType::Json);
        assert_eq!(FormatType::from_str(" yml ").unwrap(), FormatType::Yaml);
        assert_eq!(FormatType::from_str(".xlf").unwrap(), FormatType::Xliff);
        assert_eq!(FormatType::from_str("fluent").unwrap(), FormatType::Ftl);
        assert!(matches!(
            FormatType::from_str("foobar"),
            Err(Error::UnknownFormat(ref s)) if s == "foobar"
        ));
        assert!(FormatType::from_str("").is_err());
    }

    #[test]
    fn test_ids_match_handlers() {
        for format in FormatType::ALL {
            let handler = format.handler();
            assert_eq!(handler.format_id(), format.id());
            assert_eq!(handler.is_writable(), format.is_writable());
            assert_eq!(FormatType::from_str(format.id()).unwrap(), format);
        }
    }

    #[test]
    fn test_extension_is_handled() {
        for format in FormatType::ALL {
            let name = format!("messages.en.{}", format.extension());
            assert!(
                format.handler().can_handle(std::path::Path::new(&name)),
                "{} should handle {}",
                format,
                name
            );
        }
    }
}
