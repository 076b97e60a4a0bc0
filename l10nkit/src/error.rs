//! All error types for the l10nkit crate.
//!
//! These are returned from all fallible operations (parsing, serialization, comparison,
//! conversion, translation). Batch operations record them per item instead of aborting.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("unknown format `{0}`")]
    UnknownFormat(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("format `{0}` is read-only")]
    ReadOnlyFormat(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("CSV parse error: {0}")]
    CsvParse(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid data: {0}")]
    DataMismatch(String),

    #[error("invalid resource: {0}")]
    InvalidResource(String),

    #[error("output already exists: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("translation provider error: {0}")]
    Provider(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("validation error: {0}")]
    Validation(String),
}

impl Error {
    /// Creates a new provider error.
    pub fn provider(message: impl Into<String>) -> Self {
        Error::Provider(message.into())
    }

    /// Creates a new validation error
    pub fn validation_error(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// True for errors caused by the content of a file rather than by its absence or
    /// by the environment.
    pub fn is_malformed_content(&self) -> bool {
        matches!(
            self,
            Error::Json(_)
                | Error::Yaml(_)
                | Error::XmlParse(_)
                | Error::CsvParse(_)
                | Error::DataMismatch(_)
                | Error::InvalidResource(_)
        )
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(value: std::string::FromUtf8Error) -> Self {
        Error::DataMismatch(value.to_string())
    }
}
