//! The format-handler contract shared by every localization format.

use std::{
    fs::File,
    io::{BufWriter, Read, Write},
    path::Path,
};

use crate::{culture, error::Error, types::Resource};

/// Parses one on-disk grammar into a [`Resource`] and writes it back.
///
/// Handlers are stateless; a single instance can be shared across threads and calls.
///
/// # Example
///
/// ```rust,no_run
/// use l10nkit::{formats::JsonFormat, traits::FormatHandler};
/// let handler = JsonFormat;
/// let resource = handler.read_from("locales/en.json".as_ref())?;
/// handler.write_to(&resource, "out/en.json".as_ref())?;
/// Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait FormatHandler: Send + Sync {
    /// Registry key of this format (e.g. `json`, `resx`).
    fn format_id(&self) -> &'static str;

    /// Extensions without the leading dot. Multi-part extensions such as `i18n.json` are allowed.
    fn supported_extensions(&self) -> &'static [&'static str];

    /// Whether this handler should be used for `path`. Defaults to an extension match.
    fn can_handle(&self, path: &Path) -> bool {
        has_extension(path, self.supported_extensions())
    }

    /// Culture of the file at `path`, derived from its name.
    fn detect_culture(&self, path: &Path) -> Option<String> {
        path.file_name()
            .and_then(|n| n.to_str())
            .and_then(culture::detect_culture)
    }

    /// Parse decoded text. `path` drives culture detection and is recorded on the resource.
    fn parse(&self, content: &str, path: Option<&Path>) -> Result<Resource, Error>;

    /// Serialize `resource` into `writer`.
    fn write(&self, resource: &Resource, writer: &mut dyn Write) -> Result<(), Error>;

    /// False for handlers that can only read (their `write` always fails).
    fn is_writable(&self) -> bool {
        true
    }

    /// Parse raw bytes, honoring a UTF-8 or UTF-16 byte-order mark.
    fn parse_bytes(&self, bytes: &[u8], path: Option<&Path>) -> Result<Resource, Error> {
        self.parse(&decode_bytes(bytes), path)
    }

    /// Parse from file path.
    fn read_from(&self, path: &Path) -> Result<Resource, Error> {
        if !path.is_file() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let file = File::open(path).map_err(Error::Io)?;
        // Auto-detect BOM, decode to UTF-8; passthrough UTF-8
        let mut decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
            .bom_override(true)
            .build(file);

        let mut decoded = String::new();
        decoder.read_to_string(&mut decoded).map_err(Error::Io)?;

        self.parse(&decoded, Some(path))
    }

    /// Like [`FormatHandler::read_from`], but a missing file yields an entry-less resource.
    fn read_or_empty(&self, path: &Path) -> Result<Resource, Error> {
        match self.read_from(path) {
            Err(Error::NotFound(_)) => Ok(Resource::empty(
                path,
                self.detect_culture(path),
                self.format_id(),
            )),
            other => other,
        }
    }

    /// Serialize into a `String`.
    fn write_to_string(&self, resource: &Resource) -> Result<String, Error> {
        let mut out = Vec::new();
        self.write(resource, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    /// Write to file path, creating parent directories as needed.
    fn write_to(&self, resource: &Resource, path: &Path) -> Result<(), Error> {
        if !self.is_writable() {
            return Err(Error::ReadOnlyFormat(self.format_id().to_string()));
        }
        // Serialize first so a failing writer never truncates an existing file.
        let content = self.write_to_string(resource)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(content.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

/// Case-insensitive test of `path`'s file name against a list of extensions.
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let name = name.to_ascii_lowercase();
    extensions
        .iter()
        .any(|ext| name.ends_with(&format!(".{}", ext.to_ascii_lowercase())))
}

/// Decodes bytes to UTF-8 text, stripping and honoring a byte-order mark when present.
pub fn decode_bytes(bytes: &[u8]) -> String {
    match encoding_rs::Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => encoding
            .decode_without_bom_handling(&bytes[bom_len..])
            .0
            .into_owned(),
        None => encoding_rs::UTF_8
            .decode_without_bom_handling(bytes)
            .0
            .into_owned(),
    }
}
