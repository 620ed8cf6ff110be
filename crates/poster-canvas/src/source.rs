//! Image inputs: file paths, base64 payloads, or raw bytes.

use std::borrow::Cow;
use std::path::Path;

use base64::{Engine as _, engine::general_purpose};
use image::DynamicImage;
use tracing::debug;

use crate::{PosterError, Result};

/// Where the bytes of an image come from.
#[derive(Debug, Clone)]
pub enum ImageSource<'a> {
    /// A file on disk.
    File(Cow<'a, Path>),
    /// Base64 text, optionally wrapped in a `data:` URL.
    Base64(Cow<'a, str>),
    /// Already-loaded encoded bytes (PNG, JPEG, ...).
    Bytes(Cow<'a, [u8]>),
}

impl<'a> ImageSource<'a> {
    pub fn file(path: impl Into<Cow<'a, Path>>) -> Self {
        Self::File(path.into())
    }

    pub fn base64(data: impl Into<Cow<'a, str>>) -> Self {
        Self::Base64(data.into())
    }

    pub fn bytes(data: impl Into<Cow<'a, [u8]>>) -> Self {
        Self::Bytes(data.into())
    }

    /// Pick between a path and a base64 payload, the way callers holding a
    /// single string plus an "is base64" flag describe their input.
    pub fn from_str_flag(value: &'a str, is_base64: bool) -> Self {
        if is_base64 {
            Self::base64(value)
        } else {
            Self::file(Path::new(value))
        }
    }

    /// Load the encoded bytes.
    pub fn read(&self) -> Result<Cow<'_, [u8]>> {
        match self {
            Self::File(path) => std::fs::read(&**path)
                .map(Cow::Owned)
                .map_err(|source| PosterError::Io {
                    path: path.to_path_buf(),
                    source,
                }),
            Self::Base64(data) => decode_base64(data).map(Cow::Owned),
            Self::Bytes(bytes) => Ok(Cow::Borrowed(&**bytes)),
        }
    }

    /// Load and decode into a pixel buffer.
    pub fn decode(&self) -> Result<DynamicImage> {
        let bytes = self.read()?;
        let img = image::load_from_memory(&bytes).map_err(PosterError::Decode)?;
        debug!(
            source = self.kind(),
            len = bytes.len(),
            width = img.width(),
            height = img.height(),
            "Decoded image"
        );
        Ok(img)
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Base64(_) => "base64",
            Self::Bytes(_) => "bytes",
        }
    }
}

/// Decode standard base64, skipping an optional `data:...;base64,` prefix
/// and any embedded whitespace.
fn decode_base64(data: &str) -> Result<Vec<u8>> {
    let payload = match data.trim_start().strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map_or(rest, |(_, body)| body),
        None => data,
    };
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(general_purpose::STANDARD.decode(compact)?)
}
