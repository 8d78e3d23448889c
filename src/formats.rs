//! Image format sniffing.
//!
//! Formats are recognised purely by file extension. Only the formats the
//! conversion backends are expected to re-encode are accepted.

use crate::error::{CompressionError, Result};
use std::fmt;
use std::str::FromStr;

/// Image formats accepted for compression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// PNG, optimised losslessly
    Png,
    /// JPEG, re-encoded at the requested quality
    Jpeg,
}

impl ImageKind {
    /// Classify a file name by the text after its last `.`.
    pub fn from_filename(filename: &str) -> Result<Self> {
        let (_, ext) = split_filename(filename)?;
        ext.parse()
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageKind::Png => "PNG",
            ImageKind::Jpeg => "JPEG",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ImageKind {
    type Err = CompressionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "png" => Ok(ImageKind::Png),
            "jpg" | "jpeg" => Ok(ImageKind::Jpeg),
            _ => Err(CompressionError::UnsupportedFormat(format!(".{}", s))),
        }
    }
}

/// Split a file name into `(stem, extension)` at its last `.`.
///
/// The extension is returned without the dot and with its case as written.
///
/// # Errors
/// * `CompressionError::InvalidFilename` if the name has no `.`
pub fn split_filename(filename: &str) -> Result<(&str, &str)> {
    filename
        .rfind('.')
        .map(|index| (&filename[..index], &filename[index + 1..]))
        .ok_or_else(|| CompressionError::InvalidFilename(filename.to_string()))
}
