use crate::converter::Converter;
use crate::error::{CompressionError, Result};
use crate::formats::ImageKind;
use crate::paths::reserve_output_path;
use std::fs;
use std::path::{Path, PathBuf};

/// One file to compress. Built once per discovered file and consumed by
/// exactly one [`compress`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub input_dir: PathBuf,
    pub input_filename: String,
    /// `None` means the current working directory
    pub output_dir: Option<PathBuf>,
    /// `None` means "same name as the input"
    pub output_filename: Option<String>,
    pub quality: i32,
}

impl Job {
    pub fn new(input_dir: impl Into<PathBuf>, input_filename: impl Into<String>, quality: i32) -> Self {
        Self {
            input_dir: input_dir.into(),
            input_filename: input_filename.into(),
            output_dir: None,
            output_filename: None,
            quality,
        }
    }

    /// Empty values are treated as unset.
    pub fn with_output_dir(mut self, output_dir: Option<impl Into<PathBuf>>) -> Self {
        self.output_dir = output_dir
            .map(Into::into)
            .filter(|dir: &PathBuf| !dir.as_os_str().is_empty());
        self
    }

    /// Empty values are treated as unset.
    pub fn with_output_filename(mut self, output_filename: Option<impl Into<String>>) -> Self {
        self.output_filename = output_filename
            .map(Into::into)
            .filter(|name: &String| !name.is_empty());
        self
    }

    pub fn input_path(&self) -> PathBuf {
        self.input_dir.join(&self.input_filename)
    }

    fn output_filename(&self) -> &str {
        self.output_filename.as_deref().unwrap_or(&self.input_filename)
    }
}

/// Checks the input name without touching the filesystem.
///
/// Order: empty name, then missing extension separator, then unsupported extension.
pub fn validate_input_filename(filename: &str) -> Result<ImageKind> {
    if filename.is_empty() {
        return Err(CompressionError::EmptyInput);
    }
    ImageKind::from_filename(filename)
}

/// Compresses a single file.
///
/// # Returns
/// * `Ok(path)` - Where the compressed image was written
/// * `Err(CompressionError)` - Validation failure, or the converter's error verbatim
///
/// The output path is reserved before conversion. If conversion fails the
/// empty placeholder is removed again.
pub fn compress(job: &Job, converter: &dyn Converter) -> Result<PathBuf> {
    validate_input_filename(&job.input_filename)?;

    let output_path = reserve_output_path(job.output_dir.as_deref(), job.output_filename())?;
    let input_path = job.input_path();

    log::debug!(
        "Converting {:?} -> {:?} with {} at quality {}",
        input_path,
        output_path,
        converter.name(),
        job.quality
    );

    if let Err(e) = converter.convert(&input_path, &output_path, job.quality) {
        if let Err(cleanup) = fs::remove_file(&output_path) {
            log::warn!("Could not remove placeholder {:?}: {}", output_path, cleanup);
        }
        return Err(e);
    }

    Ok(output_path)
}

/// Same as [`compress`] with the flat argument list the command line uses.
/// Empty strings mean "unset".
pub fn compress_file(
    input_dir: &Path,
    input_filename: &str,
    output_dir: &Path,
    output_filename: &str,
    quality: i32,
    converter: &dyn Converter,
) -> Result<PathBuf> {
    let job = Job::new(input_dir, input_filename, quality)
        .with_output_dir(Some(output_dir))
        .with_output_filename(Some(output_filename));
    compress(&job, converter)
}
