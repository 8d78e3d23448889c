//! Conversion backends.
//!
//! The batch pipeline only needs "turn this file into that file at quality N".
//! [`MagickConverter`] shells out to ImageMagick; [`NativeConverter`] does the
//! same in-process with the `image` and `oxipng` crates.

use crate::constants::{
    DEFAULT_MAGICK_BINARY, HIGH_COMPRESSION_QUALITY_THRESHOLD, LIBDEFLATER_HIGH_LEVEL,
    LIBDEFLATER_LOW_LEVEL, MAGICK_QUALITY_FLAG, MAGICK_SUBCOMMAND, MAX_QUALITY, MIN_QUALITY,
    ZOPFLI_ITERATIONS, ZOPFLI_QUALITY_THRESHOLD,
};
use crate::error::{CompressionError, Result};
use crate::formats::ImageKind;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageReader};
use oxipng::{Deflaters, Options};
use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Write};
use std::num::NonZeroU8;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Something that can re-encode one image file into another.
///
/// Implementations must overwrite `output` if it already exists; the
/// invoker hands them a freshly reserved, empty placeholder.
pub trait Converter: Send + Sync {
    /// Short name used in log messages
    fn name(&self) -> &str;

    /// Convert `input` into `output` at `quality`, blocking until done.
    fn convert(&self, input: &Path, output: &Path, quality: i32) -> Result<()>;
}

/// Runs `magick convert <input> -quality <n> <output>`.
#[derive(Debug, Clone)]
pub struct MagickConverter {
    program: PathBuf,
}

impl MagickConverter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Builds the invocation without running it.
    pub fn command(&self, input: &Path, output: &Path, quality: i32) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(MAGICK_SUBCOMMAND)
            .arg(input)
            .arg(MAGICK_QUALITY_FLAG)
            .arg(quality.to_string())
            .arg(output);
        cmd
    }
}

impl Default for MagickConverter {
    fn default() -> Self {
        Self::new(DEFAULT_MAGICK_BINARY)
    }
}

impl Converter for MagickConverter {
    fn name(&self) -> &str {
        "magick"
    }

    fn convert(&self, input: &Path, output: &Path, quality: i32) -> Result<()> {
        let program = self.program.display().to_string();
        log::debug!("Running {} {} {:?} -quality {} {:?}", program, MAGICK_SUBCOMMAND, input, quality, output);

        let result = self
            .command(input, output, quality)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| CompressionError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !result.status.success() {
            return Err(CompressionError::ExternalProcess {
                program,
                status: result.status,
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// In-process backend: JPEG re-encoding via `image`, PNG optimisation via `oxipng`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeConverter;

impl NativeConverter {
    fn png_options(quality: i32) -> Options {
        let mut options = Options::from_preset(4);
        options.force = true;
        options.deflate = if quality >= ZOPFLI_QUALITY_THRESHOLD {
            Deflaters::Zopfli {
                iterations: NonZeroU8::new(ZOPFLI_ITERATIONS).unwrap_or(NonZeroU8::MIN),
            }
        } else if quality >= HIGH_COMPRESSION_QUALITY_THRESHOLD {
            Deflaters::Libdeflater {
                compression: LIBDEFLATER_HIGH_LEVEL,
            }
        } else {
            Deflaters::Libdeflater {
                compression: LIBDEFLATER_LOW_LEVEL,
            }
        };
        options
    }

    fn write_jpeg(img: &DynamicImage, output: &Path, quality: i32) -> Result<()> {
        // The JPEG encoder only understands 1..=100.
        let quality = quality.clamp(MIN_QUALITY, MAX_QUALITY) as u8;
        let mut writer = BufWriter::new(File::create(output)?);
        let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
        DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?;
        writer.flush()?;
        Ok(())
    }

    fn write_png(img: &DynamicImage, output: &Path, quality: i32) -> Result<()> {
        let mut encoded = Vec::new();
        img.write_to(&mut Cursor::new(&mut encoded), image::ImageFormat::Png)?;
        let optimized = oxipng::optimize_from_memory(&encoded, &Self::png_options(quality))
            .map_err(|e| CompressionError::PngOptimization(e.to_string()))?;
        fs::write(output, optimized)?;
        Ok(())
    }
}

impl Converter for NativeConverter {
    fn name(&self) -> &str {
        "native"
    }

    fn convert(&self, input: &Path, output: &Path, quality: i32) -> Result<()> {
        let img = ImageReader::open(input)?.with_guessed_format()?.decode()?;

        let output_name = output
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| CompressionError::InvalidFilename(output.display().to_string()))?;

        match ImageKind::from_filename(output_name)? {
            ImageKind::Jpeg => Self::write_jpeg(&img, output, quality),
            ImageKind::Png => Self::write_png(&img, output, quality),
        }
    }
}
