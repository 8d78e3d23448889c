use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("Input file name is empty")]
    EmptyInput,

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid file name (no extension separator): {0}")]
    InvalidFilename(String),

    #[error("Failed to list directory {path:?}: {source}")]
    DirectoryListing {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to list directory {0:?}: not a directory")]
    NotADirectory(PathBuf),

    #[error("{program} exited with {status}: {stderr}")]
    ExternalProcess {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    ImageProcessing(#[from] image::ImageError),

    #[error("PNG optimization error: {0}")]
    PngOptimization(String),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Compression task panicked: {0}")]
    TaskPanicked(String),
}

pub type Result<T> = std::result::Result<T, CompressionError>;
