pub mod cli;
pub mod compress;
pub mod constants;
pub mod converter;
pub mod coordinator;
pub mod error;
pub mod formats;
pub mod logger;
pub mod paths;
pub mod walker;

pub use cli::{normalize_legacy_flags, Args, Backend, Config, Mode};
pub use compress::{compress, compress_file, validate_input_filename, Job};
pub use converter::{Converter, MagickConverter, NativeConverter};
pub use coordinator::{BatchSummary, JobReport, TaskCoordinator};
pub use error::{CompressionError, Result};
pub use formats::{split_filename, ImageKind};
pub use paths::{output_directory, reserve_output_path, resolve_output_path};
pub use walker::{walk, WalkStats};
