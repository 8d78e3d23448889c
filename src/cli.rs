use crate::compress::Job;
use crate::constants::{DEFAULT_MAGICK_BINARY, DEFAULT_QUALITY, MAGICK_BINARY_ENV, MAX_QUALITY, MIN_QUALITY};
use crate::converter::{Converter, MagickConverter, NativeConverter};
use crate::logger;
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Long options that may also be spelled with a single dash (`-inputDir`).
const SINGLE_DASH_LONG_FLAGS: &[&str] = &["inputDir", "outputDir", "inputFile", "outputFile", "quality", "help"];

#[derive(Parser, Debug)]
#[command(
    name = "magick-squeeze",
    about = "Recursively compress PNG and JPEG images with ImageMagick",
    long_about = "magick-squeeze walks a directory tree and compresses every PNG and JPEG it finds \
                  by running `magick convert` on a bounded pool of workers. Outputs land in a single \
                  directory; existing files are never overwritten, clashing names get an _out_N suffix.",
    version,
    after_help = "EXAMPLES:\n  \
    magick-squeeze -inputDir ./photos -outputDir ./small -quality 75\n  \
    magick-squeeze -inputDir ./photos -inputFile cat.png -outputFile cat-small.png\n  \
    magick-squeeze --inputDir ./photos --backend native -j 4"
)]
pub struct Args {
    #[arg(
        long = "inputDir",
        value_name = "PATH",
        help = "Input directory",
        long_help = "Directory to compress recursively. Together with --inputFile, the directory \
                     that file is read from."
    )]
    pub input_dir: Option<PathBuf>,

    #[arg(
        long = "outputDir",
        value_name = "PATH",
        help = "Output directory (default: current directory)"
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(long = "inputFile", value_name = "NAME", help = "Compress only this file")]
    pub input_file: Option<String>,

    #[arg(
        long = "outputFile",
        value_name = "NAME",
        help = "Output file name for --inputFile (default: same as input)"
    )]
    pub output_file: Option<String>,

    #[arg(
        long,
        default_value_t = DEFAULT_QUALITY,
        allow_negative_numbers = true,
        help = "Compression quality (1-100, default: 80)",
        long_help = "Quality handed to the converter as-is. Values outside 1-100 are passed through \
                     unchanged; ImageMagick decides what they mean."
    )]
    pub quality: i32,

    #[arg(
        short = 'j',
        long,
        help = "Number of parallel workers (default: auto)",
        long_help = "Maximum number of conversions running at once. \
                     If not specified, uses the number of CPU cores."
    )]
    pub jobs: Option<usize>,

    #[arg(
        long,
        value_name = "PATH",
        env = MAGICK_BINARY_ENV,
        default_value = DEFAULT_MAGICK_BINARY,
        help = "ImageMagick executable to run"
    )]
    pub magick: PathBuf,

    #[arg(long, value_enum, default_value_t = Backend::Magick, help = "Conversion backend")]
    pub backend: Backend,

    #[arg(short, long, conflicts_with = "quiet", help = "Show debug output")]
    pub verbose: bool,

    #[arg(short, long, help = "Only show errors")]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Run the external `magick` program
    Magick,
    /// Re-encode in-process
    Native,
}

/// Rewrites `-inputDir x` / `-quality=90` style flags to their `--` form.
///
/// Everything after a bare `--` is left alone.
pub fn normalize_legacy_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if passthrough {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                passthrough = true;
                return arg;
            }
            match text.strip_prefix('-') {
                Some(rest) if !rest.starts_with('-') => {
                    let name = rest.split('=').next().unwrap_or(rest);
                    if SINGLE_DASH_LONG_FLAGS.contains(&name) {
                        OsString::from(format!("-{}", text))
                    } else {
                        arg
                    }
                }
                _ => arg,
            }
        })
        .collect()
}

/// Run settings, fixed at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub input_file: Option<String>,
    pub output_file: Option<String>,
    pub quality: i32,
    pub jobs: usize,
    pub magick: PathBuf,
    pub backend: Backend,
    pub log_level: LevelFilter,
}

/// What a run will do, decided from which inputs were given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode<'a> {
    /// Neither an input directory nor an input file
    Guidance,
    SingleFile(Job),
    Directory(&'a Path),
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            input_dir: args.input_dir.filter(|p| !p.as_os_str().is_empty()),
            output_dir: args.output_dir.filter(|p| !p.as_os_str().is_empty()),
            input_file: args.input_file.filter(|s| !s.is_empty()),
            output_file: args.output_file.filter(|s| !s.is_empty()),
            quality: args.quality,
            jobs: args.jobs.filter(|&n| n > 0).unwrap_or_else(num_cpus::get),
            magick: args.magick,
            backend: args.backend,
            log_level: logger::level_for(args.verbose, args.quiet),
        }
    }
}

impl Config {
    pub fn mode(&self) -> Mode<'_> {
        match (&self.input_dir, &self.input_file) {
            (None, None) => Mode::Guidance,
            (dir, Some(file)) => {
                // `-inputFile sub/a.jpg` reads from `<inputDir>/sub` and names the output `a.jpg`.
                let file_path = Path::new(file);
                let mut input_dir = dir.clone().unwrap_or_default();
                if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    input_dir.push(parent);
                }
                let name = file_path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .unwrap_or(file.as_str());

                Mode::SingleFile(
                    Job::new(input_dir, name, self.quality)
                        .with_output_dir(self.output_dir.as_deref())
                        .with_output_filename(self.output_file.as_deref()),
                )
            }
            (Some(dir), None) => Mode::Directory(dir),
        }
    }

    pub fn quality_in_range(&self) -> bool {
        (MIN_QUALITY..=MAX_QUALITY).contains(&self.quality)
    }

    pub fn converter(&self) -> Arc<dyn Converter> {
        match self.backend {
            Backend::Magick => Arc::new(MagickConverter::new(&self.magick)),
            Backend::Native => Arc::new(NativeConverter),
        }
    }
}
