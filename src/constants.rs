pub const DEFAULT_QUALITY: i32 = 80;
pub const MIN_QUALITY: i32 = 1;
pub const MAX_QUALITY: i32 = 100;

pub const DEFAULT_MAGICK_BINARY: &str = "magick";
pub const MAGICK_BINARY_ENV: &str = "MAGICK_BINARY";
pub const MAGICK_SUBCOMMAND: &str = "convert";
pub const MAGICK_QUALITY_FLAG: &str = "-quality";

/// Inserted between the stem and the counter when an output name is taken.
pub const COLLISION_SUFFIX: &str = "_out_";

pub const ZOPFLI_ITERATIONS: u8 = 15;
pub const LIBDEFLATER_HIGH_LEVEL: u8 = 12;
pub const LIBDEFLATER_LOW_LEVEL: u8 = 8;
pub const ZOPFLI_QUALITY_THRESHOLD: i32 = 90;
pub const HIGH_COMPRESSION_QUALITY_THRESHOLD: i32 = 70;

// Console message prefixes
pub const WELCOME_BANNER: &str = "🗜️  magick-squeeze: batch image compression powered by ImageMagick";
pub const START_PREFIX: &str = "🚀";
pub const SUCCESS_PREFIX: &str = "✅";
pub const WARNING_PREFIX: &str = "⚠️";
pub const ERROR_PREFIX: &str = "❌";
pub const INFO_PREFIX: &str = "📋";
pub const SUMMARY_PREFIX: &str = "📊";
