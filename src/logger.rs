use env_logger::{Builder, Env};
use log::LevelFilter;

/// Quiet wins over verbose; clap already rejects both together.
pub fn level_for(verbose: bool, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Installs the console logger. `RUST_LOG` overrides `level`.
///
/// Messages carry their own emoji prefixes, so timestamps, levels and
/// targets are left out.
pub fn init(level: LevelFilter) {
    let result = Builder::from_env(Env::default().default_filter_or(level.as_str()))
        .format_timestamp(None)
        .format_target(false)
        .format_level(false)
        .try_init();

    if let Err(e) = result {
        eprintln!("Warning: logger already initialised: {}", e);
    }
}
