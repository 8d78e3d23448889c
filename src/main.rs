use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use magick_squeeze::cli::{normalize_legacy_flags, Args, Config, Mode};
use magick_squeeze::constants::{INFO_PREFIX, SUCCESS_PREFIX, WARNING_PREFIX, WELCOME_BANNER};
use magick_squeeze::{compress, logger, walk, Job, TaskCoordinator};
use std::path::Path;
use std::time::Instant;

fn main() -> Result<()> {
    let args = Args::parse_from(normalize_legacy_flags(std::env::args_os()));
    let config = Config::from(args);
    logger::init(config.log_level);

    log::info!("{}", WELCOME_BANNER);
    if !config.quality_in_range() {
        log::warn!(
            "{}  Quality {} is outside 1-100; passing it to the converter unchanged",
            WARNING_PREFIX,
            config.quality
        );
    }

    match config.mode() {
        Mode::Guidance => show_guidance(),
        Mode::SingleFile(job) => compress_single(&config, &job),
        Mode::Directory(root) => compress_directory(&config, root),
    }
}

fn show_guidance() -> Result<()> {
    println!("Either -inputDir or -inputFile must be given.\n");
    Args::command().print_help()?;
    Ok(())
}

fn compress_single(config: &Config, job: &Job) -> Result<()> {
    let converter = config.converter();
    let output = compress(job, converter.as_ref())
        .with_context(|| format!("Failed to compress {:?}", job.input_path()))?;

    log::info!("{} Compressed: {:?} -> {:?}", SUCCESS_PREFIX, job.input_path(), output);
    Ok(())
}

fn compress_directory(config: &Config, root: &Path) -> Result<()> {
    let start_time = Instant::now();
    let coordinator = TaskCoordinator::new(config.jobs, config.converter())
        .context("Failed to start compression workers")?;

    log::info!(
        "{} Compressing {:?} with {} worker(s) using {:?}",
        INFO_PREFIX,
        root,
        coordinator.workers(),
        config.backend
    );

    let stats = walk(root, &coordinator, config.output_dir.as_deref(), config.quality);
    log::debug!(
        "Walk finished: {} file(s) dispatched, {} unreadable director(ies)",
        stats.dispatched,
        stats.listing_failures
    );

    let summary = coordinator.wait_all();
    log::info!("\n{}", summary);
    log::info!("  ⏱️  Total time: {:.2?}", start_time.elapsed());
    log::info!("🎉 All done: every file has been processed");

    Ok(())
}
