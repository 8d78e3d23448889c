use crate::compress::Job;
use crate::constants::{ERROR_PREFIX, START_PREFIX};
use crate::coordinator::TaskCoordinator;
use crate::error::CompressionError;
use crate::paths::output_directory;
use std::fs;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WalkStats {
    /// Files handed to the coordinator, images or not
    pub dispatched: usize,
    /// Directories that could not be listed; their subtrees were skipped
    pub listing_failures: usize,
}

/// Walks `root` depth-first and dispatches one compression task per file.
///
/// Every non-directory entry is dispatched, whatever its extension; files
/// that are not images fail inside their task. Directories that cannot be
/// listed are logged and skipped, as is the output directory when it sits
/// inside `root`. Nothing here waits for the tasks.
pub fn walk(
    root: &Path,
    coordinator: &TaskCoordinator,
    output_dir: Option<&Path>,
    quality: i32,
) -> WalkStats {
    let mut stats = WalkStats::default();

    // A missing root is reported by walkdir itself; a file root yields nothing.
    if fs::metadata(root).is_ok_and(|meta| !meta.is_dir()) {
        log::error!("{} {}", ERROR_PREFIX, CompressionError::NotADirectory(root.to_path_buf()));
        stats.listing_failures += 1;
        return stats;
    }

    let output_root = output_directory(output_dir)
        .ok()
        .map(|dir| fs::canonicalize(&dir).unwrap_or(dir));

    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_output_root(entry, output_root.as_deref()));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) => {
                let err = CompressionError::DirectoryListing {
                    path: source.path().unwrap_or(root).to_path_buf(),
                    source,
                };
                log::error!("{} {}", ERROR_PREFIX, err);
                stats.listing_failures += 1;
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        let input_dir = entry.path().parent().unwrap_or(root);
        match entry.file_name().to_str() {
            Some(name) => {
                log::info!("{} Start compressing: {}", START_PREFIX, name);
                let job = Job::new(input_dir, name, quality).with_output_dir(output_dir);
                coordinator.dispatch(job);
            }
            None => coordinator.record_failure(
                entry.path(),
                CompressionError::InvalidFilename(entry.file_name().to_string_lossy().into_owned()),
            ),
        }
        stats.dispatched += 1;
    }

    stats
}

fn is_output_root(entry: &DirEntry, output_root: Option<&Path>) -> bool {
    let Some(output_root) = output_root else {
        return false;
    };
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let is_match = fs::canonicalize(entry.path()).is_ok_and(|path| path == output_root);
    if is_match {
        log::debug!("Skipping output directory {:?}", entry.path());
    }
    is_match
}
