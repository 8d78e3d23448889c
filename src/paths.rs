use crate::constants::COLLISION_SUFFIX;
use crate::error::{CompressionError, Result};
use crate::formats::{split_filename, ImageKind};
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Absolute output directory, defaulting to the current working directory.
pub fn output_directory(output_dir: Option<&Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(match output_dir {
        Some(dir) if !dir.as_os_str().is_empty() => {
            if dir.is_absolute() {
                dir.to_path_buf()
            } else {
                cwd.join(dir)
            }
        }
        _ => cwd,
    })
}

/// Candidate names for one output file: `name.ext`, then `name_out_1.ext`, ...
struct OutputName<'a> {
    dir: &'a Path,
    filename: &'a str,
    stem: &'a str,
    ext: String,
}

impl<'a> OutputName<'a> {
    fn new(dir: &'a Path, filename: &'a str) -> Result<Self> {
        let (stem, ext) = split_filename(filename)?;
        ext.parse::<ImageKind>()?;
        Ok(Self {
            dir,
            filename,
            stem,
            ext: ext.to_lowercase(),
        })
    }

    fn candidate(&self, attempt: u64) -> PathBuf {
        if attempt == 0 {
            self.dir.join(self.filename)
        } else {
            self.dir.join(format!(
                "{}{}{}.{}",
                self.stem, COLLISION_SUFFIX, attempt, self.ext
            ))
        }
    }
}

/// Computes an output path that does not exist at the moment of the check.
///
/// # Arguments
/// * `output_dir` - Target directory; `None` or empty means the current working directory
/// * `filename` - Desired output file name, e.g. `photo.jpg`
///
/// # Returns
/// * `Ok(path)` - `dir/photo.jpg`, or `dir/photo_out_N.jpg` for the smallest free `N`
/// * `Err(CompressionError)` - If the name has no extension or an unsupported one
///
/// Nothing is created on disk, so a concurrent writer may still take the
/// returned name. Use [`reserve_output_path`] when that matters.
pub fn resolve_output_path(output_dir: Option<&Path>, filename: &str) -> Result<PathBuf> {
    let dir = output_directory(output_dir)?;
    let name = OutputName::new(&dir, filename)?;

    let mut attempt = 0;
    loop {
        let path = name.candidate(attempt);
        if !path.exists() {
            return Ok(path);
        }
        attempt += 1;
    }
}

/// Like [`resolve_output_path`], but claims the path by creating an empty file
/// with create-new semantics, so no two callers are handed the same name.
///
/// The output directory is created if missing. The caller owns the placeholder
/// and should remove it if the conversion meant to fill it fails.
pub fn reserve_output_path(output_dir: Option<&Path>, filename: &str) -> Result<PathBuf> {
    let dir = output_directory(output_dir)?;
    let name = OutputName::new(&dir, filename)?;
    fs::create_dir_all(&dir)?;

    let mut attempt = 0;
    loop {
        let path = name.candidate(attempt);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => {
                log::debug!("Reserved output path {:?}", path);
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(CompressionError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_free_name() {
        let temp_dir = TempDir::new().unwrap();
        let path = resolve_output_path(Some(temp_dir.path()), "photo.jpg").unwrap();
        assert_eq!(path, temp_dir.path().join("photo.jpg"));
        assert!(!path.exists());
    }

    #[test]
    fn test_resolve_collision_suffixes() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("photo.jpg")).unwrap();

        let first = resolve_output_path(Some(temp_dir.path()), "photo.jpg").unwrap();
        assert_eq!(first, temp_dir.path().join("photo_out_1.jpg"));

        File::create(&first).unwrap();
        let second = resolve_output_path(Some(temp_dir.path()), "photo.jpg").unwrap();
        assert_eq!(second, temp_dir.path().join("photo_out_2.jpg"));
        assert!(!second.exists());
    }

    #[test]
    fn test_resolve_suffix_uses_lowercase_extension() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("Shot.JPEG")).unwrap();

        let path = resolve_output_path(Some(temp_dir.path()), "Shot.JPEG").unwrap();
        assert_eq!(path, temp_dir.path().join("Shot_out_1.jpeg"));
    }

    #[test]
    fn test_resolve_rejects_bad_names() {
        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(
            resolve_output_path(Some(temp_dir.path()), "README"),
            Err(CompressionError::InvalidFilename(_))
        ));
        assert!(matches!(
            resolve_output_path(Some(temp_dir.path()), "anim.gif"),
            Err(CompressionError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_output_directory_defaults_to_cwd() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(output_directory(None).unwrap(), cwd);
        assert_eq!(output_directory(Some(Path::new(""))).unwrap(), cwd);
        assert_eq!(output_directory(Some(Path::new("out"))).unwrap(), cwd.join("out"));
    }

    #[test]
    fn test_reserve_claims_distinct_paths() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("nested").join("out");

        let first = reserve_output_path(Some(&out), "photo.png").unwrap();
        let second = reserve_output_path(Some(&out), "photo.png").unwrap();

        assert_eq!(first, out.join("photo.png"));
        assert_eq!(second, out.join("photo_out_1.png"));
        assert!(first.exists());
        assert!(second.exists());
    }

    #[test]
    fn test_reserve_concurrent_callers_never_share_a_path() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().to_path_buf();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let dir = dir.clone();
                std::thread::spawn(move || reserve_output_path(Some(&dir), "same.jpg").unwrap())
            })
            .collect();
        let mut paths: Vec<PathBuf> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        paths.sort();
        paths.dedup();

        assert_eq!(paths.len(), 8);
    }
}
