#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub fn create_temp_directory() -> TempDir {
    TempDir::new().unwrap()
}

/// Three images and one text file spread over two nested subdirectories:
///
/// ```text
/// root/a.jpg
/// root/one/b.png
/// root/one/notes.txt
/// root/one/two/c.jpeg
/// ```
pub fn create_image_tree(root: &Path) -> Vec<PathBuf> {
    let nested = root.join("one").join("two");
    fs::create_dir_all(&nested).unwrap();

    let files = vec![
        root.join("a.jpg"),
        root.join("one").join("b.png"),
        root.join("one").join("notes.txt"),
        nested.join("c.jpeg"),
    ];
    for file in &files {
        fs::write(file, b"fake image data").unwrap();
    }
    files
}

pub fn create_test_output_directory(temp_dir: &Path) -> PathBuf {
    let output_dir = temp_dir.join("output");
    fs::create_dir(&output_dir).unwrap();
    output_dir
}

pub fn list_file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Writes a stand-in for `magick` that logs its arguments to `calls.log`
/// next to itself and then copies input (`$2`) to output (`$5`).
#[cfg(unix)]
pub fn write_fake_magick(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "fake-magick",
        "#!/bin/sh\necho \"$@\" >> \"$(dirname \"$0\")/calls.log\"\ncp \"$2\" \"$5\"\n",
    )
}

/// A `magick` that always fails with a message on stderr.
#[cfg(unix)]
pub fn write_broken_magick(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "broken-magick",
        "#!/bin/sh\necho \"convert: no decode delegate\" >&2\nexit 1\n",
    )
}

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

pub fn read_calls(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join("calls.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}
