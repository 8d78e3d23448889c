use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use magick_squeeze::{resolve_output_path, split_filename, validate_input_filename};
use std::fs::File;
use tempfile::TempDir;

/// An output directory where `photo.jpg` and its first `taken` suffixes already exist.
fn crowded_output_dir(taken: usize) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    File::create(temp_dir.path().join("photo.jpg")).unwrap();
    for n in 1..=taken {
        File::create(temp_dir.path().join(format!("photo_out_{}.jpg", n))).unwrap();
    }
    temp_dir
}

fn bench_filename_validation(c: &mut Criterion) {
    c.bench_function("validate_input_filename", |b| {
        b.iter(|| validate_input_filename(black_box("holiday.2024.JPEG")))
    });

    c.bench_function("split_filename", |b| {
        b.iter(|| split_filename(black_box("holiday.2024.JPEG")))
    });
}

fn bench_collision_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_output_path");

    for taken in [0usize, 10, 100] {
        let dir = crowded_output_dir(taken);
        group.bench_with_input(BenchmarkId::from_parameter(taken), &taken, |b, _| {
            b.iter(|| resolve_output_path(Some(dir.path()), black_box("photo.jpg")).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_filename_validation, bench_collision_resolution);
criterion_main!(benches);
