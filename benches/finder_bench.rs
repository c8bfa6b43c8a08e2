//! Benchmarks for recursive file discovery.

use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use pg_collector::collectors::find_files;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Build a tree shaped like a PostgreSQL home: `width` directories per
/// level, `depth` levels, a log and a conf file in each directory.
fn create_tree(root: &Path, width: usize, depth: usize) {
    if depth == 0 {
        return;
    }
    for i in 0..width {
        let dir = root.join(format!("dir{}", i));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("postgresql.log"), b"LOG").unwrap();
        fs::write(dir.join("postgresql.conf"), b"port = 5432").unwrap();
        create_tree(&dir, width, depth - 1);
    }
}

/// Benchmark unbounded versus depth-bounded searches
fn bench_find_files(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_files");
    let temp_dir = TempDir::new().unwrap();
    create_tree(temp_dir.path(), 4, 4);

    for max_depth in [None, Some(1), Some(2), Some(3)] {
        let label = max_depth.map_or("unbounded".to_string(), |d| format!("depth_{}", d));
        group.bench_with_input(
            BenchmarkId::new("logs", label),
            &max_depth,
            |b, max_depth| {
                b.iter(|| {
                    find_files("*.log", black_box(temp_dir.path()), *max_depth, None)
                        .unwrap()
                        .count()
                });
            },
        );
    }

    group.finish();
}

/// Benchmark the per-directory path filter
fn bench_path_pattern(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    create_tree(temp_dir.path(), 4, 4);
    let pattern = format!("{}/dir1*", temp_dir.path().display());

    c.bench_function("find_files_path_pattern", |b| {
        b.iter(|| {
            find_files("*.conf", black_box(temp_dir.path()), None, Some(pattern.as_str()))
                .unwrap()
                .count()
        });
    });
}

criterion_group!(benches, bench_find_files, bench_path_pattern);
criterion_main!(benches);
