//! Performance benchmarks for FlatCopy
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flatcopy::core::{flatten_parallel, flatten_sync};
use std::path::Path;
use tempfile::TempDir;

/// Build `dirs` directories holding `files_per_dir` files of `size` bytes each
fn create_tree(root: &Path, dirs: usize, files_per_dir: usize, size: usize) {
    let content: Vec<u8> = (0..size).map(|i| (i % 256) as u8).collect();

    for d in 0..dirs {
        let dir = root.join(format!("group_{}", d % 4)).join(format!("dir_{}", d));
        std::fs::create_dir_all(&dir).unwrap();
        for f in 0..files_per_dir {
            std::fs::write(dir.join(format!("file_{}_{}.bin", d, f)), &content).unwrap();
        }
    }
}

fn clear_dir(dir: &Path) {
    for entry in std::fs::read_dir(dir).unwrap() {
        let _ = std::fs::remove_file(entry.unwrap().path());
    }
}

fn bench_flatten_modes(c: &mut Criterion) {
    let src_dir = TempDir::new().unwrap();
    let dst_dir = TempDir::new().unwrap();
    create_tree(src_dir.path(), 32, 16, 4 * 1024);

    let mut group = c.benchmark_group("flatten_512_files");

    group.bench_function("sync", |b| {
        b.iter(|| {
            let _ = black_box(flatten_sync(src_dir.path(), dst_dir.path()));
            clear_dir(dst_dir.path());
        });
    });

    for workers in [1, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::new("parallel", workers), &workers, |b, &workers| {
            b.iter(|| {
                let _ = black_box(flatten_parallel(src_dir.path(), dst_dir.path(), workers));
                clear_dir(dst_dir.path());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_flatten_modes);
criterion_main!(benches);
