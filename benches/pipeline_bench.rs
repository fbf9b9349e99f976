use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use tiny_squeeze::{partition, resolve, ImageFile, ResolverInput, Saving};

fn create_image_tree(files_per_dir: usize, dirs: usize) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for d in 0..dirs {
        let dir = temp_dir.path().join(format!("dir{}", d));
        fs::create_dir(&dir).unwrap();
        for i in 0..files_per_dir {
            let ext = match i % 4 {
                0 => "jpg",
                1 => "png",
                2 => "gif",
                _ => "txt",
            };
            fs::write(dir.join(format!("file{}.{}", i, ext)), b"data").unwrap();
        }
    }
    temp_dir
}

fn bench_resolve_directory(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_directory");

    for dirs in [1usize, 10, 50].iter() {
        let tree = create_image_tree(40, *dirs);
        let input = ResolverInput::new(vec![tree.path().to_string_lossy().into_owned()], true);

        group.bench_with_input(BenchmarkId::new("recursive", dirs), &input, |b, input| {
            b.iter(|| resolve(black_box(input)))
        });
    }

    group.finish();
}

fn bench_partition(c: &mut Criterion) {
    let files: Vec<ImageFile> = (0..10_000)
        .map(|i| ImageFile::new(PathBuf::from(format!("{}.jpg", i)), 1024))
        .collect();

    c.bench_function("partition_10k", |b| {
        b.iter(|| partition(black_box(&files), black_box(5)).len())
    });
}

fn bench_saving(c: &mut Criterion) {
    c.bench_function("saving_threshold", |b| {
        b.iter(|| {
            (1..1_000u64)
                .filter(|s| Saving::new(black_box(100_000), s * 100).is_worthwhile())
                .count()
        })
    });
}

criterion_group!(benches, bench_resolve_directory, bench_partition, bench_saving);
criterion_main!(benches);
