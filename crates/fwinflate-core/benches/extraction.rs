//! Benchmarks for fwinflate-core extraction throughput.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::Cursor;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use fwinflate_core::ExtractionConfig;
use fwinflate_core::ExtractionState;
use fwinflate_core::Extractor;
use fwinflate_core::extract_archive;
use tempfile::TempDir;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;
use zip::write::ZipWriter;

fn write_zip(
    dir: &Path,
    name: &str,
    method: CompressionMethod,
    entries: &[(String, Vec<u8>)],
) -> PathBuf {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(method);

    for (name, data) in entries {
        zip.start_file(name.as_str(), options).unwrap();
        zip.write_all(data).unwrap();
    }

    let path = dir.join(name);
    std::fs::write(&path, zip.finish().unwrap().into_inner()).unwrap();
    path
}

/// Many small files spread over a shallow tree, like a restore bundle's
/// firmware directory.
fn many_small_files(file_count: usize) -> Vec<(String, Vec<u8>)> {
    (0..file_count)
        .map(|i| {
            (
                format!("Firmware/dir{:02}/file{i:04}.img4", i % 16),
                format!("content{i}").into_bytes(),
            )
        })
        .collect()
}

fn benchmark_many_small_files(c: &mut Criterion) {
    let mut group = c.benchmark_group("many_small_files");
    let fixtures = TempDir::new().unwrap();

    for file_count in [100, 1000] {
        let archive = write_zip(
            fixtures.path(),
            &format!("small-{file_count}.zip"),
            CompressionMethod::Stored,
            &many_small_files(file_count),
        );
        group.throughput(Throughput::Elements(file_count as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(file_count),
            &archive,
            |b, archive| {
                b.iter(|| {
                    let temp = TempDir::new().unwrap();
                    extract_archive(archive, temp.path(), &ExtractionConfig::default()).unwrap();
                });
            },
        );
    }

    group.finish();
}

fn benchmark_compression_methods(c: &mut Criterion) {
    let mut group = c.benchmark_group("compression_methods");
    let fixtures = TempDir::new().unwrap();

    let size_bytes = 10 * 1024 * 1024;
    group.throughput(Throughput::Bytes(size_bytes as u64));
    let entries = vec![("kernelcache.release".to_string(), vec![0xAB_u8; size_bytes])];

    for (label, method) in [
        ("stored", CompressionMethod::Stored),
        ("deflate", CompressionMethod::Deflated),
    ] {
        let archive = write_zip(fixtures.path(), &format!("{label}.zip"), method, &entries);
        group.bench_with_input(BenchmarkId::new("method", label), &archive, |b, archive| {
            b.iter(|| {
                let temp = TempDir::new().unwrap();
                extract_archive(archive, temp.path(), &ExtractionConfig::default()).unwrap();
            });
        });
    }

    group.finish();
}

fn benchmark_staged_vs_direct(c: &mut Criterion) {
    let mut group = c.benchmark_group("staged_vs_direct");
    let fixtures = TempDir::new().unwrap();
    let archive = write_zip(
        fixtures.path(),
        "bundle.zip",
        CompressionMethod::Stored,
        &many_small_files(500),
    );

    for staged in [false, true] {
        let config = ExtractionConfig::default().with_staged(staged);
        let label = if staged { "staged" } else { "direct" };
        group.bench_with_input(BenchmarkId::from_parameter(label), &config, |b, config| {
            b.iter(|| {
                let temp = TempDir::new().unwrap();
                extract_archive(&archive, temp.path(), config).unwrap();
            });
        });
    }

    group.finish();
}

/// Overhead of the worker thread and outcome handoff on a tiny archive.
fn benchmark_background_handoff(c: &mut Criterion) {
    let fixtures = TempDir::new().unwrap();
    let archive = write_zip(
        fixtures.path(),
        "tiny.zip",
        CompressionMethod::Stored,
        &[("a.txt".to_string(), b"hello".to_vec())],
    );

    c.bench_function("background_handoff", |b| {
        b.iter(|| {
            let temp = TempDir::new().unwrap();
            let mut extractor = Extractor::new(&archive, temp.path());
            extractor.begin_extraction().unwrap();
            assert_eq!(extractor.wait(), ExtractionState::Succeeded);
        });
    });
}

criterion_group!(
    benches,
    benchmark_many_small_files,
    benchmark_compression_methods,
    benchmark_staged_vs_direct,
    benchmark_background_handoff
);
criterion_main!(benches);
