//! Reader and writer benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::io::Write;
use unistore_bench::utils::random_data;
use unistore_core::{EncryptionKey, EncryptionLayer, Operator};
use unistore_storage::MemoryBackend;

const OBJECT_SIZE: usize = 4 * 1024 * 1024;

/// Benchmark a full read through the reader at several chunk sizes.
fn bench_reader_chunk_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("reader_chunk_size");
    group.throughput(Throughput::Bytes(OBJECT_SIZE as u64));
    let data = random_data(OBJECT_SIZE);

    for chunk in [16 * 1024, 256 * 1024, 1024 * 1024].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(chunk), chunk, |b, &chunk| {
            let op = Operator::builder(MemoryBackend::new())
                .chunk_size(chunk)
                .finish();
            op.write("obj", data.clone()).unwrap();
            let mut buf = vec![0u8; 64 * 1024];

            b.iter(|| {
                let mut reader = op.reader("obj").unwrap();
                let mut total = 0;
                loop {
                    let n = reader.read(&mut buf).unwrap();
                    if n == 0 {
                        break;
                    }
                    total += n;
                }
                black_box(total)
            });
        });
    }

    group.finish();
}

/// Benchmark buffered writes in parts of several sizes.
fn bench_writer_parts(c: &mut Criterion) {
    let mut group = c.benchmark_group("writer_parts");
    group.throughput(Throughput::Bytes(OBJECT_SIZE as u64));
    let data = random_data(OBJECT_SIZE);

    for part in [4 * 1024, 64 * 1024, 1024 * 1024].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(part), part, |b, &part| {
            let op = Operator::new("memory", [("root", "/bench")]).unwrap();
            b.iter(|| {
                let mut writer = op.writer("obj").unwrap();
                for chunk in data.chunks(part) {
                    writer.write_all(black_box(chunk)).unwrap();
                }
                writer.close().unwrap()
            });
        });
    }

    group.finish();
}

/// Cost of the encryption layer on a whole-object round trip.
fn bench_encryption(c: &mut Criterion) {
    let mut group = c.benchmark_group("encryption_round_trip");
    let data = random_data(1024 * 1024);
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("plain", |b| {
        let op = Operator::builder(MemoryBackend::new()).finish();
        b.iter(|| {
            op.write("obj", data.clone()).unwrap();
            black_box(op.read("obj").unwrap())
        });
    });

    group.bench_function("encrypted", |b| {
        let op = Operator::builder(MemoryBackend::new())
            .layer(EncryptionLayer::new(EncryptionKey::generate()))
            .finish();
        b.iter(|| {
            op.write("obj", data.clone()).unwrap();
            black_box(op.read("obj").unwrap())
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_reader_chunk_size,
    bench_writer_parts,
    bench_encryption
);
criterion_main!(benches);
