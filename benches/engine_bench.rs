//! LSMSIM - Performance Benchmarks
//! Measures throughput of core engine operations using Criterion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use lsmsim::config::Config;
use lsmsim::engine::memtable::MemTable;
use lsmsim::engine::wal::{WalOp, WalRecord};
use lsmsim::engine::Engine;
use lsmsim::types::Entry;

fn bench_memtable_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("memtable");

    group.bench_function("insert_1000", |b| {
        b.iter(|| {
            let mut table = MemTable::new();
            for i in 0..1000u64 {
                let key = format!("key_{:06}", i);
                table.insert(black_box(key), Entry::put(format!("value_{:06}", i), i));
            }
        });
    });

    group.bench_function("get_hit", |b| {
        let mut table = MemTable::new();
        for i in 0..1000u64 {
            table.insert(format!("key_{:06}", i), Entry::put(format!("value_{:06}", i), i));
        }
        b.iter(|| {
            black_box(table.get("key_000500"));
        });
    });

    group.finish();
}

fn bench_wal_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("wal");

    let record = WalRecord {
        id: 1,
        key: "key_000001".into(),
        value: Some("value_000001".into()),
        timestamp: 1,
        operation: WalOp::Write,
    };
    let frame = match record.encode() {
        Ok(frame) => frame,
        Err(err) => panic!("bench record rejected: {}", err),
    };

    group.bench_function("encode", |b| {
        b.iter(|| black_box(record.encode()));
    });

    group.bench_function("decode", |b| {
        b.iter(|| black_box(WalRecord::decode(&frame)));
    });

    group.finish();
}

fn bench_engine_e2e(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_e2e");

    for size in [100, 500, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("write_read_cycle", size), size, |b, &size| {
            b.iter(|| {
                let config = Config::default().with_memtable_limit(16);
                let mut engine = match Engine::new(config) {
                    Ok(engine) => engine,
                    Err(err) => panic!("bench config rejected: {}", err),
                };

                for i in 0..size {
                    engine.write(format!("key_{:06}", i), format!("value_{:06}", i));
                }

                for i in 0..size {
                    black_box(engine.read(&format!("key_{:06}", i)));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_memtable_operations,
    bench_wal_frames,
    bench_engine_e2e
);
criterion_main!(benches);
