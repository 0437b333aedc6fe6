//! Criterion benchmarks for pooled buffer churn versus plain `Vec` allocation.

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use bytebuf::BufferPool;
use bytepool::SizeClassPool;

fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

fn bench_churn(c: &mut Criterion) {
    let pool = Arc::new(BufferPool::new(Arc::new(SizeClassPool::new(2, 64 * 1024))));
    let sizes: Vec<usize> = vec![64, 1_024, 16_384];

    let mut group = c.benchmark_group("PooledBuffer");
    for &len in &sizes {
        let data = payload(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &data, |b, data| {
            b.iter(|| {
                let mut buf = pool.get();
                buf.write_bytes(data);
                buf.release()
            });
        });
    }
    group.finish();

    let mut group = c.benchmark_group("VecBuffer");
    for &len in &sizes {
        let data = payload(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &data, |b, data| {
            b.iter(|| {
                let mut buf = Vec::with_capacity(64);
                buf.extend_from_slice(data);
                buf
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_churn);
criterion_main!(benches);
