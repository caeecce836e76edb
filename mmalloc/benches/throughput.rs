//! Allocation throughput, system allocator vs. this crate, across a mix
//! of block sizes.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use mmalloc::c_abi::{free, malloc};
use std::hint::black_box;

const SIZES: [usize; 4] = [16, 64, 256, 4096];

fn bench_system(c: &mut Criterion) {
    let mut group = c.benchmark_group("system_alloc_free");
    for size in SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut v: Vec<u8> = Vec::with_capacity(size);
                v.resize(size, 0);
                black_box(&v);
            });
        });
    }
    group.finish();
}

fn bench_mmalloc(c: &mut Criterion) {
    let mut group = c.benchmark_group("mmalloc_alloc_free");
    for size in SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| unsafe {
                let p = malloc(size);
                black_box(p);
                free(p);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_system, bench_mmalloc);
criterion_main!(benches);
