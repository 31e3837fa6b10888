//! Symbol interning benchmarks.
//!
//! Run with: `cargo bench --bench symbol_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use slc_util::symbol::Interner;

fn bench_intern(c: &mut Criterion) {
    let mut group = c.benchmark_group("intern");
    group.throughput(Throughput::Elements(1));

    group.bench_function("intern_new_string", |b| {
        let interner = Interner::new();
        let mut counter = 0u64;
        b.iter(|| {
            counter += 1;
            black_box(interner.intern(&format!("new_string_{counter}")))
        })
    });

    group.bench_function("intern_existing_string", |b| {
        let interner = Interner::new();
        let _kept = interner.intern("existing_string");
        b.iter(|| black_box(interner.intern("existing_string")))
    });

    group.finish();
}

fn bench_comparison(c: &mut Criterion) {
    let interner = Interner::new();
    let a = interner.intern("hello");
    let b = interner.intern("hello");
    let w = interner.intern("world");

    c.bench_function("symbol_eq", |bencher| {
        bencher.iter(|| {
            black_box(a == b);
            black_box(a == w);
        })
    });
}

fn bench_release(c: &mut Criterion) {
    let mut group = c.benchmark_group("release_unused");
    for size in [16usize, 256, 4096] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |bencher, &size| {
            bencher.iter(|| {
                let interner = Interner::new();
                for i in 0..size {
                    let _ = interner.intern(&format!("sym_{i}"));
                }
                interner.release_unused();
                black_box(interner.len())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_intern, bench_comparison, bench_release);
criterion_main!(benches);
