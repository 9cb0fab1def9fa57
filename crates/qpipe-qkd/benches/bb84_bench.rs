//! Benchmarks for BB84 session simulation
//!
//! Run with: cargo bench -p qpipe-qkd

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qpipe_qkd::{qber_heatmap, simulate_bb84};

fn bench_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("bb84_session");

    for n in &[512usize, 4096, 32_768] {
        group.bench_with_input(BenchmarkId::new("full_attack", n), n, |b, &n| {
            b.iter(|| simulate_bb84(black_box(n), 1.0, 0.05, black_box(7)).unwrap());
        });
    }

    group.finish();
}

fn bench_heatmap(c: &mut Criterion) {
    let eve = [0.0, 0.25, 0.5, 0.75, 1.0];
    let noise = [0.0, 0.05, 0.1];
    c.bench_function("qber_heatmap_5x3", |b| {
        b.iter(|| qber_heatmap(black_box(512), &eve, &noise, 3, 1).unwrap());
    });
}

criterion_group!(benches, bench_session, bench_heatmap);
criterion_main!(benches);
