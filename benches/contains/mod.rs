use countdown_tree::CountdownTree;
use criterion::{measurement::Measurement, BenchmarkGroup, BenchmarkId, Criterion, Throughput};

use crate::Lfsr;

pub(super) fn bench(c: &mut Criterion) {
    let mut g = c.benchmark_group("contains");

    for n_values in [1, 100, 1_000, 10_000] {
        bench_param(&mut g, n_values)
    }
}

/// Measure the time needed to look up a present and an absent key in a tree
/// of `n_values` random keys.
fn bench_param<M>(g: &mut BenchmarkGroup<'_, M>, n_values: usize)
where
    M: Measurement,
{
    let mut rand = Lfsr::default();
    let mut t = CountdownTree::new();

    let mut present = 0;
    for _ in 0..n_values {
        present = rand.next();
        t.insert(present);
    }
    let absent = rand.next();

    g.throughput(Throughput::Elements(1));
    g.bench_function(BenchmarkId::new("hit", n_values), |b| {
        b.iter(|| t.contains(&present));
    });
    g.bench_function(BenchmarkId::new("miss", n_values), |b| {
        b.iter(|| t.contains(&absent));
    });
}
