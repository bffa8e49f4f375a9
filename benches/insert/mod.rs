use countdown_tree::CountdownTree;
use criterion::{measurement::Measurement, BenchmarkGroup, BenchmarkId, Criterion, Throughput};

use crate::Lfsr;

#[derive(Debug, Clone, Copy)]
enum Order {
    Random,
    Ascending,
}

pub(super) fn bench(c: &mut Criterion) {
    let mut g = c.benchmark_group("insert");

    for n_values in [1, 100, 1_000, 10_000] {
        bench_param(&mut g, n_values, Order::Random);
        bench_param(&mut g, n_values, Order::Ascending);
    }
}

/// Measure the time needed to insert `n_values` keys into an empty tree.
///
/// Ascending keys grow a chain between rebalance passes, which is the worst
/// case for the descent.
fn bench_param<M>(g: &mut BenchmarkGroup<'_, M>, n_values: usize, order: Order)
where
    M: Measurement,
{
    g.throughput(Throughput::Elements(n_values as _)); // Keys inserted per second
    g.bench_function(BenchmarkId::new(format!("{order:?}"), n_values), |b| {
        b.iter_batched(
            || (CountdownTree::new(), Lfsr::default()),
            |(mut t, mut rand)| {
                for i in 0..n_values {
                    let key = match order {
                        Order::Random => rand.next(),
                        Order::Ascending => i as u16,
                    };
                    t.insert(key);
                }
                t
            },
            criterion::BatchSize::PerIteration,
        );
    });
}
