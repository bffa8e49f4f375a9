use std::num::NonZeroUsize;

use countdown_tree::{Config, CountdownTree};
use criterion::{measurement::Measurement, BenchmarkGroup, BenchmarkId, Criterion, Throughput};

use crate::Lfsr;

const N_VALUES: usize = 10_000;
const N_OPS: usize = 1_000;

pub(super) fn bench(c: &mut Criterion) {
    let mut g = c.benchmark_group("churn");

    for min_period in [1, 10, 100, 1_000] {
        bench_param(&mut g, min_period)
    }
}

/// Measure alternating removes and inserts against a tree of `N_VALUES`
/// keys, for different minimum rebalance periods.
fn bench_param<M>(g: &mut BenchmarkGroup<'_, M>, min_period: usize)
where
    M: Measurement,
{
    let period = NonZeroUsize::new(min_period).unwrap();

    // Built with the countdown out of the way, then balanced once, so the
    // setup cost does not depend on `min_period`.
    let config = Config::DEFAULT
        .with_initial_countdown(NonZeroUsize::MAX)
        .with_min_period(period);

    let mut rand = Lfsr::default();
    let keys: Vec<_> = (0..N_VALUES).map(|_| rand.next()).collect();

    g.throughput(Throughput::Elements(N_OPS as _));
    g.bench_function(BenchmarkId::new("min_period", min_period), |b| {
        b.iter_batched(
            || {
                let mut t = CountdownTree::with_config(config);
                t.extend(keys.iter().copied());
                t.rebalance();
                (t, rand.clone())
            },
            |(mut t, mut rand)| {
                for i in 0..N_OPS {
                    t.remove(&keys[i % keys.len()]);
                    t.insert(rand.next());
                }
                t
            },
            criterion::BatchSize::LargeInput,
        );
    });
}
