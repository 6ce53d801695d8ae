// Criterion benchmarks for Stable Rematch

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use stable_rematch::core::{deferred_acceptance, IncrementalUpdater, PreferenceSnapshot};
use stable_rematch::models::{ParticipantId, Role};
use std::collections::BTreeMap;

type Lists = BTreeMap<ParticipantId, Vec<ParticipantId>>;

fn id(prefix: &str, i: usize) -> ParticipantId {
    ParticipantId::new(format!("{}{:05}", prefix, i))
}

/// Rotated lists so that first choices collide and proposals chain
fn rotated(own: &str, other: &str, n: usize, stride: usize) -> Lists {
    (0..n)
        .map(|i| {
            let order = (0..n).map(|k| id(other, (i * stride + k) % n)).collect();
            (id(own, i), order)
        })
        .collect()
}

fn snapshot(n: usize) -> (Lists, Lists) {
    (rotated("m", "w", n, 3), rotated("w", "m", n, 7))
}

/// Swap the top two choices of every `every`-th man
fn edit_men(men: &Lists, every: usize) -> Lists {
    men.iter()
        .enumerate()
        .map(|(i, (man, order))| {
            let mut order = order.clone();
            if i % every == 0 && order.len() > 1 {
                order.swap(0, 1);
            }
            (man.clone(), order)
        })
        .collect()
}

fn bench_rounds(c: &mut Criterion) {
    let mut group = c.benchmark_group("rounds");

    for size in [50usize, 200, 500].iter() {
        let (men, women) = snapshot(*size);
        let previous = PreferenceSnapshot::new(men.clone(), women.clone()).unwrap();
        let current = PreferenceSnapshot::new(edit_men(&men, 50), women).unwrap();
        let baseline = deferred_acceptance(&previous, Role::Man).unwrap();
        let updater = IncrementalUpdater::new();

        group.bench_with_input(BenchmarkId::new("incremental", size), size, |b, _| {
            b.iter(|| {
                updater
                    .update(black_box(&previous), black_box(&current), black_box(&baseline))
                    .unwrap()
            });
        });

        group.bench_with_input(BenchmarkId::new("recompute", size), size, |b, _| {
            b.iter(|| deferred_acceptance(black_box(&current), Role::Man).unwrap());
        });
    }

    group.finish();
}

fn bench_unchanged_round(c: &mut Criterion) {
    let (men, women) = snapshot(500);
    let preferences = PreferenceSnapshot::new(men, women).unwrap();
    let baseline = deferred_acceptance(&preferences, Role::Man).unwrap();
    let updater = IncrementalUpdater::new();

    c.bench_function("unchanged_round_500", |b| {
        b.iter(|| {
            updater
                .update(black_box(&preferences), black_box(&preferences), black_box(&baseline))
                .unwrap()
        });
    });
}

criterion_group!(benches, bench_rounds, bench_unchanged_round);

criterion_main!(benches);
