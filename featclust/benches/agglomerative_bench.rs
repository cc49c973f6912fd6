use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use featclust::{
    Agglomerative, Clusterer, FeatureVector, Field, KRange, Metric, VectorDistance, silhouette,
    sweep,
};

const RATINGS: [&str; 4] = ["G", "PG", "PG-13", "R"];

fn next(state: &mut u64) -> u64 {
    *state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
    *state >> 33
}

/// Movie-like items: one scalar rating plus two token sets drawn from
/// per-theme vocabularies.
fn make_items(n: usize, seed: u64) -> Vec<FeatureVector> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            let theme = next(&mut state) % 6;
            let rating = RATINGS[(next(&mut state) % 4) as usize];
            let words: Vec<String> = (0..5)
                .map(|_| format!("t{theme}w{}", next(&mut state) % 12))
                .collect();
            let cast: Vec<String> = (0..3)
                .map(|_| format!("actor{}", next(&mut state) % 40))
                .collect();
            FeatureVector::new(vec![
                Field::scalar(rating),
                Field::SetOfText(words),
                Field::SetOfText(cast),
            ])
        })
        .collect()
}

fn bench_vector_distance(c: &mut Criterion) {
    let items = make_items(2, 7);
    let metric = VectorDistance::default();
    c.bench_function("vector_distance_3fields", |b| {
        b.iter(|| black_box(metric.distance(black_box(&items[0]), black_box(&items[1]))));
    });
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("agglomerative_fit");
    group.sample_size(10);
    for n in [25, 50, 100] {
        let items = make_items(n, 42);
        let engine = Agglomerative::new(VectorDistance::default());
        group.bench_with_input(BenchmarkId::new("k6", n), &n, |b, _| {
            b.iter(|| black_box(engine.fit(&items, 6)));
        });
    }
    group.finish();
}

fn bench_silhouette(c: &mut Criterion) {
    let items = make_items(100, 42);
    let metric = VectorDistance::default();
    let labels: Vec<usize> = (0..items.len()).map(|i| i % 6).collect();
    c.bench_function("silhouette_100", |b| {
        b.iter(|| black_box(silhouette(&items, &labels, &metric)));
    });
}

fn bench_sweep(c: &mut Criterion) {
    let items = make_items(60, 9);
    let metric = VectorDistance::default();
    let engine = Agglomerative::new(metric);
    let mut group = c.benchmark_group("sweep");
    group.sample_size(10);
    group.bench_function("k2_to_12_60items", |b| {
        b.iter(|| black_box(sweep(&items, &engine, KRange::new(2, 12), &items, &metric)));
    });
    group.finish();
}

criterion_group!(benches, bench_vector_distance, bench_fit, bench_silhouette, bench_sweep);
criterion_main!(benches);
