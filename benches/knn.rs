use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use knn_tree::distance::distance;
use knn_tree::kdtree::KDTree;
use knn_tree::Point;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstar::RTree;

fn random_points(n: usize, seed: u64) -> Vec<(Point<f64, 3>, u8)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let p = Point::new([
                rng.gen_range(0.0..1000.0),
                rng.gen_range(0.0..1000.0),
                rng.gen_range(0.0..1000.0),
            ]);
            (p, rng.gen_range(0..8))
        })
        .collect()
}

fn construct_tree(items: &[(Point<f64, 3>, u8)]) -> KDTree<f64, 3, u8> {
    items.iter().copied().collect()
}

fn construct_rstar(items: &[(Point<f64, 3>, u8)]) -> RTree<[f64; 3]> {
    RTree::bulk_load(items.iter().map(|(p, _)| *p.coords()).collect())
}

/// Baseline: sort every point by distance, then take the first k.
fn linear_knn(items: &[(Point<f64, 3>, u8)], query: &Point<f64, 3>, k: usize) -> Vec<u8> {
    let mut sorted: Vec<_> = items
        .iter()
        .map(|(p, label)| (distance(p, query), *label))
        .collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
    sorted.into_iter().take(k).map(|(_, label)| label).collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let items = random_points(100_000, 0);
    let queries: Vec<_> = random_points(100, 1).into_iter().map(|(p, _)| p).collect();

    c.bench_function("construction (kdtree)", |b| {
        b.iter(|| construct_tree(&items))
    });

    c.bench_function("construction (rstar bulk)", |b| {
        b.iter(|| construct_rstar(&items))
    });

    let tree = construct_tree(&items);
    let rstar_tree = construct_rstar(&items);

    let mut group = c.benchmark_group("knn_value");
    for k in [1, 10, 50] {
        group.bench_with_input(BenchmarkId::new("kdtree", k), &k, |b, &k| {
            b.iter(|| {
                for query in &queries {
                    black_box(tree.knn_value(query, k).unwrap());
                }
            })
        });
        group.bench_with_input(BenchmarkId::new("rstar", k), &k, |b, &k| {
            b.iter(|| {
                for query in &queries {
                    black_box(rstar_tree.nearest_neighbor_iter(query.coords()).take(k).count());
                }
            })
        });
    }
    group.finish();

    c.bench_function("knn_values batch (kdtree)", |b| {
        b.iter(|| tree.knn_values(&queries, 10))
    });

    c.bench_function("neighbors k=10 (linear scan)", |b| {
        b.iter(|| linear_knn(&items, &queries[0], 10))
    });

    c.bench_function("neighbors k=10 (kdtree)", |b| {
        b.iter(|| tree.neighbors(&queries[0], 10).len())
    });

    c.bench_function("neighbors k=10 (rstar)", |b| {
        b.iter(|| {
            rstar_tree
                .nearest_neighbor_iter(queries[0].coords())
                .take(10)
                .count()
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
