//! Benchmarks for indexing, merging and topology construction.
//!
//! Run with: cargo bench -p mesh-manifold

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mesh_manifold::{
    check_non_manifold, coordinates_from_source, CheckConfig, CollectingSink, CoordinateIndex,
    ManifoldChecker, MergeStrategy, TriangleSoup,
};

/// Wavy `n x n` quad grid split into `2n²` triangles, unindexed like an STL.
fn create_grid(n: usize) -> TriangleSoup {
    let point = |i: usize, j: usize| -> [f32; 3] {
        let (x, y) = (i as f32, j as f32);
        [x, y, (x * 0.3).sin() * (y * 0.2).cos()]
    };

    let mut triangles = Vec::with_capacity(2 * n * n);
    for i in 0..n {
        for j in 0..n {
            let (a, b, c, d) = (point(i, j), point(i + 1, j), point(i + 1, j + 1), point(i, j + 1));
            triangles.push([a, b, c]);
            triangles.push([a, c, d]);
        }
    }
    TriangleSoup::from_triangles(triangles)
}

fn bench_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("Index");

    for n in [16, 64, 128] {
        let coords = coordinates_from_source(&create_grid(n));
        group.throughput(Throughput::Elements(coords.len() as u64));

        group.bench_with_input(BenchmarkId::new("build", coords.len()), &coords, |b, coords| {
            b.iter(|| CoordinateIndex::build(black_box(coords)))
        });

        let index = CoordinateIndex::build(&coords);
        group.bench_with_input(BenchmarkId::new("query_all", coords.len()), &coords, |b, coords| {
            b.iter(|| coords.iter().map(|c| index.matches(black_box(c)).len()).sum::<usize>())
        });
    }

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("Pipeline");

    for n in [16, 64, 128] {
        let soup = create_grid(n);
        group.throughput(Throughput::Elements(soup.triangle_count() as u64));

        for strategy in [MergeStrategy::PerQuery, MergeStrategy::Transitive] {
            let config = CheckConfig::default().with_merge(strategy);
            let id = BenchmarkId::new(format!("{:?}", strategy), soup.triangle_count());
            group.bench_with_input(id, &soup, |b, soup| {
                b.iter(|| ManifoldChecker::from_source(black_box(soup), &config))
            });
        }

        let checker = ManifoldChecker::from_source(&soup, &CheckConfig::default()).unwrap();
        group.bench_function(BenchmarkId::new("check", soup.triangle_count()), |b| {
            b.iter(|| check_non_manifold(black_box(checker.topology()), &mut CollectingSink::default()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_index, bench_pipeline);
criterion_main!(benches);
