//! Benchmarks for threshold clustering and strength of connectedness

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use fuzzy_explorer::{FuzzyGraph, WeightedEdge, maximum_spanning_forest, partition};

/// A dense similarity graph over `n` objects with deterministic weights
fn similarity_edges(n: usize) -> Vec<WeightedEdge> {
    let mut edges = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            let weight = ((i * 31 + j * 17) % 100) as f64 / 100.0;
            edges.push(WeightedEdge::new(format!("G{}", i), format!("G{}", j), weight));
        }
    }
    edges
}

fn complete_graph(n: usize) -> FuzzyGraph {
    let vertices = (0..n)
        .map(|i| (format!("V{}", i), 0.5 + (i % 5) as f64 / 10.0))
        .collect();
    FuzzyGraph::complete(vertices)
}

fn bench_partition(c: &mut Criterion) {
    let edges = similarity_edges(60);

    c.bench_function("partition_and_cluster_60", |b| {
        b.iter(|| partition(black_box(&edges), black_box(0.65)).clusters())
    });

    c.bench_function("maximum_spanning_forest_60", |b| {
        b.iter(|| maximum_spanning_forest(black_box(&edges)))
    });
}

fn bench_connectedness(c: &mut Criterion) {
    let graph = complete_graph(40);

    c.bench_function("strength_of_connectedness_40", |b| {
        b.iter(|| graph.strength_of_connectedness(black_box("V0"), black_box("V39")))
    });

    c.bench_function("validate_complete_40", |b| b.iter(|| graph.validate()));
}

criterion_group!(benches, bench_partition, bench_connectedness);
criterion_main!(benches);
