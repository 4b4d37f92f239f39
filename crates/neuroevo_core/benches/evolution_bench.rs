//! Generation cost benchmarks
//!
//! Novelty is the O(n^2 * genome) step and dominates a generation; the
//! second group times a full evaluate + evolve cycle for comparison.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use neuroevo_core::evolution::operators::compute_novelty;
use neuroevo_core::random::{gaussian, seeded};
use neuroevo_core::{EvolutionConfig, GeneticAlgorithm, NeuralNetwork, Topology};
use std::time::Duration;

fn random_genomes(count: usize, len: usize) -> Vec<Vec<f64>> {
    let mut rng = seeded(0xBEEF);
    (0..count)
        .map(|_| (0..len).map(|_| gaussian(&mut rng, 0.0, 1.0)).collect())
        .collect()
}

fn bench_novelty(c: &mut Criterion) {
    let mut group = c.benchmark_group("novelty");
    group.measurement_time(Duration::from_secs(5));

    for population in [50, 100, 200].iter() {
        let genomes = random_genomes(*population, 28);
        group.bench_with_input(
            BenchmarkId::new("pairwise", population),
            &genomes,
            |b, genomes| b.iter(|| compute_novelty(black_box(genomes))),
        );
    }
    group.finish();
}

fn bench_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("generation");
    group.measurement_time(Duration::from_secs(5));

    let inputs = [0.5, -0.25, 0.75, 0.0, -1.0];
    let mut evaluator = |net: &mut NeuralNetwork| net.forward(&inputs).map(|o| o[0]).unwrap_or(0.0);

    for population in [50, 100].iter() {
        let config = EvolutionConfig::with_topology(Topology::new(1, 5, 4, 2), *population);
        let mut ga = GeneticAlgorithm::from_seed(config, 1).expect("valid topology");
        ga.initialize_population().expect("valid topology");

        group.bench_function(BenchmarkId::new("evaluate_evolve", population), |b| {
            b.iter(|| {
                ga.evaluate(&mut evaluator);
                black_box(ga.evolve().expect("valid topology"))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_novelty, bench_generation);
criterion_main!(benches);
