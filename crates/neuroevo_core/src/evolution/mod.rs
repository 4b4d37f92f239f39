//! Genetic algorithm over fixed-topology networks
//!
//! Each generation is one atomic transition:
//! 1. `evaluate()` scores every individual with an external evaluator, then
//!    computes novelty over the same genotype snapshot
//! 2. `evolve()` updates the stagnation counter and adaptive mutation rates,
//!    then builds the next population from elites, softly mutated elite
//!    copies, random immigrants, and tournament offspring
//!
//! Selection ranks by `fitness_weight * fitness + novelty_weight * novelty`.
//! Population size never changes across `evolve()`.

pub mod config;
pub mod individual;
pub mod operators;
pub mod stats;

pub use config::EvolutionConfig;
pub use individual::Individual;
pub use stats::GenerationStats;

use rand::Rng;
use tracing::{debug, info};

use crate::error::NetworkError;
use crate::network::NeuralNetwork;
use crate::random::{seeded, EngineRng};
use operators::{compute_novelty, mutate, rank_elites, tournament_select, uniform_crossover};

/// Task scoring function. Higher is better.
///
/// May run `forward` on the network as often as it likes; must not touch
/// population state.
pub trait FitnessEvaluator {
    fn evaluate(&mut self, network: &mut NeuralNetwork) -> f64;
}

impl<F> FitnessEvaluator for F
where
    F: FnMut(&mut NeuralNetwork) -> f64,
{
    fn evaluate(&mut self, network: &mut NeuralNetwork) -> f64 {
        self(network)
    }
}

pub struct GeneticAlgorithm<R: Rng = EngineRng> {
    config: EvolutionConfig,
    population: Vec<Individual>,
    rng: R,
    generation: u64,
    generations_without_improvement: u32,
    previous_best_fitness: f64,
    mutation_rate: f64,
    mutation_intensity: f64,
}

impl GeneticAlgorithm<EngineRng> {
    /// GA driven by a ChaCha20 stream seeded with `seed`.
    pub fn from_seed(config: EvolutionConfig, seed: u64) -> Result<Self, NetworkError> {
        Self::new(config, seeded(seed))
    }
}

impl<R: Rng> GeneticAlgorithm<R> {
    /// Validates the topology up front; the population stays empty until
    /// [`initialize_population`](Self::initialize_population).
    pub fn new(config: EvolutionConfig, rng: R) -> Result<Self, NetworkError> {
        config.topology.validate()?;
        info!(
            population = config.population_size,
            weights = config.topology.weight_count(),
            elites = config.effective_elite_count(),
            immigrants = config.immigrant_count(),
            "Genetic algorithm initialized"
        );
        Ok(GeneticAlgorithm {
            mutation_rate: config.mutation_rate,
            mutation_intensity: config.mutation_intensity,
            config,
            population: Vec::new(),
            rng,
            generation: 0,
            generations_without_improvement: 0,
            previous_best_fitness: 0.0,
        })
    }

    /// Replace the population with `population_size` random individuals.
    pub fn initialize_population(&mut self) -> Result<(), NetworkError> {
        let mut population = Vec::with_capacity(self.config.population_size);
        for _ in 0..self.config.population_size {
            population.push(Individual::random(self.config.topology, &mut self.rng)?);
        }
        self.population = population;
        Ok(())
    }

    /// Score every individual, then recompute novelty for the whole population.
    pub fn evaluate<E: FitnessEvaluator + ?Sized>(&mut self, evaluator: &mut E) {
        for individual in &mut self.population {
            individual.fitness = evaluator.evaluate(&mut individual.network);
        }
        self.compute_novelty();
    }

    /// Like [`evaluate`](Self::evaluate), scoring individuals on the rayon
    /// pool. Novelty starts only after every score is in.
    #[cfg(feature = "parallel")]
    pub fn evaluate_parallel<F>(&mut self, evaluator: F)
    where
        F: Fn(&mut NeuralNetwork) -> f64 + Sync,
    {
        use rayon::prelude::*;

        self.population
            .par_iter_mut()
            .for_each(|individual| individual.fitness = evaluator(&mut individual.network));
        self.compute_novelty();
    }

    /// Mean genotype distance of each individual to all others.
    /// Each genotype is flattened exactly once per pass.
    pub fn compute_novelty(&mut self) {
        let genomes: Vec<Vec<f64>> = self.population.iter().map(Individual::genome).collect();
        let novelty = compute_novelty(&genomes);
        for (individual, value) in self.population.iter_mut().zip(novelty) {
            individual.novelty = value;
        }
    }

    /// Build the next generation and replace the current one.
    pub fn evolve(&mut self) -> Result<GenerationStats, NetworkError> {
        let best = self.best_fitness();
        let mean = self.mean_fitness();
        self.update_stagnation(best);
        self.adjust_parameters();

        let topology = self.config.topology;
        let capacity = self.config.population_size;
        let scores: Vec<f64> = self
            .population
            .iter()
            .map(|i| i.composite_score(self.config.fitness_weight, self.config.novelty_weight))
            .collect();
        let best_composite = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let genomes: Vec<Vec<f64>> = self.population.iter().map(Individual::genome).collect();

        let mut next: Vec<Individual> = Vec::with_capacity(capacity);

        // Elites, verbatim; they keep their scores
        let elites = rank_elites(&scores, self.config.effective_elite_count());
        for &idx in &elites {
            if next.len() >= capacity {
                break;
            }
            let mut elite = Individual::from_genome(topology, &genomes[idx])?;
            elite.fitness = self.population[idx].fitness;
            elite.novelty = self.population[idx].novelty;
            next.push(elite);
        }

        // One softly mutated copy per elite
        for &idx in &elites {
            if next.len() >= capacity {
                break;
            }
            let mut genome = genomes[idx].clone();
            mutate(
                &mut self.rng,
                &mut genome,
                self.config.soft_mutation_rate,
                self.config.soft_mutation_intensity,
            );
            next.push(Individual::from_genome(topology, &genome)?);
        }

        for _ in 0..self.config.immigrant_count() {
            if next.len() >= capacity {
                break;
            }
            next.push(Individual::random(topology, &mut self.rng)?);
        }

        while next.len() < capacity {
            let parents = (
                tournament_select(&mut self.rng, &scores, self.config.tournament_size),
                tournament_select(&mut self.rng, &scores, self.config.tournament_size),
            );
            let (Some(a), Some(b)) = parents else {
                // Nothing to breed from yet
                next.push(Individual::random(topology, &mut self.rng)?);
                continue;
            };

            let (mut child_a, mut child_b) =
                uniform_crossover(&mut self.rng, &genomes[a], &genomes[b], self.config.crossover_rate);
            mutate(&mut self.rng, &mut child_a, self.mutation_rate, self.mutation_intensity);
            mutate(&mut self.rng, &mut child_b, self.mutation_rate, self.mutation_intensity);

            next.push(Individual::from_genome(topology, &child_a)?);
            if next.len() < capacity {
                next.push(Individual::from_genome(topology, &child_b)?);
            }
        }

        let stats = GenerationStats {
            generation: self.generation,
            best_fitness: best,
            mean_fitness: mean,
            best_composite,
            mutation_rate: self.mutation_rate,
            mutation_intensity: self.mutation_intensity,
            generations_without_improvement: self.generations_without_improvement,
        };
        debug!(
            generation = self.generation,
            best_fitness = best,
            mean_fitness = mean,
            mutation_rate = self.mutation_rate,
            stagnant = self.generations_without_improvement,
            "Generation evolved"
        );

        self.population = next;
        self.generation += 1;
        Ok(stats)
    }

    fn update_stagnation(&mut self, best: f64) {
        if best <= self.previous_best_fitness {
            self.generations_without_improvement += 1;
        } else {
            self.generations_without_improvement = 0;
            self.previous_best_fitness = best;
        }
    }

    /// Discrete ratchet: past the stagnation threshold both rates grow by
    /// `escalation_factor` per generation up to `max_mutation`; otherwise
    /// they snap back to their resting values.
    fn adjust_parameters(&mut self) {
        if self.generations_without_improvement > self.config.stagnation_threshold {
            let factor = self.config.escalation_factor;
            let cap = self.config.max_mutation;
            self.mutation_rate = (self.mutation_rate * factor).min(cap);
            self.mutation_intensity = (self.mutation_intensity * factor).min(cap);
        } else {
            self.mutation_rate = self.config.mutation_rate;
            self.mutation_intensity = self.config.mutation_intensity;
        }
    }

    pub fn population(&self) -> &[Individual] {
        &self.population
    }

    pub fn individual(&self, index: usize) -> Option<&Individual> {
        self.population.get(index)
    }

    pub fn individual_mut(&mut self, index: usize) -> Option<&mut Individual> {
        self.population.get_mut(index)
    }

    /// Overwrite one individual's fitness. Returns `false` if `index` is out of range.
    pub fn set_fitness(&mut self, index: usize, fitness: f64) -> bool {
        match self.population.get_mut(index) {
            Some(individual) => {
                individual.fitness = fitness;
                true
            }
            None => false,
        }
    }

    /// Highest fitness in the population (`-inf` when empty).
    pub fn best_fitness(&self) -> f64 {
        self.population
            .iter()
            .map(|i| i.fitness)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn mean_fitness(&self) -> f64 {
        if self.population.is_empty() {
            return 0.0;
        }
        self.population.iter().map(|i| i.fitness).sum::<f64>() / self.population.len() as f64
    }

    /// Fittest individual; ties go to the earliest. NaN fitness is never best.
    pub fn best_individual(&self) -> Option<&Individual> {
        let mut best: Option<&Individual> = None;
        for individual in self.population.iter().filter(|i| !i.fitness.is_nan()) {
            if best.map_or(true, |b| individual.fitness > b.fitness) {
                best = Some(individual);
            }
        }
        best
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Number of completed `evolve()` calls.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn mutation_rate(&self) -> f64 {
        self.mutation_rate
    }

    pub fn mutation_intensity(&self) -> f64 {
        self.mutation_intensity
    }

    pub fn crossover_rate(&self) -> f64 {
        self.config.crossover_rate
    }

    pub fn generations_without_improvement(&self) -> u32 {
        self.generations_without_improvement
    }

    pub fn previous_best_fitness(&self) -> f64 {
        self.previous_best_fitness
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Topology;

    fn small_config(population: usize) -> EvolutionConfig {
        EvolutionConfig {
            elite_count: 2,
            ..EvolutionConfig::with_topology(Topology::new(1, 2, 3, 1), population)
        }
    }

    #[test]
    fn test_initialize_population() {
        let mut ga = GeneticAlgorithm::from_seed(small_config(12), 1).unwrap();
        assert!(ga.population().is_empty());

        ga.initialize_population().unwrap();
        assert_eq!(ga.population().len(), 12);
        assert!(ga
            .population()
            .iter()
            .all(|i| i.fitness == 0.0 && i.novelty == 0.0));
    }

    #[test]
    fn test_invalid_topology_rejected() {
        let config = EvolutionConfig::with_topology(Topology::new(1, 0, 3, 1), 10);
        assert!(matches!(
            GeneticAlgorithm::from_seed(config, 1),
            Err(NetworkError::InvalidTopology(_))
        ));
    }

    #[test]
    fn test_stagnation_ratchet() {
        let mut ga = GeneticAlgorithm::from_seed(small_config(10), 2).unwrap();
        ga.initialize_population().unwrap();

        // Constant zero fitness never beats the initial best of 0
        for gen in 1..=5 {
            ga.evolve().unwrap();
            assert_eq!(ga.generations_without_improvement(), gen);
            assert_eq!(ga.mutation_rate(), 0.3);
        }
        ga.evolve().unwrap();
        assert!(ga.mutation_rate() > 0.3);
        assert!((ga.mutation_rate() - 0.45).abs() < 1e-12);

        for _ in 0..10 {
            ga.evolve().unwrap();
        }
        assert_eq!(ga.mutation_rate(), 0.8);
        assert_eq!(ga.mutation_intensity(), 0.8);
    }

    #[test]
    fn test_improvement_resets_rates() {
        let mut ga = GeneticAlgorithm::from_seed(small_config(10), 3).unwrap();
        ga.initialize_population().unwrap();
        for _ in 0..8 {
            ga.evolve().unwrap();
        }
        assert!(ga.mutation_rate() > 0.3);

        ga.set_fitness(0, 5.0);
        let stats = ga.evolve().unwrap();
        assert_eq!(stats.generations_without_improvement, 0);
        assert_eq!(ga.mutation_rate(), 0.3);
        assert_eq!(ga.previous_best_fitness(), 5.0);
    }

    #[test]
    fn test_uninitialized_evolve_fills_population() {
        let mut ga = GeneticAlgorithm::from_seed(small_config(7), 4).unwrap();
        ga.evolve().unwrap();
        assert_eq!(ga.population().len(), 7);
    }

    #[test]
    fn test_set_fitness_out_of_range() {
        let mut ga = GeneticAlgorithm::from_seed(small_config(3), 5).unwrap();
        ga.initialize_population().unwrap();
        assert!(ga.set_fitness(2, 1.0));
        assert!(!ga.set_fitness(3, 1.0));
        assert_eq!(ga.best_individual().map(|i| i.fitness), Some(1.0));
    }

    #[test]
    fn test_individual_mut_edits_network() {
        let mut ga = GeneticAlgorithm::from_seed(small_config(4), 6).unwrap();
        ga.initialize_population().unwrap();
        let zeros = vec![0.0; ga.config().topology.weight_count()];

        let individual = ga.individual_mut(1).unwrap();
        individual.network.unflatten_weights(&zeros).unwrap();
        assert_eq!(ga.individual(1).unwrap().genome(), zeros);
        assert!(ga.individual_mut(4).is_none());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let score = |net: &mut NeuralNetwork| net.forward(&[0.5, -0.5]).map_or(0.0, |o| o[0]);

        let mut sequential = GeneticAlgorithm::from_seed(small_config(16), 7).unwrap();
        sequential.initialize_population().unwrap();
        let mut parallel = GeneticAlgorithm::from_seed(small_config(16), 7).unwrap();
        parallel.initialize_population().unwrap();

        sequential.evaluate(&mut score.clone());
        parallel.evaluate_parallel(score);

        for (a, b) in sequential.population().iter().zip(parallel.population()) {
            assert_eq!(a.fitness, b.fitness);
            assert_eq!(a.novelty, b.novelty);
        }
    }

    #[test]
    fn test_nan_fitness_never_kept_as_elite() {
        let config = EvolutionConfig {
            elite_count: 1,
            novelty_weight: 0.0,
            ..small_config(10)
        };
        let mut ga = GeneticAlgorithm::from_seed(config, 8).unwrap();
        ga.initialize_population().unwrap();
        for i in 0..10 {
            let fitness = if i == 2 { f64::NAN } else { i as f64 + 1.0 };
            ga.set_fitness(i, fitness);
        }
        assert_eq!(ga.best_individual().map(|b| b.fitness), Some(10.0));

        ga.evolve().unwrap();
        assert_eq!(ga.population()[0].fitness, 10.0);
        assert!(ga.population().iter().all(|i| !i.fitness.is_nan()));
    }
}
