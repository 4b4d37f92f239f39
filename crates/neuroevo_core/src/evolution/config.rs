use serde::{Deserialize, Serialize};

use crate::network::Topology;

/// Tunables for one evolutionary run.
///
/// Every field has a serde default, so a partial TOML/JSON table fills in the
/// rest. `mutation_rate` and `mutation_intensity` are the *resting* values;
/// the GA escalates away from them while stagnating and snaps back on
/// improvement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionConfig {
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    /// Top-ranked individuals carried over verbatim (clipped to population size)
    #[serde(default = "default_elite_count")]
    pub elite_count: usize,
    /// Fraction of each generation made of fresh random individuals
    #[serde(default = "default_immigrant_fraction")]
    pub immigrant_fraction: f64,
    #[serde(default = "default_tournament_size")]
    pub tournament_size: usize,
    #[serde(default = "default_crossover_rate")]
    pub crossover_rate: f64,
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    #[serde(default = "default_mutation_intensity")]
    pub mutation_intensity: f64,
    /// Ceiling for escalated mutation rate and intensity
    #[serde(default = "default_max_mutation")]
    pub max_mutation: f64,
    /// Multiplier applied to both rates per stagnant generation past the threshold
    #[serde(default = "default_escalation_factor")]
    pub escalation_factor: f64,
    /// Escalation starts once this many generations pass without improvement
    #[serde(default = "default_stagnation_threshold")]
    pub stagnation_threshold: u32,
    /// Per-weight probability for the mutated elite copies
    #[serde(default = "default_soft_mutation")]
    pub soft_mutation_rate: f64,
    #[serde(default = "default_soft_mutation")]
    pub soft_mutation_intensity: f64,
    #[serde(default = "default_fitness_weight")]
    pub fitness_weight: f64,
    #[serde(default = "default_novelty_weight")]
    pub novelty_weight: f64,
    #[serde(default)]
    pub topology: Topology,
}

fn default_population_size() -> usize {
    100
}
fn default_elite_count() -> usize {
    20
}
fn default_immigrant_fraction() -> f64 {
    0.1
}
fn default_tournament_size() -> usize {
    5
}
fn default_crossover_rate() -> f64 {
    0.7
}
fn default_mutation_rate() -> f64 {
    0.3
}
fn default_mutation_intensity() -> f64 {
    0.3
}
fn default_max_mutation() -> f64 {
    0.8
}
fn default_escalation_factor() -> f64 {
    1.5
}
fn default_stagnation_threshold() -> u32 {
    5
}
fn default_soft_mutation() -> f64 {
    0.1
}
fn default_fitness_weight() -> f64 {
    0.7
}
fn default_novelty_weight() -> f64 {
    0.3
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: default_population_size(),
            elite_count: default_elite_count(),
            immigrant_fraction: default_immigrant_fraction(),
            tournament_size: default_tournament_size(),
            crossover_rate: default_crossover_rate(),
            mutation_rate: default_mutation_rate(),
            mutation_intensity: default_mutation_intensity(),
            max_mutation: default_max_mutation(),
            escalation_factor: default_escalation_factor(),
            stagnation_threshold: default_stagnation_threshold(),
            soft_mutation_rate: default_soft_mutation(),
            soft_mutation_intensity: default_soft_mutation(),
            fitness_weight: default_fitness_weight(),
            novelty_weight: default_novelty_weight(),
            topology: Topology::default(),
        }
    }
}

impl EvolutionConfig {
    pub fn with_topology(topology: Topology, population_size: usize) -> Self {
        Self {
            topology,
            population_size,
            ..Self::default()
        }
    }

    /// Immigrants inserted per generation: `floor(population_size * immigrant_fraction)`.
    pub fn immigrant_count(&self) -> usize {
        (self.population_size as f64 * self.immigrant_fraction).floor() as usize
    }

    /// Elites per generation, never more than the population.
    pub fn effective_elite_count(&self) -> usize {
        self.elite_count.min(self.population_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: EvolutionConfig =
            serde_json::from_str(r#"{"population_size": 40, "crossover_rate": 0.0}"#).unwrap();
        assert_eq!(config.population_size, 40);
        assert_eq!(config.crossover_rate, 0.0);
        assert_eq!(config.elite_count, 20);
        assert_eq!(config.topology, Topology::new(1, 5, 4, 2));
        assert_eq!(config.soft_mutation_intensity, 0.1);
    }

    #[test]
    fn test_derived_counts() {
        let config = EvolutionConfig::with_topology(Topology::default(), 15);
        assert_eq!(config.immigrant_count(), 1);
        assert_eq!(config.effective_elite_count(), 15);
    }
}
