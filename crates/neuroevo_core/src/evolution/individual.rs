use rand::Rng;

use crate::error::NetworkError;
use crate::network::{NeuralNetwork, Topology};

/// One genotype carrier: a network plus its scores for the current generation.
#[derive(Clone, Debug)]
pub struct Individual {
    pub network: NeuralNetwork,
    /// Task score, higher is better
    pub fitness: f64,
    /// Mean genotype distance to the rest of the population
    pub novelty: f64,
}

impl Individual {
    /// Fresh random genotype, scores zeroed.
    pub fn random<R: Rng + ?Sized>(topology: Topology, rng: &mut R) -> Result<Self, NetworkError> {
        Ok(Self::from_network(NeuralNetwork::new(topology, rng)?))
    }

    /// New network materialised from a genotype vector, scores zeroed.
    pub fn from_genome(topology: Topology, genome: &[f64]) -> Result<Self, NetworkError> {
        let mut network = NeuralNetwork::zeroed(topology)?;
        network.unflatten_weights(genome)?;
        Ok(Self::from_network(network))
    }

    pub fn from_network(network: NeuralNetwork) -> Self {
        Individual {
            network,
            fitness: 0.0,
            novelty: 0.0,
        }
    }

    pub fn genome(&self) -> Vec<f64> {
        self.network.flatten_weights()
    }

    /// Weighted fitness + novelty, the ranking key for elites and tournaments.
    pub fn composite_score(&self, fitness_weight: f64, novelty_weight: f64) -> f64 {
        super::operators::composite_score(self.fitness, self.novelty, fitness_weight, novelty_weight)
    }
}
