//! Neuroevolution engine
//!
//! A fixed-topology feedforward network doubles as a genotype (its weights,
//! flattened into one ordered vector) and as a phenotype (the live network
//! that an evaluator drives). A genetic algorithm evolves a population of
//! such networks under a combined fitness + novelty selection pressure.
//!
//! Layout:
//! - [`network`]: neurons, layers, forward pass, gradient training,
//!   flatten/unflatten of the genotype vector
//! - [`persistence`]: genotype records, JSON/binary encodings, stores
//! - [`evolution`]: configuration, population, operators, the GA itself
//! - [`random`]: seedable randomness (Xavier init, Box–Muller gaussian)
//! - [`inputs`]: generic input scaling helpers

pub mod error;
pub mod evolution;
pub mod inputs;
pub mod network;
pub mod persistence;
pub mod random;

pub use error::{NetworkError, StoreError};
pub use evolution::{
    EvolutionConfig, FitnessEvaluator, GenerationStats, GeneticAlgorithm, Individual,
};
pub use network::{Layer, NeuralNetwork, Neuron, Topology, LEARNING_RATE};
pub use persistence::{BinaryFileStore, GenomeRecord, GenomeStore, JsonFileStore, MemoryGenomeStore};
