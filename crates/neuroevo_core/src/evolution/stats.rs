use core::fmt;
use serde::{Deserialize, Serialize};

/// Summary of one generation transition, as seen by `evolve()`.
///
/// Fitness figures describe the generation that was consumed (the one the
/// last `evaluate()` scored); the rates are the values used to breed its
/// successor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Index of the consumed generation, starting at 0
    pub generation: u64,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    pub best_composite: f64,
    pub mutation_rate: f64,
    pub mutation_intensity: f64,
    pub generations_without_improvement: u32,
}

impl fmt::Display for GenerationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Gen[{}: best={:.4}, mean={:.4}, rate={:.3}, intensity={:.3}, stagnant={}]",
            self.generation,
            self.best_fitness,
            self.mean_fitness,
            self.mutation_rate,
            self.mutation_intensity,
            self.generations_without_improvement
        )
    }
}
