//! Genotype operators.
//!
//! All of these work on flat genotype vectors (or on score slices indexed
//! like the population), never on live networks.

use rand::Rng;

use crate::random::gaussian;

/// `fitness_weight * fitness + novelty_weight * novelty`.
///
/// A NaN result ranks below everything, so it is reported as `-inf`.
pub fn composite_score(fitness: f64, novelty: f64, fitness_weight: f64, novelty_weight: f64) -> f64 {
    rank_key(fitness_weight * fitness + novelty_weight * novelty)
}

fn rank_key(score: f64) -> f64 {
    if score.is_nan() {
        f64::NEG_INFINITY
    } else {
        score
    }
}

pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Mean distance from each genotype to every other one.
///
/// Each pair is measured once and credited to both sides. A population of
/// one (or zero) has novelty 0.
pub fn compute_novelty(genomes: &[Vec<f64>]) -> Vec<f64> {
    let n = genomes.len();
    let mut totals = vec![0.0; n];
    if n < 2 {
        return totals;
    }
    for i in 0..n {
        for j in (i + 1)..n {
            let d = euclidean_distance(&genomes[i], &genomes[j]);
            totals[i] += d;
            totals[j] += d;
        }
    }
    let others = (n - 1) as f64;
    totals.iter_mut().for_each(|t| *t /= others);
    totals
}

/// With probability `crossover_rate`, swap each gene between the two parents
/// with probability 0.5. Otherwise the parents pass through unchanged.
pub fn uniform_crossover<R: Rng + ?Sized>(
    rng: &mut R,
    parent_a: &[f64],
    parent_b: &[f64],
    crossover_rate: f64,
) -> (Vec<f64>, Vec<f64>) {
    let mut child_a = parent_a.to_vec();
    let mut child_b = parent_b.to_vec();
    if rng.gen::<f64>() < crossover_rate {
        for (a, b) in child_a.iter_mut().zip(child_b.iter_mut()) {
            if rng.gen::<f64>() < 0.5 {
                core::mem::swap(a, b);
            }
        }
    }
    (child_a, child_b)
}

/// Add N(0, intensity) noise to each gene with probability `rate`.
/// Returns how many genes were touched.
pub fn mutate<R: Rng + ?Sized>(rng: &mut R, genome: &mut [f64], rate: f64, intensity: f64) -> usize {
    let mut touched = 0;
    for gene in genome.iter_mut() {
        if rng.gen::<f64>() < rate {
            *gene += gaussian(rng, 0.0, intensity);
            touched += 1;
        }
    }
    touched
}

/// Sample `size` indices uniformly with replacement and return the one with
/// the highest score. Ties go to the earliest draw.
pub fn tournament_select<R: Rng + ?Sized>(rng: &mut R, scores: &[f64], size: usize) -> Option<usize> {
    if scores.is_empty() {
        return None;
    }
    let mut best = rng.gen_range(0..scores.len());
    for _ in 1..size.max(1) {
        let candidate = rng.gen_range(0..scores.len());
        if rank_key(scores[candidate]) > rank_key(scores[best]) {
            best = candidate;
        }
    }
    Some(best)
}

/// Indices of the `count` highest scores, best first. Equal scores keep
/// population order; NaN ranks last.
pub fn rank_elites(scores: &[f64], count: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| rank_key(scores[b]).total_cmp(&rank_key(scores[a])));
    order.truncate(count);
    order
}
