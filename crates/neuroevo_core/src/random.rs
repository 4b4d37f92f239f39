//! Seedable randomness.
//!
//! Every random draw in the engine goes through an injected [`rand::Rng`], so
//! a run seeded with the same value replays bit-identically. The default
//! generator is ChaCha20, matching the deterministic weight-sync generator
//! used elsewhere in the stack.

use core::f64::consts::PI;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Default generator for the engine.
pub type EngineRng = ChaCha20Rng;

/// Build the default generator from a 64-bit seed.
pub fn seeded(seed: u64) -> EngineRng {
    ChaCha20Rng::seed_from_u64(seed)
}

/// Uniform draw in (0, 1]. Zero is redrawn so `ln` stays finite.
fn open_unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    loop {
        let u: f64 = rng.gen();
        if u != 0.0 {
            return u;
        }
    }
}

/// Normal sample N(mean, std_dev) via the Box–Muller transform.
pub fn gaussian<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    let u = open_unit(rng);
    let v = open_unit(rng);
    let z = (-2.0 * u.ln()).sqrt() * (2.0 * PI * v).cos();
    z * std_dev + mean
}

/// Xavier-style initial weight: uniform in [-1, 1) scaled by sqrt(2 / fan_in).
pub fn xavier_weight<R: Rng + ?Sized>(rng: &mut R, fan_in: usize) -> f64 {
    let scale = (2.0 / fan_in as f64).sqrt();
    rng.gen_range(-1.0..1.0) * scale
}
