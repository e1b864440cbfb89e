//! Deterministic per-particle RNG.
//!
//! # Determinism strategy
//!
//! Each particle gets its own independent `SmallRng` seeded by:
//!
//!   seed = scenario_seed XOR (particle_id * MIXING_CONSTANT)
//!
//! Particle IDs are assigned in emission order by the injection scheduler,
//! which is itself deterministic, so a particle's random stream depends only
//! on the scenario seed and its position in the schedule:
//!
//! - Particles never share RNG state (no contention, no ordering dependency
//!   between worker threads).
//! - Releasing more particles later in the run does not disturb the streams
//!   of particles already in flight.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::ParticleId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Per-particle deterministic RNG.
///
/// Stored in a parallel `Vec<ParticleRng>` alongside the particle SoA arrays.
/// Each worker thread holds exclusive `&mut` access to the RNGs of the
/// particles it advances.
pub struct ParticleRng(SmallRng);

impl ParticleRng {
    /// Seed deterministically from the scenario seed and a particle ID.
    pub fn new(scenario_seed: u64, particle: ParticleId) -> Self {
        let seed = scenario_seed ^ (particle.0 as u64).wrapping_mul(MIXING_CONSTANT);
        ParticleRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Uniform fraction in `[0, 1)`, e.g. the part of a sub-step spent
    /// before crossing into the next unit.
    #[inline]
    pub fn share(&mut self) -> f64 {
        self.0.gen_range(0.0..1.0)
    }
}
