//! The unit of work a particle worker hands to the aggregator.

use pt_core::{MaterialId, ParticleId, UnitId};

/// One particle's presence in one spatial unit during the current sub-step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Visit {
    pub particle: ParticleId,
    pub unit:     UnitId,
    pub material: MaterialId,
    /// Particle mass [kg].
    pub mass:     f64,
    /// Share of the sub-step spent inside `unit`, in `[0, 1]`.
    pub weight:   f64,
}

impl Visit {
    /// A visit covering the whole sub-step.
    #[inline]
    pub fn full(particle: ParticleId, unit: UnitId, material: MaterialId, mass: f64) -> Self {
        Self { particle, unit, material, mass, weight: 1.0 }
    }

    /// `mass * weight`, the mass this visit contributes.
    #[inline]
    pub fn weighted_mass(&self) -> f64 {
        self.mass * self.weight
    }
}
