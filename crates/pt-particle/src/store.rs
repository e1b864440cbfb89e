//! Core particle storage: `ParticleStore` (SoA data) and `ParticleRngs`
//! (per-particle RNG).
//!
//! # Why two structs?
//!
//! The parallel step phase needs `&mut ParticleRngs` (one RNG per worker
//! item) and `&ParticleStore` (shared read access to every particle) at the
//! same time.  Keeping the RNGs in their own struct lets both borrows coexist:
//!
//! ```ignore
//! // pt-sim step loop (simplified):
//! let particles: &ParticleStore = &scenario.particles;
//! let outcomes = scenario.rngs.inner
//!     .par_iter_mut()
//!     .enumerate()
//!     .filter(|(i, _)| particles.active[*i])
//!     .map(|(i, rng)| model.step(ParticleId(i as u32), &ctx, rng))
//!     .collect::<Vec<_>>();
//! ```

use pt_core::{MaterialId, ParticleId, ParticleRng, Timestamp, UnitId};
use pt_inject::InjectionRecord;

// ── ParticleRngs ──────────────────────────────────────────────────────────────

/// Per-particle deterministic RNG state, grown in step with
/// [`ParticleStore`].
///
/// Each particle's stream depends only on the scenario seed and its id, so
/// results do not depend on thread count or scheduling.
pub struct ParticleRngs {
    seed:      u64,
    pub inner: Vec<ParticleRng>,
}

impl ParticleRngs {
    pub(crate) fn with_capacity(seed: u64, capacity: usize) -> Self {
        Self { seed, inner: Vec::with_capacity(capacity) }
    }

    pub(crate) fn push(&mut self, id: ParticleId) {
        self.inner.push(ParticleRng::new(self.seed, id));
    }

    #[inline]
    pub fn get_mut(&mut self, particle: ParticleId) -> &mut ParticleRng {
        &mut self.inner[particle.index()]
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

// ── ParticleStore ─────────────────────────────────────────────────────────────

/// Structure-of-Arrays storage for every particle released so far.
///
/// All `Vec` fields have the same length; `ParticleId` is the index into all
/// of them.
pub struct ParticleStore {
    pub material:   Vec<MaterialId>,
    /// Mass [kg], fixed at creation.
    pub mass:       Vec<f64>,
    pub created_at: Vec<Timestamp>,
    /// Unit the particle currently occupies.
    pub unit:       Vec<UnitId>,
    /// `false` once the particle has left the domain.
    pub active:     Vec<bool>,

    active_count: usize,
}

impl ParticleStore {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            material:     Vec::with_capacity(capacity),
            mass:         Vec::with_capacity(capacity),
            created_at:   Vec::with_capacity(capacity),
            unit:         Vec::with_capacity(capacity),
            active:       Vec::with_capacity(capacity),
            active_count: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.mass.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mass.is_empty()
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.active_count
    }

    /// Iterator over all `ParticleId`s ever created.
    pub fn particle_ids(&self) -> impl Iterator<Item = ParticleId> + '_ {
        (0..self.len() as u32).map(ParticleId)
    }

    /// Iterator over the particles still inside the domain.
    pub fn active_ids(&self) -> impl Iterator<Item = ParticleId> + '_ {
        self.active
            .iter()
            .enumerate()
            .filter(|(_, a)| **a)
            .map(|(i, _)| ParticleId(i as u32))
    }

    #[inline]
    pub fn is_active(&self, particle: ParticleId) -> bool {
        self.active.get(particle.index()).copied().unwrap_or(false)
    }

    /// Total mass of active particles [kg].
    pub fn active_mass(&self) -> f64 {
        self.mass
            .iter()
            .zip(&self.active)
            .filter(|(_, a)| **a)
            .map(|(m, _)| m)
            .sum()
    }

    /// Total mass of every particle ever created [kg].
    pub fn created_mass(&self) -> f64 {
        self.mass.iter().sum()
    }

    /// Mass of active particles per unit, indexed by `UnitId`.  Particles in
    /// units `>= unit_count` are ignored.
    pub fn mass_by_unit(&self, unit_count: usize) -> Vec<f64> {
        let mut out = vec![0.0; unit_count];
        for particle in self.active_ids() {
            let i = particle.index();
            if let Some(slot) = out.get_mut(self.unit[i].index()) {
                *slot += self.mass[i];
            }
        }
        out
    }

    // ── Mutation (driver thread only) ─────────────────────────────────────

    /// Append one active particle.  Returns its id, which is its position.
    pub fn push(
        &mut self,
        material:   MaterialId,
        mass:       f64,
        created_at: Timestamp,
        unit:       UnitId,
    ) -> ParticleId {
        let id = ParticleId(self.len() as u32);
        self.material.push(material);
        self.mass.push(mass);
        self.created_at.push(created_at);
        self.unit.push(unit);
        self.active.push(true);
        self.active_count += 1;
        id
    }

    /// Append the particle described by `record`.
    ///
    /// The returned id is the store position.  It equals `record.id` when
    /// records are released in schedule order.
    pub fn push_record(&mut self, record: &InjectionRecord) -> ParticleId {
        self.push(record.material, record.mass, record.created_at, record.unit)
    }

    /// Append `record` together with its RNG, keeping both structs the same
    /// length.
    pub fn release(&mut self, rngs: &mut ParticleRngs, record: &InjectionRecord) -> ParticleId {
        let id = self.push_record(record);
        rngs.push(id);
        id
    }

    /// Move a particle to `unit`.  Ignored for unknown ids.
    #[inline]
    pub fn move_to(&mut self, particle: ParticleId, unit: UnitId) {
        if let Some(slot) = self.unit.get_mut(particle.index()) {
            *slot = unit;
        }
    }

    /// Give a particle up.  Returns `true` if it was active.
    pub fn deactivate(&mut self, particle: ParticleId) -> bool {
        match self.active.get_mut(particle.index()) {
            Some(a) if *a => {
                *a = false;
                self.active_count -= 1;
                true
            }
            _ => false,
        }
    }
}
