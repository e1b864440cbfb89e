//! Per-unit transient counters behind the two aggregation disciplines.

use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHashSet;

use pt_core::ParticleId;

// ── RelaxedF64 ────────────────────────────────────────────────────────────────

/// An `f64` stored as its bit pattern in an `AtomicU64`.
///
/// [`add_lossy`](Self::add_lossy) is a relaxed load followed by a relaxed
/// store, not a read-modify-write: two threads adding at the same moment may
/// both read the old value, and one increment is lost.  There is no data race
/// in the memory-model sense, only a lost update, which the unsynchronized
/// discipline accepts in exchange for never blocking.
#[derive(Debug, Default)]
pub struct RelaxedF64(AtomicU64);

impl RelaxedF64 {
    pub fn new(v: f64) -> Self {
        Self(AtomicU64::new(v.to_bits()))
    }

    #[inline]
    pub fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn add_lossy(&self, v: f64) {
        let current = self.load();
        self.0.store((current + v).to_bits(), Ordering::Relaxed);
    }

    /// Exclusive read; no atomic traffic.
    #[inline]
    pub fn get(&mut self) -> f64 {
        f64::from_bits(*self.0.get_mut())
    }

    #[inline]
    pub fn reset(&mut self) {
        *self.0.get_mut() = 0.0f64.to_bits();
    }
}

// ── UnitTally ─────────────────────────────────────────────────────────────────

/// Accumulated visits of one unit during the in-progress interval.
///
/// Lives behind a `Mutex` in the synchronized disciplines.
#[derive(Debug, Default)]
pub struct UnitTally {
    pub count:        f64,
    pub mass:         f64,
    pub per_material: Vec<f64>,
    /// Particles already counted this interval (exactly-once mode only).
    pub seen:         Option<FxHashSet<ParticleId>>,
}

impl UnitTally {
    pub fn new(material_count: usize, track_identity: bool) -> Self {
        Self {
            count:        0.0,
            mass:         0.0,
            per_material: vec![0.0; material_count],
            seen:         track_identity.then(FxHashSet::default),
        }
    }

    /// `false` if identity tracking is on and `particle` was already counted.
    #[inline]
    pub fn admit(&mut self, particle: ParticleId) -> bool {
        match &mut self.seen {
            Some(seen) => seen.insert(particle),
            None       => true,
        }
    }

    #[inline]
    pub fn add(&mut self, material: usize, weight: f64, mass: f64) {
        self.count += weight;
        self.mass += mass;
        self.per_material[material] += mass;
    }

    pub fn reset(&mut self) {
        self.count = 0.0;
        self.mass = 0.0;
        self.per_material.fill(0.0);
        if let Some(seen) = &mut self.seen {
            seen.clear();
        }
    }
}
