//! Fluent builder for constructing `ParticleStore` + `ParticleRngs` in one
//! step.
//!
//! # Usage
//!
//! ```rust
//! use pt_particle::ParticleStoreBuilder;
//!
//! let (store, rngs) = ParticleStoreBuilder::new(/*seed=*/ 42)
//!     .capacity(10_000)
//!     .build();
//!
//! assert!(store.is_empty());
//! assert_eq!(rngs.seed(), 42);
//! ```

use pt_inject::InjectionRecord;

use crate::{ParticleRngs, ParticleStore};

/// Fluent builder for [`ParticleStore`] + [`ParticleRngs`].
///
/// Setting the capacity to the particle budget avoids reallocating the SoA
/// arrays while particles are released.
pub struct ParticleStoreBuilder<'a> {
    seed:     u64,
    capacity: usize,
    records:  &'a [InjectionRecord],
}

impl<'a> ParticleStoreBuilder<'a> {
    pub fn new(seed: u64) -> Self {
        Self { seed, capacity: 0, records: &[] }
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Particles to create up front, e.g. everything released at t0.
    pub fn records(mut self, records: &'a [InjectionRecord]) -> Self {
        self.records = records;
        self
    }

    pub fn build(self) -> (ParticleStore, ParticleRngs) {
        let capacity = self.capacity.max(self.records.len());
        let mut store = ParticleStore::with_capacity(capacity);
        let mut rngs = ParticleRngs::with_capacity(self.seed, capacity);
        for record in self.records {
            store.release(&mut rngs, record);
        }
        (store, rngs)
    }
}
