//! Read-only scenario state passed to every particle step.

use pt_core::{CalculationPolicy, Timestamp, UnitId};
use pt_particle::ParticleStore;
use pt_store::{Quantity, TimedArrayStore};

/// A read-only snapshot of the scenario passed to every
/// [`ParticleModel::step`][crate::ParticleModel::step] call.
///
/// Built once per sub-step and shared immutably across all worker threads.
/// The hydraulic store's actual time is already set to `timestamp`.
pub struct StepContext<'a> {
    /// End of the sub-step being simulated.
    pub timestamp: Timestamp,

    /// Solver interval `[t_i, t_{i+1}]` containing the sub-step.
    pub interval: usize,

    /// Sub-step within the interval, `0..substeps_per_interval`.
    pub substep: u32,

    /// Sub-step length [ms].
    pub dt_ms: f64,

    pub hydraulics: &'a TimedArrayStore,

    pub particles: &'a ParticleStore,
}

impl<'a> StepContext<'a> {
    /// Value of `q` in `unit` at the sub-step time under the store's policy.
    #[inline]
    pub fn value(&self, q: Quantity, unit: UnitId) -> f64 {
        self.hydraulics.current_value(q, unit)
    }

    /// Like [`value`](Self::value) with an explicit policy.
    #[inline]
    pub fn value_with(&self, q: Quantity, unit: UnitId, policy: CalculationPolicy) -> f64 {
        self.hydraulics.current_value_with(q, unit, policy)
    }

    /// Sub-step length in seconds.
    #[inline]
    pub fn dt_secs(&self) -> f64 {
        self.dt_ms / 1_000.0
    }
}
