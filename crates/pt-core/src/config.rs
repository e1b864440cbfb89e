//! Scenario configuration and the policy enums it selects between.
//!
//! Typically loaded from a JSON file by the application crate (with the
//! `serde` feature) and passed to the scenario builder.

use crate::{PtError, PtResult};

// ── CalculationPolicy ─────────────────────────────────────────────────────────

/// How a time-indexed store turns its series into a "current value".
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CalculationPolicy {
    /// Value at `floor(fractional_index)`.
    Step,
    /// Linear blend of the two samples around the fractional index.
    #[default]
    LinearInterpolate,
    /// Mean of the unit's whole series (cached).
    Mean,
    /// Maximum of the unit's whole series (cached).
    Maximum,
}

// ── Discipline ────────────────────────────────────────────────────────────────

/// Concurrency discipline of the measurement aggregator.
///
/// This is a user-visible accuracy/throughput trade-off: the aggregate is a
/// statistical sample, so losing the odd increment under contention is
/// acceptable for production runs but not for unit-test-grade checks.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Discipline {
    /// Per-unit exclusive lock.  Exact counts, higher contention.
    #[default]
    Synchronized,
    /// Relaxed atomic load-then-store.  Increments may be lost under races.
    Unsynchronized,
    /// Synchronized plus a per-unit particle identity set: a particle counts
    /// at most once per unit per interval.  Strictly slower.
    ExactlyOnce,
}

impl Discipline {
    pub fn as_str(self) -> &'static str {
        match self {
            Discipline::Synchronized   => "synchronized",
            Discipline::Unsynchronized => "unsynchronized",
            Discipline::ExactlyOnce    => "exactly-once",
        }
    }
}

impl std::fmt::Display for Discipline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── SamplingMode ──────────────────────────────────────────────────────────────

/// When the aggregator is sampled (visits recorded and flushed).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SamplingMode {
    /// Once per temporal index, at the last sub-step of the interval.
    /// Intermediate sub-steps are skipped.
    Timespot,
    /// Every sub-step; the container counts how many sub-samples contributed
    /// and divides by that count at read time.
    #[default]
    Continuous,
}

impl SamplingMode {
    /// `true` if sub-step `substep` (0-based) of an interval split into
    /// `substeps` sub-steps is a sampling point.
    #[inline]
    pub fn samples_at(self, substep: u32, substeps: u32) -> bool {
        match self {
            SamplingMode::Timespot   => substep + 1 == substeps.max(1),
            SamplingMode::Continuous => true,
        }
    }
}

// ── ScenarioConfig ────────────────────────────────────────────────────────────

/// Top-level scenario configuration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScenarioConfig {
    /// Total number of particles the injection scheduler may create.  Sets
    /// the nominal mass per particle: `total_mass / particle_budget`.
    pub particle_budget: u64,

    /// Sub-steps per solver interval.  1 = one particle step per interval.
    pub substeps_per_interval: u32,

    /// Measurement aggregator concurrency discipline.
    pub discipline: Discipline,

    /// When the measurement aggregator samples.
    pub sampling: SamplingMode,

    /// Read policy of the hydraulic store while particles are advanced.
    pub policy: CalculationPolicy,

    /// If set, only washoff area records whose label equals this string are
    /// injected.
    pub washoff_filter: Option<String>,

    /// Number of distinct pollutant materials tracked per unit.
    pub material_count: u16,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Worker thread count passed to Rayon.  `None` uses all logical cores.
    pub num_threads: Option<usize>,

    /// Report interval summaries to observers every N intervals.
    pub output_interval: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            particle_budget:       10_000,
            substeps_per_interval: 1,
            discipline:            Discipline::default(),
            sampling:              SamplingMode::default(),
            policy:                CalculationPolicy::default(),
            washoff_filter:        None,
            material_count:        1,
            seed:                  0,
            num_threads:           None,
            output_interval:       1,
        }
    }
}

impl ScenarioConfig {
    /// Reject settings that would make the run meaningless.
    pub fn validate(&self) -> PtResult<()> {
        if self.particle_budget == 0 {
            return Err(PtError::Config("particle_budget must be at least 1".into()));
        }
        if self.substeps_per_interval == 0 {
            return Err(PtError::Config("substeps_per_interval must be at least 1".into()));
        }
        if self.material_count == 0 {
            return Err(PtError::Config("material_count must be at least 1".into()));
        }
        if self.num_threads == Some(0) {
            return Err(PtError::Config("num_threads must be positive when set".into()));
        }
        Ok(())
    }
}
