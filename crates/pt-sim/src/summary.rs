//! Per-interval and whole-run bookkeeping handed to observers.

use pt_core::Timestamp;

/// What happened during one solver interval.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntervalSummary {
    pub interval:       usize,
    pub start:          Timestamp,
    pub end:            Timestamp,
    /// Temporal index the interval's measurements were flushed to.
    pub temporal_index: usize,
    /// Particles released during the interval.
    pub released:       usize,
    /// Particles that left the domain during the interval.
    pub exited:         usize,
    /// Active particles at the end of the interval.
    pub active:         usize,
    /// Mass of active particles at the end of the interval [kg].
    pub active_mass:    f64,
    /// Mass that has left the domain since the start of the run [kg].
    pub exited_mass:    f64,
    /// Aggregator flushes during the interval.
    pub samples:        u32,
    /// Visits rejected by the aggregator since the start of the run.
    pub dropped_visits: u64,
}

impl IntervalSummary {
    pub(crate) fn new(interval: usize, start: Timestamp, end: Timestamp) -> Self {
        Self {
            interval,
            start,
            end,
            temporal_index: interval + 1,
            released:       0,
            exited:         0,
            active:         0,
            active_mass:    0.0,
            exited_mass:    0.0,
            samples:        0,
            dropped_visits: 0,
        }
    }
}

/// Totals at the end of a run.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScenarioSummary {
    pub intervals:         usize,
    /// Particles in the schedule.
    pub scheduled:         usize,
    pub released:          usize,
    /// Scheduled particles whose creation time lies after the last timestamp.
    pub unreleased:        usize,
    pub exited:            usize,
    pub mass_per_particle: f64,
    pub scheduled_mass:    f64,
    pub active_mass:       f64,
    pub exited_mass:       f64,
    pub max_mass:          f64,
    pub max_concentration: f64,
    pub dropped_visits:    u64,
}

impl ScenarioSummary {
    /// Released mass not accounted for by active or exited particles,
    /// relative to the released mass.  Should stay at rounding level.
    pub fn mass_balance_error(&self, released_mass: f64) -> f64 {
        if released_mass == 0.0 {
            return 0.0;
        }
        ((self.active_mass + self.exited_mass - released_mass) / released_mass).abs()
    }
}
