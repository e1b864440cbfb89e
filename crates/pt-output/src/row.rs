//! Plain data row types written by output backends.

use pt_core::UnitId;
use pt_measure::MeasurementContainer;
use pt_sim::IntervalSummary;

/// Per-sample means of one unit at one temporal index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementRow {
    pub temporal_index: u32,
    /// Timestamp of the temporal index [ms].
    pub time_ms:        i64,
    pub unit:           u32,
    /// Aggregator flushes behind the means.
    pub samples:        u32,
    pub visit_count:    f64,
    /// Mean mass [kg].
    pub mass:           f64,
    /// Mean sampled volume [m³].
    pub volume:         f64,
    /// Concentration [kg/m³]; 0 where no volume was sampled.
    pub concentration:  f64,
}

impl MeasurementRow {
    pub fn from_container(m: &MeasurementContainer, unit: UnitId, temporal_index: usize) -> Self {
        Self {
            temporal_index: temporal_index as u32,
            time_ms:        m.time().stamp(temporal_index).0,
            unit:           unit.0,
            samples:        m.samples(temporal_index),
            visit_count:    m.mean_visit_count(unit, temporal_index),
            mass:           m.mass(unit, temporal_index),
            volume:         m.mean_volume(unit, temporal_index),
            concentration:  m.concentration(unit, temporal_index),
        }
    }

    /// `true` if no particle was seen in the unit.
    pub fn is_empty(&self) -> bool {
        self.visit_count == 0.0
    }
}

/// Bookkeeping for one simulated interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalSummaryRow {
    pub interval:    u32,
    pub start_ms:    i64,
    pub end_ms:      i64,
    pub released:    u64,
    pub exited:      u64,
    pub active:      u64,
    pub active_mass: f64,
    pub exited_mass: f64,
}

impl From<&IntervalSummary> for IntervalSummaryRow {
    fn from(s: &IntervalSummary) -> Self {
        Self {
            interval:    s.interval as u32,
            start_ms:    s.start.0,
            end_ms:      s.end.0,
            released:    s.released as u64,
            exited:      s.exited as u64,
            active:      s.active as u64,
            active_mass: s.active_mass,
            exited_mass: s.exited_mass,
        }
    }
}
