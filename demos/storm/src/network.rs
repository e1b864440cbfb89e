//! Synthetic six-unit drainage network and storm hydrograph.
//!
//! ```text
//!   roof (0) ──▶ manhole A (2) ──┐
//!                                ├──▶ trunk pipe (4) ──▶ outfall (5) ──▶ river
//!   yard (1) ──▶ manhole B (3) ──┘
//! ```
//!
//! The solver output is faked with a triangular hydrograph peaking 20 minutes
//! into a one-hour event.

use std::sync::Arc;

use pt_core::{PtResult, TimeIndex, Timestamp, UnitId};
use pt_inject::ReleaseInterval;
use pt_store::{Quantity, TimedArrayStore, TimedArrayStoreBuilder};

pub const UNIT_COUNT: usize = 6;

pub const NAMES: [&str; UNIT_COUNT] = ["roof", "yard", "manhole A", "manhole B", "trunk pipe", "outfall"];

/// Downstream neighbour of each unit; `None` drains out of the network.
pub const DOWNSTREAM: [Option<UnitId>; UNIT_COUNT] = [
    Some(UnitId(2)),
    Some(UnitId(3)),
    Some(UnitId(4)),
    Some(UnitId(4)),
    Some(UnitId(5)),
    None,
];

/// Flow path length through each unit [m].
pub const LENGTH_M: [f64; UNIT_COUNT] = [15.0, 25.0, 3.0, 3.0, 120.0, 10.0];

/// Water volume held by each unit at peak flow [m³].
const PEAK_VOLUME_M3: [f64; UNIT_COUNT] = [0.4, 0.9, 1.5, 1.5, 18.0, 6.0];

/// Flow velocity at peak [m/s].
const PEAK_VELOCITY: [f64; UNIT_COUNT] = [0.15, 0.10, 0.6, 0.6, 1.4, 0.8];

const STEP_MS: i64 = 5 * 60_000;
const SAMPLES: usize = 13;
const PEAK_INDEX: usize = 4;

/// Relative storm intensity at temporal index `t`, in `[0, 1]`.
pub fn intensity(t: usize) -> f64 {
    if t <= PEAK_INDEX {
        t as f64 / PEAK_INDEX as f64
    } else {
        (SAMPLES - 1 - t) as f64 / (SAMPLES - 1 - PEAK_INDEX) as f64
    }
}

pub fn time_index() -> PtResult<Arc<TimeIndex>> {
    Ok(Arc::new(TimeIndex::uniform(Timestamp(0), STEP_MS, SAMPLES)?))
}

/// Volumes and velocities for the whole event.  A small base flow keeps the
/// pipes wet before and after the storm.
pub fn hydraulics(time: Arc<TimeIndex>) -> PtResult<TimedArrayStore> {
    TimedArrayStoreBuilder::new(time, UNIT_COUNT)
        .quantity_fn(Quantity::Volume, |u, t| PEAK_VOLUME_M3[u.index()] * (0.05 + 0.95 * intensity(t)))
        .quantity_fn(Quantity::Velocity, |u, t| PEAK_VELOCITY[u.index()] * (0.1 + 0.9 * intensity(t)))
        .build()
}

/// Rain volume [m³] falling on `area_m2` per solver interval, for a storm
/// dropping `total_mm` over the event.
pub fn runoff(time: &TimeIndex, area_m2: f64, total_mm: f64) -> Vec<ReleaseInterval> {
    let weights: Vec<f64> = (0..time.interval_count())
        .map(|i| 0.5 * (intensity(i) + intensity(i + 1)))
        .collect();
    let total_weight: f64 = weights.iter().sum();
    (0..time.interval_count())
        .filter_map(|i| time.interval(i).map(|(start, end)| (i, start, end)))
        .map(|(i, start, end)| {
            let depth_m = total_mm / 1000.0 * weights[i] / total_weight;
            ReleaseInterval::new(start, end, depth_m * area_m2)
        })
        .collect()
}
