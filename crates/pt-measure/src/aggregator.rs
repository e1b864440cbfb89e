//! `MeasurementAggregator`: concurrent per-interval visit accumulation.
//!
//! Workers call [`record_visit`](MeasurementAggregator::record_visit) through
//! a shared reference.  Once the parallel section has ended the driver, which
//! owns the aggregator, calls [`flush`](MeasurementAggregator::flush) and
//! [`reset`](MeasurementAggregator::reset).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use pt_core::{Discipline, UnitId};

use crate::container::MeasurementContainer;
use crate::error::{MeasureError, MeasureResult};
use crate::tally::{RelaxedF64, UnitTally};
use crate::visit::Visit;

enum Tallies {
    /// Synchronized and exactly-once disciplines.
    Locked(Vec<Mutex<UnitTally>>),
    /// Unsynchronized discipline.  `per_material` is `unit * materials + m`.
    Relaxed {
        count:        Vec<RelaxedF64>,
        mass:         Vec<RelaxedF64>,
        per_material: Vec<RelaxedF64>,
    },
}

pub struct MeasurementAggregator {
    discipline:     Discipline,
    unit_count:     usize,
    material_count: usize,
    tallies:        Tallies,
    dropped:        AtomicU64,
    /// Scratch row reused by `flush` in the relaxed discipline.
    scratch:        Vec<f64>,
}

impl MeasurementAggregator {
    pub fn new(discipline: Discipline, unit_count: usize, material_count: usize) -> Self {
        let tallies = match discipline {
            Discipline::Unsynchronized => Tallies::Relaxed {
                count:        (0..unit_count).map(|_| RelaxedF64::default()).collect(),
                mass:         (0..unit_count).map(|_| RelaxedF64::default()).collect(),
                per_material: (0..unit_count * material_count).map(|_| RelaxedF64::default()).collect(),
            },
            Discipline::Synchronized | Discipline::ExactlyOnce => {
                let track = discipline == Discipline::ExactlyOnce;
                Tallies::Locked(
                    (0..unit_count)
                        .map(|_| Mutex::new(UnitTally::new(material_count, track)))
                        .collect(),
                )
            }
        };
        Self {
            discipline,
            unit_count,
            material_count,
            tallies,
            dropped: AtomicU64::new(0),
            scratch: vec![0.0; material_count],
        }
    }

    #[inline]
    pub fn discipline(&self) -> Discipline {
        self.discipline
    }

    #[inline]
    pub fn unit_count(&self) -> usize {
        self.unit_count
    }

    #[inline]
    pub fn material_count(&self) -> usize {
        self.material_count
    }

    // ── Hot path ──────────────────────────────────────────────────────────

    /// Add one visit to the in-progress interval.
    ///
    /// Returns `false` if the visit was not counted: an unknown unit or
    /// material, a non-finite mass or weight, a zero weight, or (exactly-once
    /// discipline) a particle already counted in this unit.  Invalid visits
    /// are counted in [`dropped_visits`](Self::dropped_visits).
    pub fn record_visit(&self, visit: Visit) -> bool {
        let unit = visit.unit.index();
        let material = visit.material.index();
        if unit >= self.unit_count
            || material >= self.material_count
            || !visit.mass.is_finite()
            || !visit.weight.is_finite()
        {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            log::debug!(
                "dropping visit of {} to {} (material {}, mass {}, weight {})",
                visit.particle, visit.unit, visit.material, visit.mass, visit.weight
            );
            return false;
        }

        let weight = visit.weight.clamp(0.0, 1.0);
        if weight == 0.0 {
            // Nothing to count, and the particle must stay admissible.
            return false;
        }
        let mass = visit.mass * weight;

        match &self.tallies {
            Tallies::Locked(units) => {
                let mut tally = units[unit].lock().unwrap_or_else(PoisonError::into_inner);
                if !tally.admit(visit.particle) {
                    return false;
                }
                tally.add(material, weight, mass);
            }
            Tallies::Relaxed { count, mass: total, per_material } => {
                count[unit].add_lossy(weight);
                total[unit].add_lossy(mass);
                per_material[unit * self.material_count + material].add_lossy(mass);
            }
        }
        true
    }

    // ── Driver side ───────────────────────────────────────────────────────

    /// Add every unit's tally into sample `(unit, temporal_index)` of
    /// `container` and count one sample for that temporal index.
    ///
    /// Additive: flushing twice without [`reset`](Self::reset) counts the
    /// interval twice.  `sampled_volume[unit]` is the unit's water volume at
    /// the sampling time, the divisor for concentrations.
    ///
    /// # Errors
    ///
    /// Shape mismatches between aggregator, container and `sampled_volume`,
    /// or a temporal index outside the container.  Nothing is written on
    /// error.
    pub fn flush(
        &mut self,
        container:      &mut MeasurementContainer,
        temporal_index: usize,
        sampled_volume: &[f64],
    ) -> MeasureResult<()> {
        if container.unit_count() != self.unit_count {
            return Err(MeasureError::ShapeMismatch {
                expected: self.unit_count,
                got:      container.unit_count(),
                what:     "unit count",
            });
        }
        if container.material_count() != self.material_count {
            return Err(MeasureError::ShapeMismatch {
                expected: self.material_count,
                got:      container.material_count(),
                what:     "material count",
            });
        }
        if sampled_volume.len() != self.unit_count {
            return Err(MeasureError::ShapeMismatch {
                expected: self.unit_count,
                got:      sampled_volume.len(),
                what:     "sampled volume length",
            });
        }
        container.check_index(temporal_index)?;

        container.note_sample(temporal_index);
        let materials = self.material_count;
        match &mut self.tallies {
            Tallies::Locked(units) => {
                for (unit, tally) in units.iter_mut().enumerate() {
                    let tally = tally.get_mut().unwrap_or_else(PoisonError::into_inner);
                    let s = container.sample_index(UnitId(unit as u32), temporal_index);
                    container.accumulate(s, tally.count, tally.mass, &tally.per_material, sampled_volume[unit]);
                    container.update_maxima(s, temporal_index);
                }
            }
            Tallies::Relaxed { count, mass, per_material } => {
                for unit in 0..self.unit_count {
                    for (m, slot) in self.scratch.iter_mut().enumerate() {
                        *slot = per_material[unit * materials + m].get();
                    }
                    let s = container.sample_index(UnitId(unit as u32), temporal_index);
                    container.accumulate(
                        s,
                        count[unit].get(),
                        mass[unit].get(),
                        &self.scratch,
                        sampled_volume[unit],
                    );
                    container.update_maxima(s, temporal_index);
                }
            }
        }
        Ok(())
    }

    /// Zero all transient state.  The container is not touched.
    pub fn reset(&mut self) {
        match &mut self.tallies {
            Tallies::Locked(units) => {
                for tally in units.iter_mut() {
                    tally.get_mut().unwrap_or_else(PoisonError::into_inner).reset();
                }
            }
            Tallies::Relaxed { count, mass, per_material } => {
                count.iter_mut()
                    .chain(mass.iter_mut())
                    .chain(per_material.iter_mut())
                    .for_each(RelaxedF64::reset);
            }
        }
    }

    /// [`flush`](Self::flush) followed by [`reset`](Self::reset).  On error
    /// the transient state is kept.
    pub fn flush_and_reset(
        &mut self,
        container:      &mut MeasurementContainer,
        temporal_index: usize,
        sampled_volume: &[f64],
    ) -> MeasureResult<()> {
        self.flush(container, temporal_index, sampled_volume)?;
        self.reset();
        Ok(())
    }

    // ── Introspection ─────────────────────────────────────────────────────

    /// Visit weight accumulated for `unit` since the last reset.
    pub fn pending_count(&mut self, unit: UnitId) -> f64 {
        let u = unit.index();
        if u >= self.unit_count {
            return 0.0;
        }
        match &mut self.tallies {
            Tallies::Locked(units) => units[u].get_mut().unwrap_or_else(PoisonError::into_inner).count,
            Tallies::Relaxed { count, .. } => count[u].get(),
        }
    }

    /// Mass accumulated for `unit` since the last reset.
    pub fn pending_mass(&mut self, unit: UnitId) -> f64 {
        let u = unit.index();
        if u >= self.unit_count {
            return 0.0;
        }
        match &mut self.tallies {
            Tallies::Locked(units) => units[u].get_mut().unwrap_or_else(PoisonError::into_inner).mass,
            Tallies::Relaxed { mass, .. } => mass[u].get(),
        }
    }

    /// Invalid visits rejected since construction.
    pub fn dropped_visits(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
