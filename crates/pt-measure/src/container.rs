//! `MeasurementContainer`: persisted per-sample measurements of one scenario.
//!
//! Same flat layout as the hydraulic store: every per-sample array has length
//! `unit_count * N` and is indexed by `unit * N + temporal_index`.  Values are
//! stored as sums over all samples taken in an interval; the division by
//! `samples_per_interval[t]` happens at read time, so reading twice always
//! returns the same value.

use std::sync::Arc;

use pt_core::{MaterialId, TimeIndex, UnitId};

use crate::error::{MeasureError, MeasureResult};

pub struct MeasurementContainer {
    time:           Arc<TimeIndex>,
    unit_count:     usize,
    material_count: usize,

    visit_count:       Vec<f64>,
    mass_total:        Vec<f64>,
    /// `sample * material_count + material`.
    mass_per_material: Vec<f64>,
    sampled_volume:    Vec<f64>,
    /// Mass of the samples that had water; the concentration numerator.
    wet_mass:          Vec<f64>,
    /// One entry per temporal index.
    samples:           Vec<u32>,

    max_mass:          f64,
    max_concentration: f64,
}

impl MeasurementContainer {
    pub fn new(time: Arc<TimeIndex>, unit_count: usize, material_count: usize) -> Self {
        let n = time.len();
        let len = unit_count * n;
        Self {
            time,
            unit_count,
            material_count,
            visit_count:       vec![0.0; len],
            mass_total:        vec![0.0; len],
            mass_per_material: vec![0.0; len * material_count],
            sampled_volume:    vec![0.0; len],
            wet_mass:          vec![0.0; len],
            samples:           vec![0; n],
            max_mass:          0.0,
            max_concentration: 0.0,
        }
    }

    // ── Shape ─────────────────────────────────────────────────────────────

    pub fn time(&self) -> &Arc<TimeIndex> {
        &self.time
    }

    #[inline]
    pub fn unit_count(&self) -> usize {
        self.unit_count
    }

    #[inline]
    pub fn material_count(&self) -> usize {
        self.material_count
    }

    #[inline]
    pub fn time_len(&self) -> usize {
        self.time.len()
    }

    /// `unit * N + temporal_index`, both clamped into range.
    #[inline]
    pub fn sample_index(&self, unit: UnitId, temporal_index: usize) -> usize {
        let n = self.time.len();
        let u = unit.index().min(self.unit_count.saturating_sub(1));
        u * n + temporal_index.min(n - 1)
    }

    pub(crate) fn check_index(&self, temporal_index: usize) -> MeasureResult<()> {
        if temporal_index >= self.time.len() {
            return Err(MeasureError::TemporalIndexOutOfRange {
                index: temporal_index,
                len:   self.time.len(),
            });
        }
        Ok(())
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    /// Number of flushes that contributed to temporal index `t`.
    #[inline]
    pub fn samples(&self, temporal_index: usize) -> u32 {
        self.samples[temporal_index.min(self.samples.len() - 1)]
    }

    /// Summed visit weight over all samples of the interval.
    #[inline]
    pub fn visit_count(&self, unit: UnitId, temporal_index: usize) -> f64 {
        self.visit_count[self.sample_index(unit, temporal_index)]
    }

    /// Visit weight per sample; 0 if nothing was sampled.
    pub fn mean_visit_count(&self, unit: UnitId, temporal_index: usize) -> f64 {
        self.per_sample(self.visit_count(unit, temporal_index), temporal_index)
    }

    /// Mean mass [kg] observed in `unit` during the interval.
    pub fn mass(&self, unit: UnitId, temporal_index: usize) -> f64 {
        let s = self.sample_index(unit, temporal_index);
        self.per_sample(self.mass_total[s], temporal_index)
    }

    /// Mean mass of one material; 0 for an unknown material.
    pub fn material_mass(&self, unit: UnitId, material: MaterialId, temporal_index: usize) -> f64 {
        if material.index() >= self.material_count {
            return 0.0;
        }
        let s = self.sample_index(unit, temporal_index);
        let sum = self.mass_per_material[s * self.material_count + material.index()];
        self.per_sample(sum, temporal_index)
    }

    /// Mean sampled water volume [m³].
    pub fn mean_volume(&self, unit: UnitId, temporal_index: usize) -> f64 {
        let s = self.sample_index(unit, temporal_index);
        self.per_sample(self.sampled_volume[s], temporal_index)
    }

    /// Mean concentration [kg/m³] over the samples that had water.  Reads 0
    /// where no volume was sampled.
    pub fn concentration(&self, unit: UnitId, temporal_index: usize) -> f64 {
        let s = self.sample_index(unit, temporal_index);
        ratio(self.wet_mass[s], self.sampled_volume[s]).unwrap_or(0.0)
    }

    /// Like [`concentration`](Self::concentration) but reports a missing
    /// volume instead of reading 0.
    pub fn checked_concentration(&self, unit: UnitId, temporal_index: usize) -> MeasureResult<f64> {
        if unit.index() >= self.unit_count {
            return Err(MeasureError::UnitOutOfRange { unit, unit_count: self.unit_count });
        }
        self.check_index(temporal_index)?;
        let s = self.sample_index(unit, temporal_index);
        ratio(self.wet_mass[s], self.sampled_volume[s])
            .ok_or(MeasureError::DivisionByZeroVolume { unit, temporal_index })
    }

    /// Largest mean mass seen in any unit and interval.
    pub fn max_mass(&self) -> f64 {
        self.max_mass
    }

    /// Largest concentration seen in any unit and interval.
    pub fn max_concentration(&self) -> f64 {
        self.max_concentration
    }

    // ── Maintenance ───────────────────────────────────────────────────────

    /// Zero every sample and the running maxima.
    pub fn clear(&mut self) {
        self.visit_count.fill(0.0);
        self.mass_total.fill(0.0);
        self.mass_per_material.fill(0.0);
        self.sampled_volume.fill(0.0);
        self.wet_mass.fill(0.0);
        self.samples.fill(0);
        self.recompute_maxima();
    }

    /// Rebuild both maxima with a full pass over every sample.
    pub fn recompute_maxima(&mut self) {
        self.max_mass = 0.0;
        self.max_concentration = 0.0;
        for unit in 0..self.unit_count {
            for t in 0..self.time.len() {
                self.update_maxima(unit * self.time.len() + t, t);
            }
        }
    }

    // ── Flush path ────────────────────────────────────────────────────────

    /// Add one unit's interval tally to sample `s`.
    pub(crate) fn accumulate(&mut self, s: usize, count: f64, mass: f64, per_material: &[f64], volume: f64) {
        self.visit_count[s] += count;
        self.mass_total[s] += mass;
        let base = s * self.material_count;
        for (slot, m) in self.mass_per_material[base..base + self.material_count]
            .iter_mut()
            .zip(per_material)
        {
            *slot += m;
        }
        if volume.is_finite() && volume > 0.0 {
            self.sampled_volume[s] += volume;
            self.wet_mass[s] += mass;
        }
    }

    pub(crate) fn note_sample(&mut self, temporal_index: usize) {
        self.samples[temporal_index] += 1;
    }

    /// Fold sample `s` into the running maxima; non-finite values are ignored.
    pub(crate) fn update_maxima(&mut self, s: usize, temporal_index: usize) {
        let mass = self.per_sample(self.mass_total[s], temporal_index);
        if mass.is_finite() && mass > self.max_mass {
            self.max_mass = mass;
        }
        if let Some(c) = ratio(self.wet_mass[s], self.sampled_volume[s]) {
            if c > self.max_concentration {
                self.max_concentration = c;
            }
        }
    }

    #[inline]
    fn per_sample(&self, sum: f64, temporal_index: usize) -> f64 {
        match self.samples(temporal_index) {
            0 => 0.0,
            k => sum / k as f64,
        }
    }
}

/// `num / den` if `den` is a positive finite volume and the result is finite.
#[inline]
fn ratio(num: f64, den: f64) -> Option<f64> {
    if !(den.is_finite() && den > 0.0) {
        return None;
    }
    let r = num / den;
    r.is_finite().then_some(r)
}
