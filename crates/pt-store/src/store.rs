//! `TimedArrayStore`: flat per-quantity arrays over one `TimeIndex`.
//!
//! # Thread safety
//!
//! `TimedArrayStore` is `Send + Sync` and every read takes `&self`, so after
//! the solver has filled it the particle workers share it without locks.
//! All mutation takes `&mut self`:
//!
//! - [`set_value`](TimedArrayStore::set_value) writes a single sample.
//! - [`unit_series_mut`](TimedArrayStore::unit_series_mut) hands out one
//!   disjoint `&mut [f64]` per unit, so different units can be written from
//!   different threads at once (e.g. `par_bridge` or scoped threads).  Two
//!   writers can never reach the same sample index.
//!
//! The only interior mutability is the once-per-quantity "missing data"
//! warning flag.

use std::slice::ChunksExactMut;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use pt_core::{CalculationPolicy, PtError, PtResult, TimeIndex, Timestamp, UnitId};

use crate::Quantity;

// ── Series ────────────────────────────────────────────────────────────────────

/// One quantity's samples plus its per-unit aggregate caches.
pub(crate) struct Series {
    pub(crate) values: Vec<f64>,
    pub(crate) mean:   Vec<f64>,
    pub(crate) max:    Vec<f64>,
}

impl Series {
    pub(crate) fn new(values: Vec<f64>, unit_count: usize, time_len: usize) -> Self {
        let mut series = Self {
            values,
            mean: vec![0.0; unit_count],
            max:  vec![0.0; unit_count],
        };
        series.recompute(time_len);
        series
    }

    /// One O(N) pass per unit.  Non-finite samples are skipped.
    fn recompute(&mut self, time_len: usize) {
        for (unit, chunk) in self.values.chunks_exact(time_len).enumerate() {
            let mut sum = 0.0;
            let mut finite = 0usize;
            let mut max = f64::NEG_INFINITY;
            for &v in chunk.iter().filter(|v| v.is_finite()) {
                sum += v;
                finite += 1;
                max = max.max(v);
            }
            self.mean[unit] = if finite > 0 { sum / finite as f64 } else { 0.0 };
            self.max[unit] = if finite > 0 { max } else { 0.0 };
        }
    }
}

// ── TimedArrayStore ───────────────────────────────────────────────────────────

/// Hydraulic state for every spatial unit at every solver timestamp.
///
/// Build with [`TimedArrayStoreBuilder`](crate::TimedArrayStoreBuilder).
pub struct TimedArrayStore {
    time:        Arc<TimeIndex>,
    unit_count:  usize,
    series:      [Option<Series>; Quantity::COUNT],
    policy:      CalculationPolicy,

    /// Last time passed to `set_actual_time`, and its fractional index.
    actual_time: Timestamp,
    actual_fi:   f64,

    missing_warned: [AtomicBool; Quantity::COUNT],
}

impl TimedArrayStore {
    pub(crate) fn new(
        time:       Arc<TimeIndex>,
        unit_count: usize,
        series:     [Option<Series>; Quantity::COUNT],
        policy:     CalculationPolicy,
    ) -> Self {
        let actual_time = time.first();
        let actual_fi = time.fractional_index_of(actual_time);
        Self {
            time,
            unit_count,
            series,
            policy,
            actual_time,
            actual_fi,
            missing_warned: std::array::from_fn(|_| AtomicBool::new(false)),
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

    /// Number of timestamps N.
    #[inline]
    pub fn time_len(&self) -> usize {
        self.time.len()
    }

    /// Length of every flat array: `unit_count * N`.
    #[inline]
    pub fn sample_count(&self) -> usize {
        self.unit_count * self.time.len()
    }

    /// `true` if the solver supplied (or the builder zero-filled) `q`.
    #[inline]
    pub fn has(&self, q: Quantity) -> bool {
        self.series[q.slot()].is_some()
    }

    pub fn quantities(&self) -> impl Iterator<Item = Quantity> + '_ {
        Quantity::ALL.into_iter().filter(|&q| self.has(q))
    }

    // ── Index helpers ─────────────────────────────────────────────────────

    /// `unit * N + temporal_index`, with both coordinates clamped into range.
    ///
    /// Never returns an index `>= sample_count()`.
    #[inline]
    pub fn sample_index(&self, unit: UnitId, temporal_index: usize) -> usize {
        let n = self.time.len();
        let u = unit.index().min(self.unit_count - 1);
        u * n + temporal_index.min(n - 1)
    }

    /// Unclamped variant of [`sample_index`](Self::sample_index).
    pub fn try_sample_index(&self, unit: UnitId, temporal_index: usize) -> PtResult<usize> {
        let n = self.time.len();
        let index = unit.index().saturating_mul(n).saturating_add(temporal_index);
        if unit.index() >= self.unit_count || temporal_index >= n {
            return Err(PtError::IndexOutOfRange { index, len: self.sample_count() });
        }
        Ok(index)
    }

    // ── Raw reads ─────────────────────────────────────────────────────────

    /// Raw sample, independent of the active policy.  Out-of-range
    /// coordinates clamp; a missing quantity reads as 0.
    #[inline]
    pub fn value_at(&self, q: Quantity, unit: UnitId, temporal_index: usize) -> f64 {
        match self.series(q) {
            Some(s) => s.values[self.sample_index(unit, temporal_index)],
            None    => 0.0,
        }
    }

    /// Checked raw read: errors instead of clamping or substituting.
    pub fn try_value_at(&self, q: Quantity, unit: UnitId, temporal_index: usize) -> PtResult<f64> {
        let index = self.try_sample_index(unit, temporal_index)?;
        self.series[q.slot()]
            .as_ref()
            .map(|s| s.values[index])
            .ok_or_else(|| PtError::MissingHydraulicData(q.to_string()))
    }

    /// One unit's whole series, or `None` if `q` is missing or `unit` is out
    /// of range.
    pub fn unit_series(&self, q: Quantity, unit: UnitId) -> Option<&[f64]> {
        if unit.index() >= self.unit_count {
            return None;
        }
        let n = self.time.len();
        let start = unit.index() * n;
        self.series[q.slot()].as_ref().map(|s| &s.values[start..start + n])
    }

    /// Cached mean of the unit's whole series.
    #[inline]
    pub fn mean(&self, q: Quantity, unit: UnitId) -> f64 {
        self.series(q)
            .map(|s| s.mean[unit.index().min(self.unit_count - 1)])
            .unwrap_or(0.0)
    }

    /// Cached maximum of the unit's whole series.
    #[inline]
    pub fn maximum(&self, q: Quantity, unit: UnitId) -> f64 {
        self.series(q)
            .map(|s| s.max[unit.index().min(self.unit_count - 1)])
            .unwrap_or(0.0)
    }

    // ── Policy reads ──────────────────────────────────────────────────────

    pub fn policy(&self) -> CalculationPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: CalculationPolicy) {
        self.policy = policy;
    }

    /// Fix the time used by [`current_value`](Self::current_value).
    pub fn set_actual_time(&mut self, t: Timestamp) {
        self.actual_time = t;
        self.actual_fi = self.time.fractional_index_of(t);
    }

    pub fn actual_time(&self) -> Timestamp {
        self.actual_time
    }

    /// Guard-banded fractional index of the actual time.
    pub fn actual_fractional_index(&self) -> f64 {
        self.actual_fi
    }

    /// Value of `q` for `unit` at the actual time under the active policy.
    #[inline]
    pub fn current_value(&self, q: Quantity, unit: UnitId) -> f64 {
        self.read(q, unit, self.actual_fi, self.policy)
    }

    /// Like [`current_value`](Self::current_value) with an explicit policy.
    #[inline]
    pub fn current_value_with(&self, q: Quantity, unit: UnitId, policy: CalculationPolicy) -> f64 {
        self.read(q, unit, self.actual_fi, policy)
    }

    /// Stateless read at an arbitrary time, for workers that advance on
    /// their own sub-step clock.
    #[inline]
    pub fn value_at_time(
        &self,
        q:      Quantity,
        unit:   UnitId,
        t:      Timestamp,
        policy: CalculationPolicy,
    ) -> f64 {
        self.read(q, unit, self.time.fractional_index_of(t), policy)
    }

    fn read(&self, q: Quantity, unit: UnitId, fi: f64, policy: CalculationPolicy) -> f64 {
        let Some(series) = self.series(q) else {
            return 0.0;
        };
        let last = self.time.len() - 1;
        let i0 = (fi.floor().max(0.0) as usize).min(last);

        match policy {
            CalculationPolicy::Step => series.values[self.sample_index(unit, i0)],
            CalculationPolicy::LinearInterpolate => {
                let s0 = self.sample_index(unit, i0);
                let v0 = series.values[s0];
                // No lookahead past the final sample.
                if i0 >= last {
                    return v0;
                }
                let v1 = series.values[s0 + 1];
                let frac = fi - i0 as f64;
                v0 + (v1 - v0) * frac
            }
            CalculationPolicy::Mean    => series.mean[unit.index().min(self.unit_count - 1)],
            CalculationPolicy::Maximum => series.max[unit.index().min(self.unit_count - 1)],
        }
    }

    // ── Writes ────────────────────────────────────────────────────────────

    /// Overwrite one sample.
    ///
    /// Does not refresh the Mean/Maximum caches; call
    /// [`recompute_aggregates`](Self::recompute_aggregates) once the batch of
    /// writes is done.
    pub fn set_value(
        &mut self,
        q:              Quantity,
        unit:           UnitId,
        temporal_index: usize,
        value:          f64,
    ) -> PtResult<()> {
        let index = self.try_sample_index(unit, temporal_index)?;
        let series = self.series[q.slot()]
            .as_mut()
            .ok_or_else(|| PtError::MissingHydraulicData(q.to_string()))?;
        series.values[index] = value;
        Ok(())
    }

    /// Disjoint mutable per-unit series of `q`, in `UnitId` order.
    ///
    /// Returns `None` if `q` is missing.
    pub fn unit_series_mut(&mut self, q: Quantity) -> Option<ChunksExactMut<'_, f64>> {
        let n = self.time.len();
        self.series[q.slot()]
            .as_mut()
            .map(|s| s.values.chunks_exact_mut(n))
    }

    /// Rebuild the Mean/Maximum caches of `q` from its current samples.
    pub fn recompute_aggregates(&mut self, q: Quantity) {
        let n = self.time.len();
        if let Some(s) = self.series[q.slot()].as_mut() {
            s.recompute(n);
        }
    }

    pub fn recompute_all_aggregates(&mut self) {
        for q in Quantity::ALL {
            self.recompute_aggregates(q);
        }
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// Series of `q`, warning once per quantity when it is missing.
    #[inline]
    fn series(&self, q: Quantity) -> Option<&Series> {
        let series = self.series[q.slot()].as_ref();
        let flag = &self.missing_warned[q.slot()];
        if series.is_none() && !flag.load(Ordering::Relaxed) && !flag.swap(true, Ordering::Relaxed) {
            log::warn!("hydraulic quantity {q} was never supplied; reading it as 0");
        }
        series
    }
}
