//! Fluent builder for [`TimedArrayStore`].
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use pt_core::{TimeIndex, UnitId};
//! use pt_store::{Quantity, TimedArrayStoreBuilder};
//!
//! let time = Arc::new(TimeIndex::from_millis(&[0, 60_000, 120_000]).unwrap());
//! let store = TimedArrayStoreBuilder::new(time, 2)
//!     .quantity(Quantity::Velocity, vec![0.0, 1.0, 2.0, 5.0, 5.0, 5.0])
//!     .require(Quantity::Volume)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(store.value_at(Quantity::Velocity, UnitId(1), 0), 5.0);
//! assert_eq!(store.value_at(Quantity::Volume, UnitId(1), 0), 0.0); // zero-filled
//! ```

use std::sync::Arc;

use pt_core::{CalculationPolicy, PtError, PtResult, TimeIndex, UnitId};

use crate::store::Series;
use crate::{Quantity, TimedArrayStore};

/// Collects solver arrays, validates their shape, and builds the store.
///
/// Every array is allocated exactly once at `unit_count * N`; the store never
/// resizes afterwards.
pub struct TimedArrayStoreBuilder {
    time:       Arc<TimeIndex>,
    unit_count: usize,
    supplied:   Vec<(Quantity, Vec<f64>)>,
    required:   Vec<Quantity>,
    policy:     CalculationPolicy,
}

impl TimedArrayStoreBuilder {
    pub fn new(time: Arc<TimeIndex>, unit_count: usize) -> Self {
        Self {
            time,
            unit_count,
            supplied: Vec::new(),
            required: Vec::new(),
            policy:   CalculationPolicy::default(),
        }
    }

    /// Supply the flat array of `q`, laid out `unit * N + temporal_index`.
    ///
    /// Supplying the same quantity twice keeps the last array.
    pub fn quantity(mut self, q: Quantity, values: Vec<f64>) -> Self {
        self.supplied.retain(|(k, _)| *k != q);
        self.supplied.push((q, values));
        self
    }

    /// Supply `q` by evaluating `f(unit, temporal_index)` for every sample.
    pub fn quantity_fn<F>(self, q: Quantity, mut f: F) -> Self
    where
        F: FnMut(UnitId, usize) -> f64,
    {
        let n = self.time.len();
        let values = (0..self.unit_count * n)
            .map(|i| f(UnitId((i / n) as u32), i % n))
            .collect();
        self.quantity(q, values)
    }

    /// Mark `q` as needed by the scenario.  If it is not supplied, `build`
    /// substitutes a zero-filled series and logs one warning.
    pub fn require(mut self, q: Quantity) -> Self {
        if !self.required.contains(&q) {
            self.required.push(q);
        }
        self
    }

    /// Read policy used by `current_value`.  Default: `LinearInterpolate`.
    pub fn policy(mut self, policy: CalculationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Validate shapes, zero-fill missing required quantities, and compute
    /// the Mean/Maximum caches.
    ///
    /// # Errors
    ///
    /// - [`PtError::Config`] if `unit_count` is 0.
    /// - [`PtError::ShapeMismatch`] if a supplied array is not
    ///   `unit_count * N` long.
    pub fn build(self) -> PtResult<TimedArrayStore> {
        if self.unit_count == 0 {
            return Err(PtError::Config("a timed array store needs at least one unit".into()));
        }
        let n = self.time.len();
        let expected = self.unit_count * n;

        let mut series: [Option<Series>; Quantity::COUNT] = std::array::from_fn(|_| None);

        for (q, values) in self.supplied {
            if values.len() != expected {
                return Err(PtError::ShapeMismatch {
                    expected,
                    got:  values.len(),
                    what: q.as_str(),
                });
            }
            series[q.slot()] = Some(Series::new(values, self.unit_count, n));
        }

        for q in self.required {
            if series[q.slot()].is_none() {
                log::warn!(
                    "{}",
                    PtError::MissingHydraulicData(format!("{q}; substituting a zero-filled series"))
                );
                series[q.slot()] = Some(Series::new(vec![0.0; expected], self.unit_count, n));
            }
        }

        Ok(TimedArrayStore::new(self.time, self.unit_count, series, self.policy))
    }
}
