//! Release curves: ordered per-interval amounts for one spatial unit.

use pt_core::{MaterialId, Timestamp, UnitId};

use crate::error::{InjectError, InjectResult};

/// One `[start, end]` interval of a release curve.
///
/// `amount` is a mass [kg] or a water volume [m³] depending on the source
/// that owns the curve.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReleaseInterval {
    pub start:  Timestamp,
    pub end:    Timestamp,
    pub amount: f64,
}

impl ReleaseInterval {
    pub fn new(start: Timestamp, end: Timestamp, amount: f64) -> Self {
        Self { start, end, amount }
    }

    /// Interval midpoint, rounded to the millisecond.
    #[inline]
    pub fn midpoint(&self) -> Timestamp {
        self.start.lerp(self.end, 0.5)
    }

    #[inline]
    pub fn duration_ms(&self) -> i64 {
        self.end.since(self.start)
    }

    /// `end < start` and non-finite amounts are rejected.  Zero-length
    /// intervals are allowed.
    pub(crate) fn check(&self, unit: UnitId, interval: usize) -> InjectResult<()> {
        if self.end < self.start {
            return Err(InjectError::InvalidInterval {
                unit,
                interval,
                reason: format!("ends at {} before it starts at {}", self.end, self.start),
            });
        }
        if !self.amount.is_finite() {
            return Err(InjectError::InvalidInterval {
                unit,
                interval,
                reason: format!("non-finite amount {}", self.amount),
            });
        }
        Ok(())
    }
}

/// Check that every interval is well formed and that intervals do not go
/// back in time.
pub(crate) fn check_intervals(unit: UnitId, intervals: &[ReleaseInterval]) -> InjectResult<()> {
    for (i, iv) in intervals.iter().enumerate() {
        iv.check(unit, i)?;
        if i > 0 && iv.start < intervals[i - 1].start {
            return Err(InjectError::InvalidInterval {
                unit,
                interval: i,
                reason: "intervals are not ordered by start time".into(),
            });
        }
    }
    Ok(())
}

/// Mass [kg] released per interval into one unit: the common input of the
/// discretizer, whatever the source kind.
#[derive(Clone, Debug, PartialEq)]
pub struct MassCurve {
    pub unit:      UnitId,
    pub material:  MaterialId,
    pub intervals: Vec<ReleaseInterval>,
}

impl MassCurve {
    pub fn new(unit: UnitId, material: MaterialId, intervals: Vec<ReleaseInterval>) -> Self {
        Self { unit, material, intervals }
    }

    /// Integral of the curve [kg].
    pub fn total(&self) -> f64 {
        self.intervals.iter().map(|iv| iv.amount).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// The first interval at which the cumulative release drops below zero,
    /// as a [`InjectError::NegativeReservoir`].  This is where a discretizer
    /// that has emitted nothing yet would halt.
    pub fn first_deficit(&self) -> Option<InjectError> {
        let mut reservoir = 0.0;
        for (interval, iv) in self.intervals.iter().enumerate() {
            reservoir += iv.amount;
            if reservoir < 0.0 {
                return Some(InjectError::NegativeReservoir { unit: self.unit, interval, reservoir });
            }
        }
        None
    }

    pub fn span(&self) -> Option<(Timestamp, Timestamp)> {
        let first = self.intervals.first()?;
        let end = self.intervals.iter().map(|iv| iv.end).max().unwrap_or(first.end);
        Some((first.start, end))
    }
}
