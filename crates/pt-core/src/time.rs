//! Scenario time model.
//!
//! # Design
//!
//! Absolute time is a [`Timestamp`]: integer milliseconds since the Unix
//! epoch, as delivered by the hydraulic solver.  The solver's output grid is
//! a [`TimeIndex`], an immutable strictly increasing series of N ≥ 2
//! timestamps.  Every time-indexed array in the workspace is laid out over
//! one `TimeIndex`:
//!
//!   sample_index = unit * N + temporal_index
//!
//! Two conversions from absolute time are provided:
//!
//! - [`TimeIndex::index_of`]: integer index, `floor((t - t0) * (N-1) / duration)`
//!   clamped to `[0, N-1]`.  Exact: evaluated in `i128`.
//! - [`TimeIndex::fractional_index_of`]: the same ratio without flooring,
//!   clamped to `[GUARD_BAND, N-1-GUARD_BAND]`.
//!
//! The guard band is a contract, not a rounding artefact: linear
//! interpolation reads `floor(i)` *and* `floor(i) + 1`, so a fractional index
//! of exactly `N-1` would make the lookahead read past the end of the series.
//! With the guard band, `floor(fractional_index_of(t)) + 1 < N` for every `t`.
//!
//! The ratio assumes near-uniform spacing, as the solver output is; the
//! index math itself never requires it.

use std::fmt;

use crate::{PtError, PtResult};

/// Distance kept between a fractional index and both ends of the series.
pub const GUARD_BAND: f64 = 1e-6;

// ── Timestamp ─────────────────────────────────────────────────────────────────

/// Absolute time in milliseconds since the Unix epoch.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    #[inline]
    pub fn from_secs(secs: i64) -> Timestamp {
        Timestamp(secs * 1_000)
    }

    #[inline]
    pub fn as_millis(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000.0
    }

    /// Milliseconds elapsed from `earlier` to `self` (negative if `earlier`
    /// is later).
    #[inline]
    pub fn since(self, earlier: Timestamp) -> i64 {
        self.0 - earlier.0
    }

    /// The timestamp a fraction `frac` of the way from `self` to `end`,
    /// rounded to the nearest millisecond.
    #[inline]
    pub fn lerp(self, end: Timestamp, frac: f64) -> Timestamp {
        Timestamp(self.0 + ((end.0 - self.0) as f64 * frac).round() as i64)
    }
}

impl std::ops::Add<i64> for Timestamp {
    type Output = Timestamp;
    #[inline]
    fn add(self, rhs: i64) -> Timestamp {
        Timestamp(self.0 + rhs)
    }
}

impl std::ops::Sub for Timestamp {
    type Output = i64;
    #[inline]
    fn sub(self, rhs: Timestamp) -> i64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

// ── TimeIndex ─────────────────────────────────────────────────────────────────

/// Immutable, strictly increasing timestamp series shared by every array laid
/// out over the same solver output grid.
///
/// Wrap in an `Arc` to share between the hydraulic store and the measurement
/// container.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeIndex {
    stamps:   Vec<Timestamp>,
    duration: i64,
}

impl TimeIndex {
    /// Validate and wrap a timestamp series.
    ///
    /// # Errors
    ///
    /// [`PtError::InvalidTimeSeries`] if the series has fewer than two points
    /// or is not strictly increasing.
    pub fn new(stamps: Vec<Timestamp>) -> PtResult<Self> {
        if stamps.len() < 2 {
            return Err(PtError::InvalidTimeSeries(format!(
                "need at least 2 timestamps, got {}",
                stamps.len()
            )));
        }
        if let Some(i) = stamps.windows(2).position(|w| w[1] <= w[0]) {
            return Err(PtError::InvalidTimeSeries(format!(
                "timestamps not strictly increasing at position {}: {} then {}",
                i + 1,
                stamps[i],
                stamps[i + 1]
            )));
        }
        let duration = stamps[stamps.len() - 1] - stamps[0];
        Ok(Self { stamps, duration })
    }

    /// Convenience constructor from raw milliseconds.
    pub fn from_millis(millis: &[i64]) -> PtResult<Self> {
        Self::new(millis.iter().copied().map(Timestamp).collect())
    }

    /// Uniform series of `len` points starting at `start`, `step_ms` apart.
    pub fn uniform(start: Timestamp, step_ms: i64, len: usize) -> PtResult<Self> {
        if step_ms <= 0 {
            return Err(PtError::InvalidTimeSeries(format!(
                "step must be positive, got {step_ms} ms"
            )));
        }
        Self::new((0..len as i64).map(|i| start + i * step_ms).collect())
    }

    /// Number of timestamps N.  Always ≥ 2.
    #[inline]
    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    #[inline]
    pub fn first(&self) -> Timestamp {
        self.stamps[0]
    }

    #[inline]
    pub fn last(&self) -> Timestamp {
        self.stamps[self.stamps.len() - 1]
    }

    /// `t[N-1] - t[0]` in milliseconds.  Always > 0.
    #[inline]
    pub fn duration_ms(&self) -> i64 {
        self.duration
    }

    /// Timestamp at `index`, clamped to the last point.
    #[inline]
    pub fn stamp(&self, index: usize) -> Timestamp {
        self.stamps[index.min(self.stamps.len() - 1)]
    }

    pub fn stamps(&self) -> &[Timestamp] {
        &self.stamps
    }

    /// Number of intervals between consecutive timestamps (N-1).
    #[inline]
    pub fn interval_count(&self) -> usize {
        self.stamps.len() - 1
    }

    /// `(t[i], t[i+1])`, or `None` past the last interval.
    #[inline]
    pub fn interval(&self, i: usize) -> Option<(Timestamp, Timestamp)> {
        if i + 1 < self.stamps.len() {
            Some((self.stamps[i], self.stamps[i + 1]))
        } else {
            None
        }
    }

    /// `true` if `t` lies within `[t0, t[N-1]]`.
    #[inline]
    pub fn contains(&self, t: Timestamp) -> bool {
        t >= self.first() && t <= self.last()
    }

    /// Integer temporal index of `t`, clamped to `[0, N-1]`.
    pub fn index_of(&self, t: Timestamp) -> usize {
        let last = self.stamps.len() - 1;
        let num = (t.0 as i128 - self.first().0 as i128) * last as i128;
        let i = num.div_euclid(self.duration as i128);
        i.clamp(0, last as i128) as usize
    }

    /// Fractional temporal index of `t`, clamped to
    /// `[GUARD_BAND, N-1-GUARD_BAND]`.
    ///
    /// `floor(result) + 1` is always a valid array index.
    pub fn fractional_index_of(&self, t: Timestamp) -> f64 {
        let last = (self.stamps.len() - 1) as f64;
        let raw = (t.0 as i128 - self.first().0 as i128) as f64 * last / self.duration as f64;
        raw.clamp(GUARD_BAND, last - GUARD_BAND)
    }
}
