//! Mass-conserving discretization of one release curve into particles.
//!
//! Per interval `i` with mass `m_i`:
//!
//! 1. `reservoir += m_i`.  The reservoir is the mass computed so far that has
//!    not yet been turned into particles.
//! 2. A negative reservoir halts the curve ([`InjectError::NegativeReservoir`]).
//! 3. `n = floor(reservoir / mass_per_particle)`.
//! 4. `n > 0`: emit `n` particles at `t_i + (j + 0.5) * (t_{i+1} - t_i) / n`,
//!    each carrying `reservoir / n`.  The whole reservoir is emitted, so the
//!    per-particle mass follows the actual interval mass, not the nominal one,
//!    and rounding never accumulates.
//! 5. `n == 0`: the reservoir carries into the next interval.  At
//!    [`finish`](CurveDiscretizer::finish) a positive remainder becomes
//!    exactly one particle at the midpoint of the last interval.
//!
//! The sum of emitted masses therefore equals the integral of the curve up to
//! floating-point rounding.

use pt_core::{MaterialId, ParticleId, Timestamp, UnitId};

use crate::curve::{MassCurve, ReleaseInterval};
use crate::error::{InjectError, InjectResult};
use crate::record::InjectionRecord;

/// Relative slack when flooring `reservoir / mass_per_particle`, so that a
/// ratio of `4.9999999999` from float noise still yields 5 particles.
const FLOOR_TOLERANCE: f64 = 1e-9;

/// Streaming discretizer for one unit's curve.
///
/// Feed intervals in time order with [`push_interval`](Self::push_interval)
/// and call [`finish`](Self::finish) after the last one.
#[derive(Debug)]
pub struct CurveDiscretizer {
    unit:              UnitId,
    material:          MaterialId,
    mass_per_particle: f64,
    reservoir:         f64,
    intervals_seen:    usize,
    last:              Option<ReleaseInterval>,
    emitted_mass:      f64,
    emitted:           usize,
    halted:            bool,
}

/// Result of discretizing a whole curve.
#[derive(Debug, Default)]
pub struct CurveOutcome {
    pub emitted:      usize,
    pub emitted_mass: f64,
    /// Set if the curve was cut short by a negative reservoir.
    pub warning:      Option<InjectError>,
}

impl CurveDiscretizer {
    /// # Errors
    ///
    /// [`InjectError::InvalidMassPerParticle`] unless `mass_per_particle` is
    /// positive and finite.
    pub fn new(unit: UnitId, material: MaterialId, mass_per_particle: f64) -> InjectResult<Self> {
        if !(mass_per_particle.is_finite() && mass_per_particle > 0.0) {
            return Err(InjectError::InvalidMassPerParticle(mass_per_particle));
        }
        Ok(Self {
            unit,
            material,
            mass_per_particle,
            reservoir: 0.0,
            intervals_seen: 0,
            last: None,
            emitted_mass: 0.0,
            emitted: 0,
            halted: false,
        })
    }

    /// Mass carried forward, not yet emitted.
    pub fn reservoir(&self) -> f64 {
        self.reservoir
    }

    pub fn emitted_mass(&self) -> f64 {
        self.emitted_mass
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// `true` once a negative reservoir stopped this curve.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Add one interval's mass and emit the particles it completes.
    ///
    /// Returns the number of records appended to `out`.  After a
    /// [`InjectError::NegativeReservoir`] every later call is a no-op.
    pub fn push_interval(
        &mut self,
        interval: &ReleaseInterval,
        out:      &mut Vec<InjectionRecord>,
    ) -> InjectResult<usize> {
        if self.halted {
            return Ok(0);
        }
        let index = self.intervals_seen;
        self.intervals_seen += 1;
        self.last = Some(*interval);
        self.reservoir += interval.amount;

        if self.reservoir < 0.0 {
            self.halted = true;
            return Err(InjectError::NegativeReservoir {
                unit:      self.unit,
                interval:  index,
                reservoir: self.reservoir,
            });
        }

        let ratio = self.reservoir / self.mass_per_particle;
        let n = (ratio * (1.0 + FLOOR_TOLERANCE)).floor() as usize;
        if n == 0 {
            return Ok(0);
        }

        let mass = self.reservoir / n as f64;
        out.reserve(n);
        for j in 0..n {
            let frac = (j as f64 + 0.5) / n as f64;
            out.push(self.record(interval.start.lerp(interval.end, frac), mass));
        }
        self.emitted_mass += self.reservoir;
        self.emitted += n;
        self.reservoir = 0.0;
        Ok(n)
    }

    /// Emit the remainder, if any, as one particle at the midpoint of the last
    /// interval.  Returns the number of records appended (0 or 1); calling it
    /// again appends nothing.
    pub fn finish(&mut self, out: &mut Vec<InjectionRecord>) -> usize {
        if self.halted || self.reservoir <= 0.0 {
            return 0;
        }
        let Some(last) = self.last else {
            return 0;
        };
        out.push(self.record(last.midpoint(), self.reservoir));
        self.emitted_mass += self.reservoir;
        self.emitted += 1;
        self.reservoir = 0.0;
        1
    }

    /// Discretize a whole curve.
    pub fn discretize(
        curve:             &MassCurve,
        mass_per_particle: f64,
        out:               &mut Vec<InjectionRecord>,
    ) -> InjectResult<CurveOutcome> {
        let mut disc = CurveDiscretizer::new(curve.unit, curve.material, mass_per_particle)?;
        let mut warning = None;
        for interval in &curve.intervals {
            match disc.push_interval(interval, out) {
                Ok(_) => {}
                Err(e @ InjectError::NegativeReservoir { .. }) => {
                    warning = Some(e);
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        disc.finish(out);
        Ok(CurveOutcome {
            emitted: disc.emitted,
            emitted_mass: disc.emitted_mass,
            warning,
        })
    }

    #[inline]
    fn record(&self, created_at: Timestamp, mass: f64) -> InjectionRecord {
        InjectionRecord {
            id: ParticleId::INVALID,
            material: self.material,
            mass,
            created_at,
            unit: self.unit,
        }
    }
}
