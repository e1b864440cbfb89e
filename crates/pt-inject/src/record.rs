//! The particle-creation record the scheduler emits.

use pt_core::{MaterialId, ParticleId, Timestamp, UnitId};

/// Description of one particle to create.  Never mutated after the schedule
/// is assembled.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InjectionRecord {
    /// Dense id in emission order.  [`ParticleId::INVALID`] until the
    /// scheduler assigns it; streaming callers of the discretizer assign
    /// their own.
    pub id:         ParticleId,
    pub material:   MaterialId,
    /// Particle mass [kg].
    pub mass:       f64,
    pub created_at: Timestamp,
    pub unit:       UnitId,
}

impl InjectionRecord {
    /// Emission order: creation time, then target unit.
    #[inline]
    pub fn order_key(&self) -> (Timestamp, UnitId) {
        (self.created_at, self.unit)
    }
}
