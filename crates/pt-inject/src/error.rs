use pt_core::{PtError, UnitId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InjectError {
    /// More mass left the reservoir than entered it.  The remaining
    /// intervals of the unit are skipped; the schedule itself is still
    /// produced.
    #[error("negative reservoir ({reservoir} kg) in {unit} at release interval {interval}")]
    NegativeReservoir {
        unit:      UnitId,
        interval:  usize,
        reservoir: f64,
    },

    #[error("particle budget is zero")]
    ZeroBudget,

    #[error("invalid mass per particle: {0}")]
    InvalidMassPerParticle(f64),

    #[error("invalid release interval {interval} for {unit}: {reason}")]
    InvalidInterval {
        unit:     UnitId,
        interval: usize,
        reason:   String,
    },

    /// An area record with a non-positive or non-finite area.  Reported and
    /// contributes no mass.
    #[error("invalid area {area} m² for {unit}")]
    InvalidArea { unit: UnitId, area: f64 },

    #[error(transparent)]
    Core(#[from] PtError),
}

pub type InjectResult<T> = Result<T, InjectError>;
