use pt_core::UnitId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeasureError {
    /// Concentration requested where no water volume was sampled.  The plain
    /// read path reports 0 instead.
    #[error("no sampled volume for {unit} at temporal index {temporal_index}")]
    DivisionByZeroVolume { unit: UnitId, temporal_index: usize },

    #[error("{unit} out of range ({unit_count} units)")]
    UnitOutOfRange { unit: UnitId, unit_count: usize },

    #[error("temporal index {index} out of range (len {len})")]
    TemporalIndexOutOfRange { index: usize, len: usize },

    #[error("{what} mismatch: aggregator has {expected}, container has {got}")]
    ShapeMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },
}

pub type MeasureResult<T> = Result<T, MeasureError>;
