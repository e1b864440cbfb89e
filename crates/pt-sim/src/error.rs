use pt_core::PtError;
use pt_inject::InjectError;
use pt_measure::MeasureError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("scenario configuration error: {0}")]
    Config(String),

    /// An injection record names a unit or material the scenario does not
    /// have.
    #[error("injection record {index}: {what} {value} out of range (limit {limit})")]
    RecordOutOfRange {
        index: usize,
        what:  &'static str,
        value: usize,
        limit: usize,
    },

    #[error("failed to build worker thread pool: {0}")]
    ThreadPool(String),

    #[error(transparent)]
    Core(#[from] PtError),

    #[error(transparent)]
    Inject(#[from] InjectError),

    #[error(transparent)]
    Measure(#[from] MeasureError),
}

pub type SimResult<T> = Result<T, SimError>;
