//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `PtError` as one variant
//! via `#[from]`.  Several kinds here are *recoverable* on the hot path: the
//! stores clamp or substitute instead of returning them, and only the checked
//! (`try_*`) accessors and constructors surface them as `Err`.

use thiserror::Error;

/// The top-level error type for `pt-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum PtError {
    /// Fewer than two timestamps, or a series that is not strictly increasing.
    #[error("invalid time series: {0}")]
    InvalidTimeSeries(String),

    /// A sample index outside `0..len`.  Hot-path reads clamp instead.
    #[error("sample index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// A hydraulic quantity the scenario needs was never supplied.
    #[error("missing hydraulic data: {0}")]
    MissingHydraulicData(String),

    /// A supplied array does not match `unit_count * time_len`.
    #[error("{what} has {got} values, expected {expected}")]
    ShapeMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `pt-*` crates.
pub type PtResult<T> = Result<T, PtError>;
