//! The `OutputWriter` trait implemented by all backend writers.

use crate::{IntervalSummaryRow, MeasurementRow, OutputResult};

/// Trait implemented by the CSV and SQLite writers.
///
/// Errors surface to the observer, which stores the first one for
/// [`ScenarioOutputObserver::take_error`](crate::ScenarioOutputObserver::take_error).
pub trait OutputWriter {
    /// Write a batch of per-unit measurement rows.
    fn write_measurements(&mut self, rows: &[MeasurementRow]) -> OutputResult<()>;

    /// Write one interval summary row.
    fn write_interval_summary(&mut self, row: &IntervalSummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
