//! `ScenarioOutputObserver<W>`: bridges `ScenarioObserver` to an `OutputWriter`.

use pt_core::UnitId;
use pt_measure::MeasurementContainer;
use pt_sim::{IntervalSummary, ScenarioObserver, ScenarioSummary};

use crate::row::{IntervalSummaryRow, MeasurementRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`ScenarioObserver`] that writes measurements and interval summaries to
/// any [`OutputWriter`] backend (CSV, SQLite, …).
///
/// Measurements are written for every temporal index completed since the
/// previous report, so a coarse `output_interval` loses no rows.
///
/// Errors from the writer are stored internally because `ScenarioObserver`
/// methods have no return value.  After `scenario.run()` returns, check for
/// errors with [`take_error`][Self::take_error].
pub struct ScenarioOutputObserver<W: OutputWriter> {
    writer:      W,
    skip_empty:  bool,
    /// First temporal index not yet written.
    next_index:  usize,
    last_error:  Option<OutputError>,
}

impl<W: OutputWriter> ScenarioOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            skip_empty: false,
            next_index: 1,
            last_error: None,
        }
    }

    /// Leave out units no particle visited.  Default: `false`.
    pub fn skip_empty_units(mut self, skip: bool) -> Self {
        self.skip_empty = skip;
        self
    }

    /// Take the stored write error (if any) after `scenario.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn write_through(&mut self, upto: usize, measurements: &MeasurementContainer) -> OutputResult<()> {
        let upto = upto.min(measurements.time_len().saturating_sub(1));
        let mut rows = Vec::with_capacity(measurements.unit_count());
        while self.next_index <= upto {
            rows.clear();
            rows.extend(
                (0..measurements.unit_count())
                    .map(|u| MeasurementRow::from_container(measurements, UnitId(u as u32), self.next_index))
                    .filter(|row| !(self.skip_empty && row.is_empty())),
            );
            self.writer.write_measurements(&rows)?;
            self.next_index += 1;
        }
        Ok(())
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                log::error!("output writer failed: {e}");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> ScenarioObserver for ScenarioOutputObserver<W> {
    fn on_interval_end(&mut self, summary: &IntervalSummary, measurements: &MeasurementContainer) {
        let result = self
            .writer
            .write_interval_summary(&IntervalSummaryRow::from(summary))
            .and_then(|()| self.write_through(summary.temporal_index, measurements));
        self.store_err(result);
    }

    fn on_scenario_end(&mut self, summary: &ScenarioSummary, measurements: &MeasurementContainer) {
        let result = self
            .write_through(summary.intervals, measurements)
            .and_then(|()| self.writer.finish());
        self.store_err(result);
    }
}
