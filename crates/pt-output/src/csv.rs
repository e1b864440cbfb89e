//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `measurements.csv`
//! - `interval_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::{IntervalSummaryRow, MeasurementRow, OutputResult};
use crate::writer::OutputWriter;

/// Writes scenario output to two CSV files.
pub struct CsvWriter {
    measurements: Writer<File>,
    summaries:    Writer<File>,
    finished:     bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut measurements = Writer::from_path(dir.join("measurements.csv"))?;
        measurements.write_record([
            "temporal_index",
            "time_ms",
            "unit",
            "samples",
            "visit_count",
            "mass_kg",
            "volume_m3",
            "concentration_kg_m3",
        ])?;

        let mut summaries = Writer::from_path(dir.join("interval_summaries.csv"))?;
        summaries.write_record([
            "interval",
            "start_ms",
            "end_ms",
            "released",
            "exited",
            "active",
            "active_mass_kg",
            "exited_mass_kg",
        ])?;

        Ok(Self {
            measurements,
            summaries,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_measurements(&mut self, rows: &[MeasurementRow]) -> OutputResult<()> {
        for row in rows {
            self.measurements.write_record(&[
                row.temporal_index.to_string(),
                row.time_ms.to_string(),
                row.unit.to_string(),
                row.samples.to_string(),
                row.visit_count.to_string(),
                row.mass.to_string(),
                row.volume.to_string(),
                row.concentration.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_interval_summary(&mut self, row: &IntervalSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.interval.to_string(),
            row.start_ms.to_string(),
            row.end_ms.to_string(),
            row.released.to_string(),
            row.exited.to_string(),
            row.active.to_string(),
            row.active_mass.to_string(),
            row.exited_mass.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.measurements.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
