//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! two tables: `measurements` and `interval_summaries`.

use std::path::Path;

use rusqlite::Connection;

use crate::{IntervalSummaryRow, MeasurementRow, OutputResult};
use crate::writer::OutputWriter;

/// Writes scenario output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS measurements (
                 temporal_index INTEGER NOT NULL,
                 time_ms        INTEGER NOT NULL,
                 unit           INTEGER NOT NULL,
                 samples        INTEGER NOT NULL,
                 visit_count    REAL    NOT NULL,
                 mass           REAL    NOT NULL,
                 volume         REAL    NOT NULL,
                 concentration  REAL    NOT NULL,
                 PRIMARY KEY (temporal_index, unit)
             );
             CREATE TABLE IF NOT EXISTS interval_summaries (
                 interval    INTEGER PRIMARY KEY,
                 start_ms    INTEGER NOT NULL,
                 end_ms      INTEGER NOT NULL,
                 released    INTEGER NOT NULL,
                 exited      INTEGER NOT NULL,
                 active      INTEGER NOT NULL,
                 active_mass REAL    NOT NULL,
                 exited_mass REAL    NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_measurements(&mut self, rows: &[MeasurementRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR REPLACE INTO measurements \
                 (temporal_index, time_ms, unit, samples, visit_count, mass, volume, concentration) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.temporal_index,
                    row.time_ms,
                    row.unit,
                    row.samples,
                    row.visit_count,
                    row.mass,
                    row.volume,
                    row.concentration,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_interval_summary(&mut self, row: &IntervalSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO interval_summaries \
             (interval, start_ms, end_ms, released, exited, active, active_mass, exited_mass) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                row.interval,
                row.start_ms,
                row.end_ms,
                row.released as i64,
                row.exited as i64,
                row.active as i64,
                row.active_mass,
                row.exited_mass,
            ],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
