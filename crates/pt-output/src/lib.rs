//! `pt-output` — scenario output writers.
//!
//! Two backends are provided:
//!
//! | Feature   | Backend     | Files created                                      |
//! |-----------|-------------|----------------------------------------------------|
//! | *(none)*  | CSV         | `measurements.csv`, `interval_summaries.csv`       |
//! | `sqlite`  | SQLite      | `output.db`                                        |
//!
//! All backends implement [`OutputWriter`] and are driven by
//! [`ScenarioOutputObserver`], which implements `pt_sim::ScenarioObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pt_output::{CsvWriter, ScenarioOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = ScenarioOutputObserver::new(writer).skip_empty_units(true);
//! scenario.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::ScenarioOutputObserver;
pub use row::{IntervalSummaryRow, MeasurementRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
