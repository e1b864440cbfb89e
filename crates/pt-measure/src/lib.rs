//! `pt-measure` — particle measurements per spatial unit and interval.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                 |
//! |-----------------|----------------------------------------------------------|
//! | [`visit`]       | `Visit`: one particle's presence in one unit            |
//! | [`tally`]       | `RelaxedF64`, `UnitTally`: per-unit transient counters  |
//! | [`aggregator`]  | `MeasurementAggregator` (record / flush / reset)         |
//! | [`container`]   | `MeasurementContainer` (persisted, flat per sample)      |
//! | [`error`]       | `MeasureError`, `MeasureResult<T>`                       |
//!
//! # Interval protocol
//!
//! ```text
//! loop over sub-steps:
//!   workers (parallel)  → aggregator.record_visit(&self, visit)
//!   barrier             → end of the parallel section
//!   driver (exclusive)  → aggregator.flush(&mut self, &mut container, t, volumes)
//!                         aggregator.reset(&mut self)
//! ```
//!
//! `record_visit` takes `&self`; `flush` and `reset` take `&mut self`.  The
//! borrow checker therefore guarantees that no visit is recorded while a
//! flush is in progress, which is the quiescence precondition of the
//! protocol.  The barrier itself is the caller's.

pub mod aggregator;
pub mod container;
pub mod error;
pub mod tally;
pub mod visit;

#[cfg(test)]
mod tests;

pub use aggregator::MeasurementAggregator;
pub use container::MeasurementContainer;
pub use error::{MeasureError, MeasureResult};
pub use pt_core::{Discipline, SamplingMode};
pub use visit::Visit;
