//! Scenario observer trait for progress reporting and data collection.

use pt_core::Timestamp;
use pt_inject::InjectionRecord;
use pt_measure::MeasurementContainer;

use crate::{IntervalSummary, ScenarioSummary};

/// Callbacks invoked by [`Scenario::run`][crate::Scenario::run] at key points
/// in the interval loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct Progress;
///
/// impl ScenarioObserver for Progress {
///     fn on_interval_end(&mut self, s: &IntervalSummary, _m: &MeasurementContainer) {
///         println!("interval {}: {} active, {:.3} kg", s.interval, s.active, s.active_mass);
///     }
/// }
/// ```
pub trait ScenarioObserver {
    /// Called before any work of interval `interval` (which starts at `start`).
    fn on_interval_start(&mut self, _interval: usize, _start: Timestamp) {}

    /// Called with every batch of particles just created from the schedule.
    fn on_release(&mut self, _records: &[InjectionRecord]) {}

    /// Called after an interval's measurements were flushed, every
    /// `config.output_interval` intervals and after the last one.
    fn on_interval_end(&mut self, _summary: &IntervalSummary, _measurements: &MeasurementContainer) {}

    /// Called once after the final interval.
    fn on_scenario_end(&mut self, _summary: &ScenarioSummary, _measurements: &MeasurementContainer) {}
}

/// A [`ScenarioObserver`] that does nothing.
pub struct NoopObserver;

impl ScenarioObserver for NoopObserver {}
