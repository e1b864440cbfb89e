//! `pt-sim` — interval loop orchestrator for particle-tracking scenarios.
//!
//! # Sub-step loop
//!
//! ```text
//! for interval i in 0..time.interval_count():
//!   for substep s in 0..config.substeps_per_interval:
//!     ① Release: schedule records created at or before the sub-step end
//!                 become particles (ascending ParticleId).
//!     ② Step   : ParticleModel::step for every active particle; visits go
//!                 into the MeasurementAggregator through &self
//!                 (parallel with the `parallel` feature).
//!     ③ Apply  : MoveTo / Exit outcomes in ascending ParticleId order.
//!     ④ Sample : flush the aggregator into the MeasurementContainer at
//!                 temporal index i + 1 when the sampling mode says so;
//!                 reset the aggregator.
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the step phase on a Rayon thread pool.            |
//! | `serde`    | Derives `Serialize`/`Deserialize` on the summaries.    |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use pt_core::ScenarioConfig;
//! use pt_sim::{NoopObserver, ScenarioBuilder, StationaryModel};
//!
//! let mut scenario = ScenarioBuilder::new(ScenarioConfig::default(), hydraulics, StationaryModel)
//!     .sources(sources)
//!     .build()?;
//! let summary = scenario.run(&mut NoopObserver)?;
//! println!("peak concentration {}", summary.max_concentration);
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod model;
pub mod observer;
pub mod outcome;
pub mod scenario;
pub mod summary;


pub use builder::ScenarioBuilder;
pub use context::StepContext;
pub use error::{SimError, SimResult};
pub use model::{ParticleModel, StationaryModel};
pub use observer::{NoopObserver, ScenarioObserver};
pub use outcome::StepOutcome;
pub use scenario::Scenario;
pub use summary::{IntervalSummary, ScenarioSummary};
