//! `pt-inject` — mass-conserving injection scheduling.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                   |
//! |------------------|------------------------------------------------------------|
//! | [`curve`]        | `ReleaseInterval`, `MassCurve`                             |
//! | [`source`]       | `InjectionSource` sum type, `AreaRecord`, `WashoffArea`    |
//! | [`discretize`]   | `CurveDiscretizer`: curve → particles, one unit at a time |
//! | [`scheduler`]    | `InjectionScheduler`, `ScheduleReport`                     |
//! | [`record`]       | `InjectionRecord`                                          |
//! | [`error`]        | `InjectError`, `InjectResult<T>`                           |
//!
//! # Mass conservation
//!
//! Every source reduces to per-unit mass curves.  The discretizer never
//! drops mass: intervals too small for a whole particle carry their mass
//! forward, and whatever is left after the last interval becomes one final
//! particle.  The emitted masses of a schedule therefore sum to the integral
//! of its curves.

pub mod curve;
pub mod discretize;
pub mod error;
pub mod record;
pub mod scheduler;
pub mod source;

#[cfg(test)]
mod tests;

pub use curve::{MassCurve, ReleaseInterval};
pub use discretize::{CurveDiscretizer, CurveOutcome};
pub use error::{InjectError, InjectResult};
pub use record::InjectionRecord;
pub use scheduler::{InjectionScheduler, ScheduleReport};
pub use source::{AreaRecord, InjectionSource, WashoffArea};
