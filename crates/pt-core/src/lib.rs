//! `pt-core` — foundational types for the urban drainage particle tracer.
//!
//! This crate is a dependency of every other `pt-*` crate.  It has no `pt-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                |
//! |-----------------|---------------------------------------------------------|
//! | [`ids`]         | `UnitId`, `MaterialId`, `ParticleId`                    |
//! | [`time`]        | `Timestamp`, `TimeIndex` (guarded timestamp → index)    |
//! | [`config`]      | `ScenarioConfig`, `Discipline`, `SamplingMode`, `CalculationPolicy` |
//! | [`rng`]         | `ParticleRng` (per-particle, deterministic)             |
//! | [`error`]       | `PtError`, `PtResult`                                   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{CalculationPolicy, Discipline, SamplingMode, ScenarioConfig};
pub use error::{PtError, PtResult};
pub use ids::{MaterialId, ParticleId, UnitId};
pub use rng::ParticleRng;
pub use time::{GUARD_BAND, TimeIndex, Timestamp};
