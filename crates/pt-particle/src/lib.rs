//! `pt-particle` — Structure-of-Arrays particle storage.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`store`]     | `ParticleStore` (SoA arrays), `ParticleRngs` (per-particle RNG) |
//! | [`builder`]   | `ParticleStoreBuilder` (fluent construction)              |
//!
//! Particles are only ever appended, from injection records, and never
//! removed: a particle that leaves the domain is flagged inactive, so a
//! `ParticleId` stays a valid index into every array for the whole run.

pub mod builder;
pub mod store;


pub use builder::ParticleStoreBuilder;
pub use store::{ParticleRngs, ParticleStore};
