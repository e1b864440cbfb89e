//! `pt-store` — time-indexed hydraulic state for the particle tracer.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`quantity`]  | `Quantity`: the tracked hydraulic quantities             |
//! | [`store`]     | `TimedArrayStore` (flat arrays + policy reads)            |
//! | [`builder`]   | `TimedArrayStoreBuilder` (validation, zero-fill, caches)  |
//!
//! # Layout
//!
//! Every quantity is one flat `Vec<f64>` of `unit_count * N` samples over a
//! shared [`TimeIndex`](pt_core::TimeIndex):
//!
//! ```text
//! sample_index = unit * N + temporal_index
//! ```
//!
//! so one unit's whole series is a contiguous slice.  The hydraulic solver
//! fills the store once at scenario load; afterwards it is read concurrently
//! by the particle workers without any locking.

pub mod builder;
pub mod quantity;
pub mod store;


pub use builder::TimedArrayStoreBuilder;
pub use pt_core::CalculationPolicy;
pub use quantity::Quantity;
pub use store::TimedArrayStore;
