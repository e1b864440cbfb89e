//! The `ParticleModel` trait: the extension point for particle kinematics.

use pt_core::{ParticleId, ParticleRng};

use crate::{StepContext, StepOutcome};

/// Pluggable particle movement.
///
/// Called once per active particle per sub-step, possibly from many threads
/// at once (with the `parallel` feature), so implementations must be
/// `Send + Sync`.  Per-particle state lives in the
/// [`ParticleStore`](pt_particle::ParticleStore) reached through
/// `ctx.particles`; randomness comes from the particle's own RNG so results
/// do not depend on thread scheduling.
///
/// # Example
///
/// ```rust,ignore
/// struct LeakyModel { p: f64 }
///
/// impl ParticleModel for LeakyModel {
///     fn step(&self, _p: ParticleId, _ctx: &StepContext<'_>, rng: &mut ParticleRng) -> StepOutcome {
///         if rng.gen_bool(self.p) {
///             StepOutcome::Exit { share_before: 0.5 }
///         } else {
///             StepOutcome::Stay
///         }
///     }
/// }
/// ```
pub trait ParticleModel: Send + Sync + 'static {
    fn step(
        &self,
        particle: ParticleId,
        ctx:      &StepContext<'_>,
        rng:      &mut ParticleRng,
    ) -> StepOutcome;
}

/// A [`ParticleModel`] whose particles never move.
///
/// Useful for tests and for measuring injections in place.
pub struct StationaryModel;

impl ParticleModel for StationaryModel {
    fn step(
        &self,
        _particle: ParticleId,
        _ctx:      &StepContext<'_>,
        _rng:      &mut ParticleRng,
    ) -> StepOutcome {
        StepOutcome::Stay
    }
}
