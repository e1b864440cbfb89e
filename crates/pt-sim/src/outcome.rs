//! What happened to one particle during one sub-step.

use pt_core::UnitId;

/// Result of [`ParticleModel::step`][crate::ParticleModel::step].
///
/// Visits are derived from the outcome: the particle is counted in its
/// current unit for `share_before` of the sub-step and in the new unit for
/// the rest.  Shares are clamped to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// Stayed in its current unit for the whole sub-step.
    Stay,

    /// Moved to `unit` after spending `share_before` of the sub-step in its
    /// current unit.
    MoveTo { unit: UnitId, share_before: f64 },

    /// Left the domain (outfall, leakage) after spending `share_before` of
    /// the sub-step in its current unit.  The particle is given up.
    Exit { share_before: f64 },
}
