//! `InjectionScheduler`: turns a set of sources and a particle budget into
//! one ordered schedule of particle-creation records.

use pt_core::{ParticleId, PtError, ScenarioConfig, Timestamp};

use crate::curve::MassCurve;
use crate::discretize::CurveDiscretizer;
use crate::error::{InjectError, InjectResult};
use crate::record::InjectionRecord;
use crate::source::InjectionSource;

/// Pure function from (sources, budget) to records; holds no state between
/// calls.
#[derive(Clone, Debug)]
pub struct InjectionScheduler {
    budget:         u64,
    washoff_filter: Option<String>,
}

/// Everything one scheduling pass produced.
#[derive(Debug, Default)]
pub struct ScheduleReport {
    /// Ordered by `(created_at, unit)`; ids are dense in that order.
    pub records:           Vec<InjectionRecord>,
    pub mass_per_particle: f64,
    /// Integral of every selected curve [kg].
    pub total_mass:        f64,
    /// Sum of all record masses [kg].
    pub emitted_mass:      f64,
    /// Washoff area records excluded by the washoff filter.
    pub skipped_areas:     usize,
    /// Non-fatal problems: negative reservoirs and invalid areas.
    pub warnings:          Vec<InjectError>,
}

impl ScheduleReport {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `|emitted - total| / total`, or 0 for an empty schedule.
    pub fn relative_mass_error(&self) -> f64 {
        if self.total_mass == 0.0 {
            return 0.0;
        }
        ((self.emitted_mass - self.total_mass) / self.total_mass).abs()
    }

    /// Records with `from <= created_at < to`, as a slice of the ordered list.
    pub fn released_between(&self, from: Timestamp, to: Timestamp) -> &[InjectionRecord] {
        let lo = self.records.partition_point(|r| r.created_at < from);
        let hi = self.records.partition_point(|r| r.created_at < to);
        &self.records[lo..hi.max(lo)]
    }
}

impl InjectionScheduler {
    pub fn new(budget: u64) -> Self {
        Self { budget, washoff_filter: None }
    }

    /// Budget and washoff filter taken from the scenario configuration.
    pub fn from_config(config: &ScenarioConfig) -> Self {
        Self {
            budget:         config.particle_budget,
            washoff_filter: config.washoff_filter.clone(),
        }
    }

    /// Only washoff areas labelled `label` are injected.
    pub fn washoff_filter(mut self, label: impl Into<String>) -> Self {
        self.washoff_filter = Some(label.into());
        self
    }

    pub fn budget(&self) -> u64 {
        self.budget
    }

    /// Build the schedule.
    ///
    /// The nominal mass per particle is the total selected mass divided by
    /// the budget; each curve is then discretized independently and the
    /// records merged into emission order.
    ///
    /// # Errors
    ///
    /// - [`InjectError::ZeroBudget`] if the budget is 0.
    /// - [`InjectError::InvalidInterval`] for a malformed source.
    ///
    /// Negative reservoirs and unusable areas are not errors; they are listed
    /// in [`ScheduleReport::warnings`].
    pub fn schedule(&self, sources: &[InjectionSource]) -> InjectResult<ScheduleReport> {
        if self.budget == 0 {
            return Err(InjectError::ZeroBudget);
        }
        for source in sources {
            source.validate()?;
        }

        let filter = self.washoff_filter.as_deref();
        let mut report = ScheduleReport::default();
        let mut curves: Vec<MassCurve> = Vec::new();
        for source in sources {
            report.skipped_areas += source.skipped_areas(filter);
            report.warnings.extend(source.invalid_areas());
            curves.extend(source.mass_curves(filter));
        }

        report.total_mass = curves.iter().map(MassCurve::total).sum();
        if !(report.total_mass.is_finite() && report.total_mass > 0.0) {
            for warning in curves.iter().filter_map(MassCurve::first_deficit) {
                log::warn!("{warning}; nothing is injected");
                report.warnings.push(warning);
            }
            log::info!("no pollutant mass to inject ({} curves)", curves.len());
            report.total_mass = report.total_mass.max(0.0);
            return Ok(report);
        }
        report.mass_per_particle = report.total_mass / self.budget as f64;

        for curve in &curves {
            let outcome = CurveDiscretizer::discretize(curve, report.mass_per_particle, &mut report.records)?;
            report.emitted_mass += outcome.emitted_mass;
            if let Some(warning) = outcome.warning {
                log::warn!("{warning}; skipping the remaining intervals of {}", curve.unit);
                report.warnings.push(warning);
            }
        }

        if report.records.len() >= ParticleId::INVALID.index() {
            return Err(PtError::Config(format!(
                "{} particles exceed the particle id space",
                report.records.len()
            ))
            .into());
        }
        report.records.sort_by_key(InjectionRecord::order_key);
        for (i, record) in report.records.iter_mut().enumerate() {
            record.id = ParticleId(i as u32);
        }

        if report.skipped_areas > 0 {
            log::info!(
                "washoff filter {:?} skipped {} area records",
                self.washoff_filter, report.skipped_areas
            );
        }
        log::info!(
            "scheduled {} particles for {:.6} kg ({:.6} kg per particle, budget {})",
            report.records.len(),
            report.emitted_mass,
            report.mass_per_particle,
            self.budget
        );
        Ok(report)
    }
}
