//! Fluent builder for constructing a [`Scenario`].

use pt_core::ScenarioConfig;
use pt_inject::{InjectionRecord, InjectionScheduler, InjectionSource};
use pt_measure::{MeasurementAggregator, MeasurementContainer};
use pt_particle::ParticleStoreBuilder;
use pt_store::TimedArrayStore;

use crate::{ParticleModel, Scenario, SimError, SimResult};

/// Fluent builder for [`Scenario<M>`].
///
/// # Required inputs
///
/// - [`ScenarioConfig`]: budget, sub-steps, discipline, sampling, seed, …
/// - [`TimedArrayStore`]: the solver output the particles read
/// - `M: ParticleModel`: the particle kinematics
///
/// # Optional inputs
///
/// | Method          | Default                                   |
/// |-----------------|-------------------------------------------|
/// | `.sources(v)`   | none; scheduled with the config's budget  |
/// | `.records(v)`   | none; a pre-built schedule to merge in    |
///
/// # Example
///
/// ```rust,ignore
/// let mut scenario = ScenarioBuilder::new(config, hydraulics, StationaryModel)
///     .sources(sources)
///     .build()?;
/// scenario.run(&mut NoopObserver)?;
/// ```
pub struct ScenarioBuilder<M: ParticleModel> {
    config:     ScenarioConfig,
    hydraulics: TimedArrayStore,
    model:      M,
    sources:    Vec<InjectionSource>,
    records:    Vec<InjectionRecord>,
}

impl<M: ParticleModel> ScenarioBuilder<M> {
    pub fn new(config: ScenarioConfig, hydraulics: TimedArrayStore, model: M) -> Self {
        Self {
            config,
            hydraulics,
            model,
            sources: Vec::new(),
            records: Vec::new(),
        }
    }

    /// Injection sources, turned into a schedule by [`build`](Self::build).
    pub fn sources(mut self, sources: Vec<InjectionSource>) -> Self {
        self.sources = sources;
        self
    }

    /// Additional ready-made records, e.g. from a streaming discretizer.
    /// Their ids are reassigned when merged with the scheduled ones.
    pub fn records(mut self, records: Vec<InjectionRecord>) -> Self {
        self.records = records;
        self
    }

    /// Validate inputs, run the injection scheduler, and return a
    /// ready-to-run [`Scenario`].
    ///
    /// # Errors
    ///
    /// - [`SimError::Core`] for an invalid configuration.
    /// - [`SimError::Inject`] if scheduling fails.
    /// - [`SimError::RecordOutOfRange`] for a record targeting an unknown
    ///   unit or material.
    /// - [`SimError::ThreadPool`] if the worker pool cannot be created.
    pub fn build(self) -> SimResult<Scenario<M>> {
        self.config.validate()?;
        let mut hydraulics = self.hydraulics;
        hydraulics.set_policy(self.config.policy);
        hydraulics.set_actual_time(hydraulics.time().first());
        let unit_count = hydraulics.unit_count();
        let material_count = self.config.material_count as usize;

        // ── Schedule ──────────────────────────────────────────────────────
        let (mut records, mut mass_per_particle, mut scheduled_mass) = if self.sources.is_empty() {
            (Vec::new(), 0.0, 0.0)
        } else {
            let report = InjectionScheduler::from_config(&self.config).schedule(&self.sources)?;
            (report.records, report.mass_per_particle, report.total_mass)
        };
        if !self.records.is_empty() {
            scheduled_mass += self.records.iter().map(|r| r.mass).sum::<f64>();
            records.extend(self.records);
            records.sort_by_key(InjectionRecord::order_key);
            for (i, record) in records.iter_mut().enumerate() {
                record.id = pt_core::ParticleId(i as u32);
            }
            if mass_per_particle == 0.0 {
                mass_per_particle = scheduled_mass / records.len() as f64;
            }
        }

        for (index, record) in records.iter().enumerate() {
            if record.unit.index() >= unit_count {
                return Err(SimError::RecordOutOfRange {
                    index,
                    what:  "unit",
                    value: record.unit.index(),
                    limit: unit_count,
                });
            }
            if record.material.index() >= material_count {
                return Err(SimError::RecordOutOfRange {
                    index,
                    what:  "material",
                    value: record.material.index(),
                    limit: material_count,
                });
            }
        }

        // ── State ─────────────────────────────────────────────────────────
        let (particles, rngs) = ParticleStoreBuilder::new(self.config.seed)
            .capacity(records.len())
            .build();
        let aggregator = MeasurementAggregator::new(self.config.discipline, unit_count, material_count);
        let measurements = MeasurementContainer::new(hydraulics.time().clone(), unit_count, material_count);

        #[cfg(feature = "parallel")]
        let pool = match self.config.num_threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| SimError::ThreadPool(e.to_string()))?,
            ),
            None => None,
        };

        Ok(Scenario {
            config: self.config,
            hydraulics,
            particles,
            rngs,
            aggregator,
            measurements,
            model: self.model,
            records,
            next_record: 0,
            mass_per_particle,
            scheduled_mass,
            interval: 0,
            exited: 0,
            exited_mass: 0.0,
            volumes: vec![0.0; unit_count],
            #[cfg(feature = "parallel")]
            pool,
        })
    }
}
