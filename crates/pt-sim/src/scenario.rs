//! The `Scenario` struct and its interval loop.

use pt_core::{ParticleId, ScenarioConfig, Timestamp, UnitId};
use pt_inject::InjectionRecord;
use pt_measure::{MeasurementAggregator, MeasurementContainer, Visit};
use pt_particle::{ParticleRngs, ParticleStore};
use pt_store::{Quantity, TimedArrayStore};

use crate::{
    IntervalSummary, ParticleModel, ScenarioObserver, ScenarioSummary, SimError, SimResult,
    StepContext, StepOutcome,
};

// ── Scenario ──────────────────────────────────────────────────────────────────

/// One simulation run and everything it owns.
///
/// Nothing is process-global: two scenarios can run side by side in the same
/// process, each with its own aggregator and measurement container.
///
/// Per sub-step of interval `[t_i, t_{i+1}]`:
///
/// 1. **Release**: schedule records with `created_at <= sub-step end` become
///    particles.
/// 2. **Step** (parallel with the `parallel` feature): call
///    [`ParticleModel::step`] for every active particle and record the
///    resulting visits into the aggregator through `&self`.
/// 3. **Apply** (sequential, ascending `ParticleId`): move and give up
///    particles.
/// 4. **Sample**: if the sampling mode samples this sub-step, flush the
///    aggregator into the container at temporal index `i + 1`.  The
///    aggregator is reset either way.
///
/// Temporal index 0 is never written: the measurement for an interval is
/// stored at the timestamp that closes it.
///
/// Create via [`ScenarioBuilder`][crate::ScenarioBuilder].
pub struct Scenario<M: ParticleModel> {
    pub config:       ScenarioConfig,
    /// Solver output, read-only once the run starts.
    pub hydraulics:   TimedArrayStore,
    pub particles:    ParticleStore,
    /// Per-particle RNGs, separated for the split-borrow pattern.
    pub rngs:         ParticleRngs,
    pub aggregator:   MeasurementAggregator,
    pub measurements: MeasurementContainer,
    pub model:        M,

    /// Ordered schedule; `records[next_record..]` are still pending.
    pub(crate) records:           Vec<InjectionRecord>,
    pub(crate) next_record:       usize,
    pub(crate) mass_per_particle: f64,
    pub(crate) scheduled_mass:    f64,

    pub(crate) interval:    usize,
    pub(crate) exited:      usize,
    pub(crate) exited_mass: f64,
    /// Reused sampled-volume buffer, one entry per unit.
    pub(crate) volumes:     Vec<f64>,

    #[cfg(feature = "parallel")]
    pub(crate) pool: Option<rayon::ThreadPool>,
}

impl<M: ParticleModel> Scenario<M> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run every remaining interval, then call `on_scenario_end`.
    pub fn run<O: ScenarioObserver>(&mut self, observer: &mut O) -> SimResult<ScenarioSummary> {
        let total = self.interval_count();
        log::info!(
            "running {} intervals over {} units with {} scheduled particles ({} discipline)",
            total - self.interval.min(total),
            self.hydraulics.unit_count(),
            self.records.len(),
            self.config.discipline
        );
        while self.interval < total {
            self.advance(observer)?;
        }
        let summary = self.summary();
        if summary.unreleased > 0 {
            log::warn!(
                "{} scheduled particles lie after the last timestamp and were never released",
                summary.unreleased
            );
        }
        observer.on_scenario_end(&summary, &self.measurements);
        log::info!(
            "scenario finished: {} released, {} exited, max concentration {:.6} kg/m³",
            summary.released, summary.exited, summary.max_concentration
        );
        Ok(summary)
    }

    /// Run at most `n` intervals from the current position.  Does not call
    /// `on_scenario_end`.
    pub fn run_intervals<O: ScenarioObserver>(&mut self, n: usize, observer: &mut O) -> SimResult<()> {
        let total = self.interval_count();
        for _ in 0..n {
            if self.interval >= total {
                break;
            }
            self.advance(observer)?;
        }
        Ok(())
    }

    /// Next interval to simulate.
    pub fn current_interval(&self) -> usize {
        self.interval
    }

    pub fn interval_count(&self) -> usize {
        self.hydraulics.time().interval_count()
    }

    pub fn is_finished(&self) -> bool {
        self.interval >= self.interval_count()
    }

    /// The full ordered schedule, released or not.
    pub fn schedule(&self) -> &[InjectionRecord] {
        &self.records
    }

    /// Records not released yet.
    pub fn pending(&self) -> &[InjectionRecord] {
        &self.records[self.next_record..]
    }

    pub fn mass_per_particle(&self) -> f64 {
        self.mass_per_particle
    }

    /// Totals so far.
    pub fn summary(&self) -> ScenarioSummary {
        ScenarioSummary {
            intervals:         self.interval,
            scheduled:         self.records.len(),
            released:          self.particles.len(),
            unreleased:        if self.is_finished() { self.records.len() - self.next_record } else { 0 },
            exited:            self.exited,
            mass_per_particle: self.mass_per_particle,
            scheduled_mass:    self.scheduled_mass,
            active_mass:       self.particles.active_mass(),
            exited_mass:       self.exited_mass,
            max_mass:          self.measurements.max_mass(),
            max_concentration: self.measurements.max_concentration(),
            dropped_visits:    self.aggregator.dropped_visits(),
        }
    }

    // ── Interval processing ───────────────────────────────────────────────

    fn advance<O: ScenarioObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let interval = self.interval;
        let (start, end) = self.hydraulics.time().interval(interval).ok_or_else(|| {
            SimError::Config(format!("interval {interval} is outside the time index"))
        })?;

        observer.on_interval_start(interval, start);
        let summary = self.process_interval(interval, start, end, observer)?;
        self.interval += 1;

        let every = self.config.output_interval.max(1) as usize;
        if self.interval % every == 0 || self.is_finished() {
            observer.on_interval_end(&summary, &self.measurements);
        }
        Ok(())
    }

    fn process_interval<O: ScenarioObserver>(
        &mut self,
        interval: usize,
        start:    Timestamp,
        end:      Timestamp,
        observer: &mut O,
    ) -> SimResult<IntervalSummary> {
        let substeps = self.config.substeps_per_interval;
        let dt_ms = end.since(start) as f64 / substeps as f64;
        let mut summary = IntervalSummary::new(interval, start, end);

        for substep in 0..substeps {
            let now = start.lerp(end, (substep + 1) as f64 / substeps as f64);

            // ── Release ───────────────────────────────────────────────────
            let released = self.release_until(now);
            if released > 0 {
                let first = self.next_record - released;
                observer.on_release(&self.records[first..self.next_record]);
                summary.released += released;
            }

            // ── Step + record (possibly parallel) ─────────────────────────
            self.hydraulics.set_actual_time(now);
            let moves = self.step_particles(interval, substep, now, dt_ms);

            // ── Apply (sequential) ────────────────────────────────────────
            summary.exited += self.apply_outcomes(moves);

            // ── Sample ────────────────────────────────────────────────────
            if self.config.sampling.samples_at(substep, substeps) {
                self.sample_volumes();
                self.aggregator.flush(&mut self.measurements, summary.temporal_index, &self.volumes)?;
                summary.samples += 1;
            }
            self.aggregator.reset();
        }

        summary.active = self.particles.active_count();
        summary.active_mass = self.particles.active_mass();
        summary.exited_mass = self.exited_mass;
        summary.dropped_visits = self.aggregator.dropped_visits();
        Ok(summary)
    }

    /// Create particles for every pending record up to `now`.  Returns how
    /// many were created.
    fn release_until(&mut self, now: Timestamp) -> usize {
        let pending = &self.records[self.next_record..];
        let count = pending.partition_point(|r| r.created_at <= now);
        for record in &pending[..count] {
            self.particles.release(&mut self.rngs, record);
        }
        self.next_record += count;
        count
    }

    /// Step every active particle and record its visits.
    ///
    /// Returns the outcomes that change particle state, in ascending
    /// `ParticleId` order.
    fn step_particles(
        &mut self,
        interval: usize,
        substep:  u32,
        now:      Timestamp,
        dt_ms:    f64,
    ) -> Vec<(ParticleId, StepOutcome)> {
        // Explicit field borrows so the borrow checker sees disjoint access.
        let particles  = &self.particles;
        let aggregator = &self.aggregator;
        let model      = &self.model;
        let rngs       = &mut self.rngs;

        let ctx = StepContext {
            timestamp: now,
            interval,
            substep,
            dt_ms,
            hydraulics: &self.hydraulics,
            particles,
        };

        let step = |(i, rng): (usize, &mut pt_core::ParticleRng)| {
            let id = ParticleId(i as u32);
            let outcome = model.step(id, &ctx, rng);
            record_visits(aggregator, particles, id, outcome);
            (id, outcome)
        };

        #[cfg(not(feature = "parallel"))]
        {
            rngs.inner
                .iter_mut()
                .enumerate()
                .filter(|(i, _)| particles.active[*i])
                .map(step)
                .filter(|(_, o)| *o != StepOutcome::Stay)
                .collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let mut work = || {
                rngs.inner
                    .par_iter_mut()
                    .enumerate()
                    .filter(|(i, _)| particles.active[*i])
                    .map(step)
                    .filter(|(_, o)| *o != StepOutcome::Stay)
                    .collect::<Vec<_>>()
            };
            match &self.pool {
                Some(pool) => pool.install(work),
                None       => work(),
            }
        }
    }

    /// Returns the number of particles that left the domain.
    fn apply_outcomes(&mut self, moves: Vec<(ParticleId, StepOutcome)>) -> usize {
        let mut exited = 0;
        for (id, outcome) in moves {
            match outcome {
                StepOutcome::Stay => {}
                StepOutcome::MoveTo { unit, .. } => self.particles.move_to(id, unit),
                StepOutcome::Exit { .. } => {
                    if self.particles.deactivate(id) {
                        self.exited_mass += self.particles.mass[id.index()];
                        exited += 1;
                    }
                }
            }
        }
        self.exited += exited;
        exited
    }

    fn sample_volumes(&mut self) {
        for (unit, slot) in self.volumes.iter_mut().enumerate() {
            *slot = self.hydraulics.current_value(Quantity::Volume, UnitId(unit as u32));
        }
    }
}

/// Turn one step outcome into aggregator visits.
fn record_visits(
    aggregator: &MeasurementAggregator,
    particles:  &ParticleStore,
    id:         ParticleId,
    outcome:    StepOutcome,
) {
    let i = id.index();
    let unit = particles.unit[i];
    let visit = |unit: UnitId, weight: f64| {
        if weight > 0.0 {
            aggregator.record_visit(Visit {
                particle: id,
                unit,
                material: particles.material[i],
                mass: particles.mass[i],
                weight,
            });
        }
    };

    match outcome {
        StepOutcome::Stay => visit(unit, 1.0),
        StepOutcome::MoveTo { unit: to, share_before } => {
            let share = share_before.clamp(0.0, 1.0);
            visit(unit, share);
            visit(to, 1.0 - share);
        }
        StepOutcome::Exit { share_before } => visit(unit, share_before.clamp(0.0, 1.0)),
    }
}
