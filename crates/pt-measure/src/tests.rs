//! Unit tests for pt-measure.

#[cfg(test)]
mod helpers {
    use std::sync::Arc;

    use pt_core::{Discipline, TimeIndex};

    use crate::{MeasurementAggregator, MeasurementContainer};

    pub fn time() -> Arc<TimeIndex> {
        Arc::new(TimeIndex::from_millis(&[0, 60_000, 120_000]).unwrap())
    }

    /// Aggregator and container over 2 units, 2 materials, 3 timestamps.
    pub fn setup(discipline: Discipline) -> (MeasurementAggregator, MeasurementContainer) {
        (
            MeasurementAggregator::new(discipline, 2, 2),
            MeasurementContainer::new(time(), 2, 2),
        )
    }
}

#[cfg(test)]
mod record {
    use pt_core::{Discipline, MaterialId, ParticleId, UnitId};

    use super::helpers::setup;
    use crate::Visit;

    #[test]
    fn weighted_visit_adds_mass_and_weight() {
        let (mut agg, _) = setup(Discipline::Synchronized);
        let visit = Visit { weight: 0.25, ..Visit::full(ParticleId(0), UnitId(1), MaterialId(1), 4.0) };
        assert!(agg.record_visit(visit));
        assert_eq!(agg.pending_count(UnitId(1)), 0.25);
        assert_eq!(agg.pending_mass(UnitId(1)), 1.0);
        assert_eq!(agg.pending_mass(UnitId(0)), 0.0);
    }

    #[test]
    fn weight_is_clamped() {
        let (mut agg, _) = setup(Discipline::Unsynchronized);
        let visit = Visit { weight: 3.0, ..Visit::full(ParticleId(0), UnitId(0), MaterialId(0), 2.0) };
        assert!(agg.record_visit(visit));
        assert_eq!(agg.pending_count(UnitId(0)), 1.0);
        assert_eq!(agg.pending_mass(UnitId(0)), 2.0);
    }

    #[test]
    fn invalid_visits_are_dropped() {
        let (mut agg, _) = setup(Discipline::Synchronized);
        assert!(!agg.record_visit(Visit::full(ParticleId(0), UnitId(9), MaterialId(0), 1.0)));
        assert!(!agg.record_visit(Visit::full(ParticleId(0), UnitId(0), MaterialId(5), 1.0)));
        assert!(!agg.record_visit(Visit::full(ParticleId(0), UnitId(0), MaterialId(0), f64::NAN)));
        assert_eq!(agg.dropped_visits(), 3);
        assert_eq!(agg.pending_mass(UnitId(0)), 0.0);
    }

    #[test]
    fn exactly_once_ignores_repeat_visits() {
        let (mut agg, _) = setup(Discipline::ExactlyOnce);
        let visit = Visit::full(ParticleId(7), UnitId(0), MaterialId(0), 1.5);
        assert!(agg.record_visit(visit));
        assert!(!agg.record_visit(visit));
        assert!(agg.record_visit(Visit::full(ParticleId(8), UnitId(0), MaterialId(0), 1.5)));
        // Same particle in another unit still counts.
        assert!(agg.record_visit(Visit { unit: UnitId(1), ..visit }));
        assert_eq!(agg.pending_count(UnitId(0)), 2.0);
        assert_eq!(agg.pending_mass(UnitId(0)), 3.0);
        assert_eq!(agg.dropped_visits(), 0);
    }

    #[test]
    fn exactly_once_forgets_identities_on_reset() {
        let (mut agg, _) = setup(Discipline::ExactlyOnce);
        let visit = Visit::full(ParticleId(7), UnitId(0), MaterialId(0), 1.0);
        assert!(agg.record_visit(visit));
        agg.reset();
        assert!(agg.record_visit(visit));
    }

    #[test]
    fn zero_weight_visit_leaves_particle_admissible() {
        let (mut agg, _) = setup(Discipline::ExactlyOnce);
        let touch = Visit { weight: 0.0, ..Visit::full(ParticleId(3), UnitId(0), MaterialId(0), 2.0) };
        assert!(!agg.record_visit(touch));
        assert!(!agg.record_visit(Visit { weight: -1.0, ..touch }));
        assert!(agg.record_visit(Visit { weight: 1.0, ..touch }));
        assert_eq!(agg.pending_count(UnitId(0)), 1.0);
        assert_eq!(agg.pending_mass(UnitId(0)), 2.0);
        assert_eq!(agg.dropped_visits(), 0);
    }

    #[test]
    fn synchronized_keeps_repeat_visits() {
        let (mut agg, _) = setup(Discipline::Synchronized);
        let visit = Visit::full(ParticleId(7), UnitId(0), MaterialId(0), 1.0);
        agg.record_visit(visit);
        agg.record_visit(visit);
        assert_eq!(agg.pending_count(UnitId(0)), 2.0);
    }
}

#[cfg(test)]
mod flush {
    use pt_core::{Discipline, MaterialId, ParticleId, UnitId};

    use super::helpers::{setup, time};
    use crate::{MeasureError, MeasurementContainer, Visit};

    #[test]
    fn flush_copies_and_reset_clears() {
        let (mut agg, mut container) = setup(Discipline::Synchronized);
        agg.record_visit(Visit::full(ParticleId(0), UnitId(0), MaterialId(0), 2.0));
        agg.record_visit(Visit::full(ParticleId(1), UnitId(0), MaterialId(1), 3.0));
        agg.flush_and_reset(&mut container, 1, &[10.0, 10.0]).unwrap();

        assert_eq!(container.samples(1), 1);
        assert_eq!(container.visit_count(UnitId(0), 1), 2.0);
        assert_eq!(container.mass(UnitId(0), 1), 5.0);
        assert_eq!(container.material_mass(UnitId(0), MaterialId(0), 1), 2.0);
        assert_eq!(container.material_mass(UnitId(0), MaterialId(1), 1), 3.0);
        assert_eq!(container.concentration(UnitId(0), 1), 0.5);
        assert_eq!(container.mass(UnitId(0), 0), 0.0);
        assert_eq!(agg.pending_mass(UnitId(0)), 0.0);
    }

    #[test]
    fn flush_without_reset_accumulates() {
        let (mut agg, mut container) = setup(Discipline::Unsynchronized);
        agg.record_visit(Visit::full(ParticleId(0), UnitId(1), MaterialId(0), 2.0));
        agg.flush(&mut container, 0, &[1.0, 1.0]).unwrap();
        agg.flush(&mut container, 0, &[1.0, 1.0]).unwrap();
        assert_eq!(container.samples(0), 2);
        assert_eq!(container.visit_count(UnitId(1), 0), 2.0);
        // Sums doubled, sample count doubled: the mean is unchanged.
        assert_eq!(container.mass(UnitId(1), 0), 2.0);
    }

    #[test]
    fn continuous_sampling_divides_at_read_time() {
        let (mut agg, mut container) = setup(Discipline::Synchronized);
        for mass in [1.0, 3.0] {
            agg.record_visit(Visit::full(ParticleId(0), UnitId(0), MaterialId(0), mass));
            agg.flush_and_reset(&mut container, 2, &[2.0, 0.0]).unwrap();
        }
        assert_eq!(container.samples(2), 2);
        assert_eq!(container.mass(UnitId(0), 2), 2.0);
        assert_eq!(container.mean_visit_count(UnitId(0), 2), 1.0);
        assert_eq!(container.mean_volume(UnitId(0), 2), 2.0);
        assert_eq!(container.concentration(UnitId(0), 2), 1.0);
    }

    #[test]
    fn reads_are_idempotent() {
        let (mut agg, mut container) = setup(Discipline::Synchronized);
        agg.record_visit(Visit::full(ParticleId(0), UnitId(0), MaterialId(0), 1.0));
        agg.flush_and_reset(&mut container, 0, &[3.0, 3.0]).unwrap();
        let first = (container.mass(UnitId(0), 0), container.concentration(UnitId(0), 0));
        let second = (container.mass(UnitId(0), 0), container.concentration(UnitId(0), 0));
        assert_eq!(first, second);
    }

    #[test]
    fn zero_volume_reads_zero_concentration() {
        let (mut agg, mut container) = setup(Discipline::Synchronized);
        agg.record_visit(Visit::full(ParticleId(0), UnitId(0), MaterialId(0), 1.0));
        agg.flush_and_reset(&mut container, 0, &[0.0, f64::NAN]).unwrap();
        assert_eq!(container.concentration(UnitId(0), 0), 0.0);
        assert!(matches!(
            container.checked_concentration(UnitId(0), 0),
            Err(MeasureError::DivisionByZeroVolume { temporal_index: 0, .. })
        ));
        assert!(matches!(
            container.checked_concentration(UnitId(5), 0),
            Err(MeasureError::UnitOutOfRange { unit_count: 2, .. })
        ));
        assert_eq!(container.max_concentration(), 0.0);
    }

    #[test]
    fn dry_sample_mass_stays_out_of_concentration() {
        let (mut agg, mut container) = setup(Discipline::Synchronized);
        agg.record_visit(Visit::full(ParticleId(0), UnitId(0), MaterialId(0), 1.0));
        agg.flush_and_reset(&mut container, 1, &[0.0, 0.0]).unwrap();
        agg.flush_and_reset(&mut container, 1, &[1e-6, 1e-6]).unwrap();

        assert_eq!(container.samples(1), 2);
        assert_eq!(container.mass(UnitId(0), 1), 0.5);
        assert_eq!(container.concentration(UnitId(0), 1), 0.0);
        assert_eq!(container.checked_concentration(UnitId(0), 1).unwrap(), 0.0);
        assert_eq!(container.max_concentration(), 0.0);

        container.recompute_maxima();
        assert_eq!(container.max_concentration(), 0.0);
        assert_eq!(container.max_mass(), 0.5);
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let (mut agg, _) = setup(Discipline::Synchronized);
        let mut wrong = MeasurementContainer::new(time(), 3, 2);
        assert!(matches!(
            agg.flush(&mut wrong, 0, &[0.0; 3]),
            Err(MeasureError::ShapeMismatch { what: "unit count", .. })
        ));
        let mut container = MeasurementContainer::new(time(), 2, 2);
        assert!(matches!(
            agg.flush(&mut container, 0, &[0.0]),
            Err(MeasureError::ShapeMismatch { what: "sampled volume length", .. })
        ));
        assert!(matches!(
            agg.flush(&mut container, 3, &[0.0, 0.0]),
            Err(MeasureError::TemporalIndexOutOfRange { index: 3, len: 3 })
        ));
        assert_eq!(container.samples(0), 0);
    }

    #[test]
    fn maxima_track_and_clear() {
        let (mut agg, mut container) = setup(Discipline::Synchronized);
        agg.record_visit(Visit::full(ParticleId(0), UnitId(1), MaterialId(0), 8.0));
        agg.flush_and_reset(&mut container, 1, &[1.0, 4.0]).unwrap();
        agg.record_visit(Visit::full(ParticleId(0), UnitId(0), MaterialId(0), 1.0));
        agg.flush_and_reset(&mut container, 2, &[1.0, 4.0]).unwrap();
        assert_eq!(container.max_mass(), 8.0);
        assert_eq!(container.max_concentration(), 2.0);

        container.clear();
        assert_eq!(container.max_mass(), 0.0);
        assert_eq!(container.max_concentration(), 0.0);
        assert_eq!(container.samples(1), 0);
        assert_eq!(container.mass(UnitId(1), 1), 0.0);
    }

    #[test]
    fn out_of_range_reads_clamp() {
        let (_, container) = setup(Discipline::Synchronized);
        assert_eq!(container.sample_index(UnitId(99), 99), 5);
        assert_eq!(container.material_mass(UnitId(0), MaterialId(9), 0), 0.0);
    }
}

#[cfg(test)]
mod concurrency {
    use pt_core::{Discipline, MaterialId, ParticleId, UnitId};

    use crate::{MeasurementAggregator, MeasurementContainer, Visit};

    use super::helpers::time;

    const THREADS: usize = 8;
    const VISITS: usize = 1000;

    /// 1000 weight-1 visits on unit 0 spread over `THREADS` threads.
    fn hammer(discipline: Discipline) -> f64 {
        let mut agg = MeasurementAggregator::new(discipline, 1, 1);
        let mut container = MeasurementContainer::new(time(), 1, 1);
        std::thread::scope(|s| {
            for thread in 0..THREADS {
                let agg = &agg;
                s.spawn(move || {
                    for i in (thread..VISITS).step_by(THREADS) {
                        agg.record_visit(Visit::full(ParticleId(i as u32), UnitId(0), MaterialId(0), 1.0));
                    }
                });
            }
        });
        agg.flush_and_reset(&mut container, 0, &[1.0]).unwrap();
        container.visit_count(UnitId(0), 0)
    }

    #[test]
    fn synchronized_is_exact() {
        assert_eq!(hammer(Discipline::Synchronized), VISITS as f64);
    }

    #[test]
    fn exactly_once_is_exact_for_distinct_particles() {
        assert_eq!(hammer(Discipline::ExactlyOnce), VISITS as f64);
    }

    #[test]
    fn unsynchronized_may_lose_but_never_invents() {
        let count = hammer(Discipline::Unsynchronized);
        assert!(count > 0.0, "count = {count}");
        assert!(count <= VISITS as f64, "count = {count}");
    }

    #[test]
    fn aggregator_is_shareable() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<MeasurementAggregator>();
        assert_sync::<MeasurementContainer>();
    }
}
