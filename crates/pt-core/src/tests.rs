//! Unit tests for pt-core primitives.

#[cfg(test)]
mod ids {
    use crate::{MaterialId, ParticleId, UnitId};

    #[test]
    fn index_roundtrip() {
        let id = UnitId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(UnitId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(UnitId::INVALID.0, u32::MAX);
        assert_eq!(ParticleId::INVALID.0, u32::MAX);
        assert_eq!(MaterialId::INVALID.0, u16::MAX);
        assert!(!UnitId::default().is_valid());
        assert!(UnitId(0).is_valid());
    }

    #[test]
    fn material_id_rejects_overflow() {
        assert!(MaterialId::try_from(70_000usize).is_err());
    }

    #[test]
    fn display() {
        assert_eq!(UnitId(7).to_string(), "UnitId(7)");
    }
}

#[cfg(test)]
mod time {
    use crate::{GUARD_BAND, PtError, TimeIndex, Timestamp};

    fn three_points() -> TimeIndex {
        TimeIndex::from_millis(&[0, 60_000, 120_000]).unwrap()
    }

    #[test]
    fn rejects_single_point() {
        let err = TimeIndex::from_millis(&[5]).unwrap_err();
        assert!(matches!(err, PtError::InvalidTimeSeries(_)));
    }

    #[test]
    fn rejects_empty() {
        assert!(TimeIndex::new(vec![]).is_err());
    }

    #[test]
    fn rejects_non_increasing() {
        assert!(TimeIndex::from_millis(&[0, 10, 10]).is_err());
        assert!(TimeIndex::from_millis(&[0, 10, 5]).is_err());
    }

    #[test]
    fn duration_and_accessors() {
        let ti = three_points();
        assert_eq!(ti.len(), 3);
        assert_eq!(ti.duration_ms(), 120_000);
        assert_eq!(ti.first(), Timestamp(0));
        assert_eq!(ti.last(), Timestamp(120_000));
        assert_eq!(ti.interval_count(), 2);
        assert_eq!(ti.interval(1), Some((Timestamp(60_000), Timestamp(120_000))));
        assert_eq!(ti.interval(2), None);
        assert_eq!(ti.stamp(99), Timestamp(120_000));
    }

    #[test]
    fn concrete_scenario() {
        let ti = three_points();
        assert_eq!(ti.index_of(Timestamp(30_000)), 0);
        assert_eq!(ti.fractional_index_of(Timestamp(30_000)), 0.5);
        assert!(ti.fractional_index_of(Timestamp(120_000)) < 2.0);
    }

    #[test]
    fn index_of_clamps_outside_range() {
        let ti = three_points();
        assert_eq!(ti.index_of(Timestamp(-50_000)), 0);
        assert_eq!(ti.index_of(Timestamp(120_000)), 2);
        assert_eq!(ti.index_of(Timestamp(10_000_000)), 2);
    }

    #[test]
    fn extreme_timestamps_clamp_without_overflow() {
        let ti = TimeIndex::from_millis(&[1_000, 61_000, 121_000]).unwrap();
        assert_eq!(ti.index_of(Timestamp(i64::MIN)), 0);
        assert_eq!(ti.index_of(Timestamp(i64::MAX)), 2);
        assert_eq!(ti.fractional_index_of(Timestamp(i64::MIN)), GUARD_BAND);
        assert_eq!(ti.fractional_index_of(Timestamp(i64::MAX)), 2.0 - GUARD_BAND);
    }

    #[test]
    fn index_of_floors_just_below_boundary() {
        let ti = three_points();
        assert_eq!(ti.index_of(Timestamp(59_999)), 0);
        assert_eq!(ti.index_of(Timestamp(60_000)), 1);
    }

    #[test]
    fn fractional_index_guard_band_at_both_ends() {
        let ti = three_points();
        assert_eq!(ti.fractional_index_of(Timestamp(0)), GUARD_BAND);
        assert_eq!(ti.fractional_index_of(Timestamp(-1)), GUARD_BAND);
        assert_eq!(ti.fractional_index_of(Timestamp(120_000)), 2.0 - GUARD_BAND);
        assert_eq!(ti.fractional_index_of(Timestamp(999_999)), 2.0 - GUARD_BAND);
    }

    #[test]
    fn uniform_series() {
        let ti = TimeIndex::uniform(Timestamp::from_secs(10), 300_000, 4).unwrap();
        assert_eq!(ti.stamps(), &[
            Timestamp(10_000),
            Timestamp(310_000),
            Timestamp(610_000),
            Timestamp(910_000),
        ]);
        assert!(TimeIndex::uniform(Timestamp(0), 0, 4).is_err());
    }

    #[test]
    fn timestamp_lerp_and_arithmetic() {
        let a = Timestamp(1_000);
        let b = Timestamp(3_000);
        assert_eq!(a.lerp(b, 0.25), Timestamp(1_500));
        assert_eq!(b - a, 2_000);
        assert_eq!(a + 500, Timestamp(1_500));
        assert_eq!(b.since(a), 2_000);
        assert_eq!(a.to_string(), "1000ms");
    }

    mod properties {
        use proptest::prelude::*;

        use crate::{TimeIndex, Timestamp};

        proptest! {
            #[test]
            fn fractional_index_stays_inside_guard_band(
                start in -1_000_000_000i64..1_000_000_000,
                steps in prop::collection::vec(1i64..200_000, 1..40),
                frac in 0.0f64..=1.0,
            ) {
                let mut stamps = vec![Timestamp(start)];
                for s in &steps {
                    let prev = stamps[stamps.len() - 1];
                    stamps.push(prev + *s);
                }
                let ti = TimeIndex::new(stamps).unwrap();
                let n = ti.len();
                let t = ti.first().lerp(ti.last(), frac);

                let fi = ti.fractional_index_of(t);
                prop_assert!(fi >= 0.0);
                prop_assert!(fi < (n - 1) as f64);
                prop_assert!((fi.floor() as usize) + 1 < n);
                prop_assert!(ti.index_of(t) <= n - 1);
            }
        }
    }
}

#[cfg(test)]
mod config {
    use crate::{Discipline, SamplingMode, ScenarioConfig};

    #[test]
    fn default_config_is_valid() {
        assert!(ScenarioConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_budget_rejected() {
        let cfg = ScenarioConfig { particle_budget: 0, ..ScenarioConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_substeps_rejected() {
        let cfg = ScenarioConfig { substeps_per_interval: 0, ..ScenarioConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn timespot_samples_only_last_substep() {
        let mode = SamplingMode::Timespot;
        assert!(!mode.samples_at(0, 4));
        assert!(!mode.samples_at(2, 4));
        assert!(mode.samples_at(3, 4));
        assert!(mode.samples_at(0, 1));
    }

    #[test]
    fn continuous_samples_every_substep() {
        let mode = SamplingMode::Continuous;
        assert!((0..4).all(|s| mode.samples_at(s, 4)));
    }

    #[test]
    fn discipline_display() {
        assert_eq!(Discipline::ExactlyOnce.to_string(), "exactly-once");
    }
}

#[cfg(test)]
mod rng {
    use crate::{ParticleId, ParticleRng};

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = ParticleRng::new(12345, ParticleId(0));
        let mut r2 = ParticleRng::new(12345, ParticleId(0));
        for _ in 0..100 {
            let a: f64 = r1.random();
            let b: f64 = r2.random();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn different_particles_differ() {
        let mut r0 = ParticleRng::new(1, ParticleId(0));
        let mut r1 = ParticleRng::new(1, ParticleId(1));
        let a: u64 = r0.random();
        let b: u64 = r1.random();
        assert_ne!(a, b);
    }

    #[test]
    fn gen_bool_extremes() {
        let mut rng = ParticleRng::new(0, ParticleId(0));
        assert!(!rng.gen_bool(-1.0));
        assert!(rng.gen_bool(2.0));
    }

    #[test]
    fn share_stays_in_unit_interval() {
        let mut rng = ParticleRng::new(0, ParticleId(3));
        for _ in 0..1_000 {
            let s = rng.share();
            assert!((0.0..1.0).contains(&s));
        }
    }
}
