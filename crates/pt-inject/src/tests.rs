//! Unit tests for pt-inject.

#[cfg(test)]
mod helpers {
    use pt_core::{MaterialId, Timestamp, UnitId};

    use crate::{AreaRecord, InjectionSource, MassCurve, ReleaseInterval};

    /// Consecutive one-minute intervals starting at t = 0.
    pub fn minutes(amounts: &[f64]) -> Vec<ReleaseInterval> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, &a)| {
                ReleaseInterval::new(
                    Timestamp(i as i64 * 60_000),
                    Timestamp((i as i64 + 1) * 60_000),
                    a,
                )
            })
            .collect()
    }

    pub fn curve(amounts: &[f64]) -> MassCurve {
        MassCurve::new(UnitId(0), MaterialId(0), minutes(amounts))
    }

    pub fn measured(unit: u32, amounts: &[f64]) -> InjectionSource {
        InjectionSource::Measured {
            material:  MaterialId(0),
            unit:      UnitId(unit),
            intervals: minutes(amounts),
        }
    }

    pub fn area(unit: u32, area_m2: f64, load: f64, label: &str) -> AreaRecord {
        AreaRecord { unit: UnitId(unit), area_m2, load, label: label.into() }
    }
}

#[cfg(test)]
mod discretize {
    use pt_core::{MaterialId, Timestamp, UnitId};

    use super::helpers::{curve, minutes};
    use crate::{CurveDiscretizer, InjectError};

    #[test]
    fn five_then_zero_emits_five_in_first_interval() {
        let intervals = minutes(&[5.0, 0.0]);
        let mut out = Vec::new();
        let mut disc = CurveDiscretizer::new(UnitId(0), MaterialId(0), 1.0).unwrap();

        assert_eq!(disc.push_interval(&intervals[0], &mut out).unwrap(), 5);
        assert_eq!(disc.push_interval(&intervals[1], &mut out).unwrap(), 0);
        assert_eq!(disc.reservoir(), 0.0);
        assert_eq!(disc.finish(&mut out), 0);

        let stamps: Vec<i64> = out.iter().map(|r| r.created_at.0).collect();
        assert_eq!(stamps, vec![6_000, 18_000, 30_000, 42_000, 54_000]);
        assert!(out.iter().all(|r| r.mass == 1.0));
        assert_eq!(disc.emitted(), 5);
        assert_eq!(disc.emitted_mass(), 5.0);
    }

    #[test]
    fn small_intervals_carry_forward() {
        let mut out = Vec::new();
        let outcome = CurveDiscretizer::discretize(&curve(&[0.4, 0.4, 0.4]), 1.0, &mut out).unwrap();
        assert_eq!(outcome.emitted, 1);
        assert_eq!(out.len(), 1);
        assert!((out[0].mass - 1.2).abs() < 1e-12);
        // Emitted in the third interval, at its centre.
        assert_eq!(out[0].created_at, Timestamp(150_000));
    }

    #[test]
    fn particle_mass_follows_actual_interval_mass() {
        let mut out = Vec::new();
        CurveDiscretizer::discretize(&curve(&[2.5]), 1.0, &mut out).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.mass == 1.25));
    }

    #[test]
    fn tiny_curve_still_emits_one_particle() {
        let mut out = Vec::new();
        let outcome = CurveDiscretizer::discretize(&curve(&[0.001, 0.002]), 10.0, &mut out).unwrap();
        assert_eq!(outcome.emitted, 1);
        assert!((out[0].mass - 0.003).abs() < 1e-15);
        assert_eq!(out[0].created_at, Timestamp(90_000));
    }

    #[test]
    fn float_noise_does_not_lose_a_particle() {
        let mut out = Vec::new();
        // 0.1 * 3 is 0.30000000000000004; 0.3 / 0.1 is 2.9999999999999996.
        CurveDiscretizer::discretize(&curve(&[0.3]), 0.1, &mut out).unwrap();
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn negative_reservoir_halts_the_curve() {
        let intervals = minutes(&[1.0, -3.0, 5.0]);
        let mut out = Vec::new();
        let mut disc = CurveDiscretizer::new(UnitId(4), MaterialId(0), 2.0).unwrap();
        assert_eq!(disc.push_interval(&intervals[0], &mut out).unwrap(), 0);
        let err = disc.push_interval(&intervals[1], &mut out).unwrap_err();
        assert!(matches!(
            err,
            InjectError::NegativeReservoir { unit: UnitId(4), interval: 1, reservoir } if reservoir == -2.0
        ));
        assert!(disc.is_halted());
        assert_eq!(disc.push_interval(&intervals[2], &mut out).unwrap(), 0);
        assert_eq!(disc.finish(&mut out), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn discretize_reports_negative_reservoir_as_warning() {
        let mut out = Vec::new();
        let outcome = CurveDiscretizer::discretize(&curve(&[3.0, -10.0, 4.0]), 1.0, &mut out).unwrap();
        assert_eq!(outcome.emitted, 3);
        assert!(matches!(outcome.warning, Some(InjectError::NegativeReservoir { interval: 1, .. })));
    }

    #[test]
    fn invalid_mass_per_particle_is_rejected() {
        for mpp in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                CurveDiscretizer::new(UnitId(0), MaterialId(0), mpp),
                Err(InjectError::InvalidMassPerParticle(_))
            ));
        }
    }

    #[test]
    fn finish_twice_emits_once() {
        let intervals = minutes(&[0.5]);
        let mut out = Vec::new();
        let mut disc = CurveDiscretizer::new(UnitId(0), MaterialId(0), 1.0).unwrap();
        disc.push_interval(&intervals[0], &mut out).unwrap();
        assert_eq!(disc.finish(&mut out), 1);
        assert_eq!(disc.finish(&mut out), 0);
    }
}

#[cfg(test)]
mod sources {
    use pt_core::{MaterialId, Timestamp, UnitId};

    use super::helpers::{area, measured, minutes};
    use crate::{InjectError, InjectionSource, ReleaseInterval, WashoffArea};

    fn washoff() -> InjectionSource {
        InjectionSource::Washoff {
            material:         MaterialId(1),
            washoff_constant: 0.5,
            areas:            vec![
                // 1 kg deposited; 0.05 m³ → 0.5 mm → 25 %; 1 m³ → 10 mm → capped at 100 %.
                WashoffArea { area: area(0, 100.0, 0.01, "roof"), runoff: minutes(&[0.05, 1.0]) },
                WashoffArea { area: area(1, 200.0, 0.01, "street"), runoff: minutes(&[0.1]) },
            ],
        }
    }

    #[test]
    fn washoff_mass_follows_precipitation_depth() {
        let source = washoff();
        let curves = source.mass_curves(None);
        assert_eq!(curves.len(), 2);
        assert!((curves[0].intervals[0].amount - 0.25).abs() < 1e-12);
        assert!((curves[0].intervals[1].amount - 1.0).abs() < 1e-12);
        // 0.1 m³ on 200 m² → 0.5 mm → 25 % of 2 kg.
        assert!((curves[1].intervals[0].amount - 0.5).abs() < 1e-12);
        assert_eq!(curves[1].material, MaterialId(1));
    }

    #[test]
    fn washoff_filter_skips_whole_area_records() {
        let source = washoff();
        let curves = source.mass_curves(Some("roof"));
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].unit, UnitId(0));
        assert_eq!(source.skipped_areas(Some("roof")), 1);
        assert_eq!(source.skipped_areas(None), 0);
        assert!((source.total_mass(Some("street")) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn network_inflow_scales_volume_by_concentration() {
        let source = InjectionSource::NetworkInflow {
            material:      MaterialId(0),
            unit:          UnitId(3),
            concentration: 0.1,
            intervals:     minutes(&[10.0, 20.0]),
        };
        let amounts: Vec<f64> = source.mass_curves(None)[0].intervals.iter().map(|i| i.amount).collect();
        assert!((amounts[0] - 1.0).abs() < 1e-12);
        assert!((amounts[1] - 2.0).abs() < 1e-12);
        assert_eq!(source.targets(), vec![UnitId(3)]);
    }

    #[test]
    fn areal_and_sub_areal_load() {
        let areas = vec![
            area(0, 10.0, 1.0, "residential"),
            area(1, 20.0, 1.0, "industrial"),
            area(0, 5.0, 1.0, "industrial"),
        ];
        let areal = InjectionSource::ArealLoad {
            material: MaterialId(0),
            start:    Timestamp(0),
            end:      Timestamp(3_600_000),
            areas:    areas.clone(),
        };
        assert_eq!(areal.total_mass(None), 35.0);
        assert_eq!(areal.targets(), vec![UnitId(0), UnitId(1)]);
        assert_eq!(areal.span(), Some((Timestamp(0), Timestamp(3_600_000))));

        let sub = InjectionSource::SubArealLoad {
            material: MaterialId(0),
            subset:   "industrial".into(),
            start:    Timestamp(0),
            end:      Timestamp(3_600_000),
            areas,
        };
        assert_eq!(sub.total_mass(None), 25.0);
        assert_eq!(sub.targets(), vec![UnitId(1), UnitId(0)]);
    }

    #[test]
    fn invalid_areas_contribute_nothing() {
        let source = InjectionSource::ArealLoad {
            material: MaterialId(0),
            start:    Timestamp(0),
            end:      Timestamp(60_000),
            areas:    vec![area(0, 0.0, 1.0, "x"), area(1, 2.0, 1.0, "x")],
        };
        assert_eq!(source.total_mass(None), 2.0);
        assert!(matches!(source.invalid_areas().as_slice(), [InjectError::InvalidArea { unit: UnitId(0), .. }]));
    }

    #[test]
    fn validate_rejects_backwards_intervals() {
        let source = InjectionSource::Measured {
            material:  MaterialId(0),
            unit:      UnitId(2),
            intervals: vec![ReleaseInterval::new(Timestamp(10), Timestamp(5), 1.0)],
        };
        assert!(matches!(
            source.validate(),
            Err(InjectError::InvalidInterval { unit: UnitId(2), interval: 0, .. })
        ));
        assert!(measured(0, &[1.0, f64::NAN]).validate().is_err());
        assert!(measured(0, &[1.0, 2.0]).validate().is_ok());
    }

    #[test]
    fn particle_count_matches_discretization() {
        assert_eq!(measured(0, &[5.0, 0.0]).particle_count(1.0, None).unwrap(), 5);
        assert_eq!(measured(0, &[0.2, 0.2]).particle_count(1.0, None).unwrap(), 1);
    }

    #[test]
    fn particle_count_stops_at_negative_reservoir() {
        let source = measured(0, &[3.0, -5.0, 4.0]);
        assert_eq!(source.particle_count(1.0, None).unwrap(), 3);
        assert_eq!(measured(0, &[-1.0, 2.0]).particle_count(1.0, None).unwrap(), 0);
    }
}

#[cfg(test)]
mod scheduler {
    use pt_core::{ParticleId, ScenarioConfig, Timestamp, UnitId};

    use super::helpers::measured;
    use crate::{InjectError, InjectionScheduler};

    #[test]
    fn concrete_scenario() {
        let report = InjectionScheduler::new(5).schedule(&[measured(0, &[5.0, 0.0])]).unwrap();
        assert_eq!(report.mass_per_particle, 1.0);
        assert_eq!(report.len(), 5);
        assert!(report.records.iter().all(|r| r.created_at < Timestamp(60_000)));
        assert_eq!(report.emitted_mass, 5.0);
        assert_eq!(report.relative_mass_error(), 0.0);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn records_are_ordered_with_dense_ids() {
        let sources = [measured(1, &[2.0, 2.0]), measured(0, &[2.0, 0.0, 2.0])];
        let report = InjectionScheduler::new(8).schedule(&sources).unwrap();
        assert_eq!(report.len(), 8);
        for pair in report.records.windows(2) {
            assert!(pair[0].order_key() <= pair[1].order_key());
        }
        let ids: Vec<ParticleId> = report.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, (0..8).map(ParticleId).collect::<Vec<_>>());
        // Same instant in both units: unit 0 first.
        assert_eq!(report.records[0].unit, UnitId(0));
        assert_eq!(report.records[1].unit, UnitId(1));
    }

    #[test]
    fn released_between_slices_the_schedule() {
        let report = InjectionScheduler::new(4).schedule(&[measured(0, &[2.0, 2.0])]).unwrap();
        assert_eq!(report.released_between(Timestamp(0), Timestamp(60_000)).len(), 2);
        assert_eq!(report.released_between(Timestamp(60_000), Timestamp(120_000)).len(), 2);
        assert!(report.released_between(Timestamp(120_000), Timestamp(0)).is_empty());
    }

    #[test]
    fn zero_budget_is_an_error() {
        assert!(matches!(
            InjectionScheduler::new(0).schedule(&[measured(0, &[1.0])]),
            Err(InjectError::ZeroBudget)
        ));
    }

    #[test]
    fn no_mass_gives_empty_schedule() {
        let report = InjectionScheduler::new(10).schedule(&[measured(0, &[0.0, 0.0])]).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.total_mass, 0.0);
        assert!(InjectionScheduler::new(10).schedule(&[]).unwrap().is_empty());
    }

    #[test]
    fn negative_only_curve_still_warns() {
        let report = InjectionScheduler::new(4).schedule(&[measured(0, &[-1.0])]).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.warnings.len(), 1);
        assert!(matches!(
            report.warnings[0],
            InjectError::NegativeReservoir { unit: UnitId(0), interval: 0, .. }
        ));
    }

    #[test]
    fn negative_reservoir_skips_only_that_unit() {
        let sources = [measured(0, &[1.0, -5.0, 1.0]), measured(1, &[4.0])];
        let report = InjectionScheduler::new(5).schedule(&sources).unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert!(matches!(report.warnings[0], InjectError::NegativeReservoir { unit: UnitId(0), .. }));
        assert!(report.records.iter().any(|r| r.unit == UnitId(1)));
    }

    #[test]
    fn config_supplies_budget_and_filter() {
        let config = ScenarioConfig {
            particle_budget: 42,
            washoff_filter:  Some("roof".into()),
            ..ScenarioConfig::default()
        };
        let scheduler = InjectionScheduler::from_config(&config);
        assert_eq!(scheduler.budget(), 42);
    }
}

#[cfg(test)]
mod properties {
    use proptest::prelude::*;

    use super::helpers::{curve, measured};
    use crate::{CurveDiscretizer, InjectionScheduler, InjectionSource};

    proptest! {
        #[test]
        fn schedule_conserves_mass(
            curves in prop::collection::vec(prop::collection::vec(0.0f64..100.0, 1..12), 1..5),
            budget in 1u64..400,
        ) {
            let sources: Vec<InjectionSource> = curves
                .iter()
                .enumerate()
                .map(|(u, amounts)| measured(u as u32, amounts))
                .collect();
            let report = InjectionScheduler::new(budget).schedule(&sources).unwrap();
            let emitted: f64 = report.records.iter().map(|r| r.mass).sum();
            if report.total_mass > 0.0 {
                prop_assert!(((emitted - report.total_mass) / report.total_mass).abs() < 1e-6);
            } else {
                prop_assert!(report.is_empty());
            }
        }

        #[test]
        fn oversized_particles_give_one_remainder(
            amounts in prop::collection::vec(0.001f64..1.0, 1..10),
        ) {
            let total: f64 = amounts.iter().sum();
            let mut out = Vec::new();
            CurveDiscretizer::discretize(&curve(&amounts), total * 2.0, &mut out).unwrap();
            prop_assert_eq!(out.len(), 1);
            prop_assert!((out[0].mass - total).abs() <= total * 1e-9);
        }

        #[test]
        fn records_stay_inside_their_interval(amounts in prop::collection::vec(0.0f64..50.0, 1..8)) {
            let c = curve(&amounts);
            let mut out = Vec::new();
            CurveDiscretizer::discretize(&c, 1.0, &mut out).unwrap();
            let (start, end) = c.span().unwrap();
            for r in &out {
                prop_assert!(r.created_at >= start && r.created_at <= end);
                prop_assert!(r.mass > 0.0);
            }
        }
    }
}
