//! Injection sources: every way pollutant mass can enter the network.
//!
//! All variants reduce to [`MassCurve`]s, which the scheduler hands to the
//! same discretizer.

use pt_core::{MaterialId, Timestamp, UnitId};

use crate::curve::{MassCurve, ReleaseInterval, check_intervals};
use crate::discretize::CurveDiscretizer;
use crate::error::{InjectError, InjectResult};

// ── Area records ──────────────────────────────────────────────────────────────

/// A pollutant-bearing surface draining into one unit.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AreaRecord {
    pub unit:    UnitId,
    /// Contributing area [m²].
    pub area_m2: f64,
    /// Deposited load [kg/m²].
    pub load:    f64,
    /// Land-use or washoff parameter label used by the filters.
    pub label:   String,
}

impl AreaRecord {
    /// Full deposited mass [kg].
    #[inline]
    pub fn mass(&self) -> f64 {
        self.area_m2 * self.load
    }

    #[inline]
    fn has_valid_area(&self) -> bool {
        self.area_m2.is_finite() && self.area_m2 > 0.0
    }
}

/// An area together with the rain volume falling on it per interval [m³].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WashoffArea {
    pub area:   AreaRecord,
    pub runoff: Vec<ReleaseInterval>,
}

impl WashoffArea {
    /// Mass washed off in one runoff interval.
    ///
    /// `depth_mm = volume / area * 1000`, `fraction = min(1, depth_mm * k)`,
    /// `mass = area * load * fraction`.
    pub fn washed_mass(&self, volume_m3: f64, washoff_constant: f64) -> f64 {
        if !self.area.has_valid_area() {
            return 0.0;
        }
        let depth_mm = volume_m3 / self.area.area_m2 * 1000.0;
        let fraction = (depth_mm * washoff_constant).min(1.0);
        self.area.mass() * fraction
    }
}

// ── InjectionSource ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InjectionSource {
    /// Measured pollutant mass [kg] entering `unit` per interval.
    Measured {
        material:  MaterialId,
        unit:      UnitId,
        intervals: Vec<ReleaseInterval>,
    },

    /// Inflow volume [m³] per interval at a fixed concentration [kg/m³].
    NetworkInflow {
        material:      MaterialId,
        unit:          UnitId,
        concentration: f64,
        intervals:     Vec<ReleaseInterval>,
    },

    /// Every area releases its whole load uniformly over `[start, end]`.
    ArealLoad {
        material: MaterialId,
        start:    Timestamp,
        end:      Timestamp,
        areas:    Vec<AreaRecord>,
    },

    /// Like `ArealLoad`, restricted to areas whose label equals `subset`.
    SubArealLoad {
        material: MaterialId,
        subset:   String,
        start:    Timestamp,
        end:      Timestamp,
        areas:    Vec<AreaRecord>,
    },

    /// Rain-driven washoff from surfaces.
    Washoff {
        material:         MaterialId,
        /// Washoff coefficient `k` [1/mm].
        washoff_constant: f64,
        areas:            Vec<WashoffArea>,
    },
}

impl InjectionSource {
    pub fn material(&self) -> MaterialId {
        match self {
            InjectionSource::Measured { material, .. }
            | InjectionSource::NetworkInflow { material, .. }
            | InjectionSource::ArealLoad { material, .. }
            | InjectionSource::SubArealLoad { material, .. }
            | InjectionSource::Washoff { material, .. } => *material,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            InjectionSource::Measured { .. }      => "measured",
            InjectionSource::NetworkInflow { .. } => "network_inflow",
            InjectionSource::ArealLoad { .. }     => "areal_load",
            InjectionSource::SubArealLoad { .. }  => "sub_areal_load",
            InjectionSource::Washoff { .. }       => "washoff",
        }
    }

    /// Units receiving mass from this source, deduplicated, in first-seen
    /// order.
    pub fn targets(&self) -> Vec<UnitId> {
        let mut units: Vec<UnitId> = match self {
            InjectionSource::Measured { unit, .. }
            | InjectionSource::NetworkInflow { unit, .. } => vec![*unit],
            InjectionSource::ArealLoad { areas, .. } => areas.iter().map(|a| a.unit).collect(),
            InjectionSource::SubArealLoad { subset, areas, .. } => areas
                .iter()
                .filter(|a| a.label == *subset)
                .map(|a| a.unit)
                .collect(),
            InjectionSource::Washoff { areas, .. } => areas.iter().map(|a| a.area.unit).collect(),
        };
        let mut seen = Vec::with_capacity(units.len());
        units.retain(|u| {
            if seen.contains(u) {
                false
            } else {
                seen.push(*u);
                true
            }
        });
        units
    }

    /// Reject malformed intervals.  Called by the scheduler before anything
    /// is discretized.
    pub fn validate(&self) -> InjectResult<()> {
        match self {
            InjectionSource::Measured { unit, intervals, .. } => check_intervals(*unit, intervals),
            InjectionSource::NetworkInflow { unit, concentration, intervals, .. } => {
                if !concentration.is_finite() {
                    return Err(InjectError::InvalidInterval {
                        unit:     *unit,
                        interval: 0,
                        reason:   format!("non-finite concentration {concentration}"),
                    });
                }
                check_intervals(*unit, intervals)
            }
            InjectionSource::ArealLoad { start, end, areas, .. }
            | InjectionSource::SubArealLoad { start, end, areas, .. } => {
                for area in areas {
                    ReleaseInterval::new(*start, *end, area.mass()).check(area.unit, 0)?;
                }
                Ok(())
            }
            InjectionSource::Washoff { areas, .. } => {
                areas.iter().try_for_each(|a| check_intervals(a.area.unit, &a.runoff))
            }
        }
    }

    /// Washoff areas excluded by `washoff_filter`.  Other variants never
    /// skip anything.
    pub fn skipped_areas(&self, washoff_filter: Option<&str>) -> usize {
        match (self, washoff_filter) {
            (InjectionSource::Washoff { areas, .. }, Some(label)) => {
                areas.iter().filter(|a| a.area.label != label).count()
            }
            _ => 0,
        }
    }

    /// Area records with an unusable area, reported by the scheduler.
    pub fn invalid_areas(&self) -> Vec<InjectError> {
        let invalid = |a: &AreaRecord| {
            (!a.has_valid_area()).then(|| InjectError::InvalidArea { unit: a.unit, area: a.area_m2 })
        };
        match self {
            InjectionSource::ArealLoad { areas, .. } | InjectionSource::SubArealLoad { areas, .. } => {
                areas.iter().filter_map(invalid).collect()
            }
            InjectionSource::Washoff { areas, .. } => {
                areas.iter().filter_map(|a| invalid(&a.area)).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Per-interval mass curves of this source.
    ///
    /// The washoff filter is evaluated once per area record: an area whose
    /// label differs from it contributes no curve at all.
    pub fn mass_curves(&self, washoff_filter: Option<&str>) -> Vec<MassCurve> {
        let material = self.material();
        match self {
            InjectionSource::Measured { unit, intervals, .. } => {
                vec![MassCurve::new(*unit, material, intervals.clone())]
            }
            InjectionSource::NetworkInflow { unit, concentration, intervals, .. } => {
                let intervals = intervals
                    .iter()
                    .map(|iv| ReleaseInterval { amount: iv.amount * concentration, ..*iv })
                    .collect();
                vec![MassCurve::new(*unit, material, intervals)]
            }
            InjectionSource::ArealLoad { start, end, areas, .. } => {
                areal_curves(material, *start, *end, areas.iter())
            }
            InjectionSource::SubArealLoad { subset, start, end, areas, .. } => {
                areal_curves(material, *start, *end, areas.iter().filter(|a| a.label == *subset))
            }
            InjectionSource::Washoff { washoff_constant, areas, .. } => areas
                .iter()
                .filter(|a| washoff_filter.is_none_or(|label| a.area.label == label))
                .filter(|a| a.area.has_valid_area())
                .map(|a| {
                    let intervals = a
                        .runoff
                        .iter()
                        .map(|iv| ReleaseInterval {
                            amount: a.washed_mass(iv.amount, *washoff_constant),
                            ..*iv
                        })
                        .collect();
                    MassCurve::new(a.area.unit, material, intervals)
                })
                .collect(),
        }
    }

    /// Total mass [kg] this source releases.
    pub fn total_mass(&self, washoff_filter: Option<&str>) -> f64 {
        self.mass_curves(washoff_filter).iter().map(MassCurve::total).sum()
    }

    /// Earliest start and latest end over all curves.
    pub fn span(&self) -> Option<(Timestamp, Timestamp)> {
        self.mass_curves(None)
            .iter()
            .filter_map(MassCurve::span)
            .reduce(|(s0, e0), (s1, e1)| (s0.min(s1), e0.max(e1)))
    }

    /// Number of particles the discretizer emits for this source at
    /// `mass_per_particle`.
    pub fn particle_count(&self, mass_per_particle: f64, washoff_filter: Option<&str>) -> InjectResult<usize> {
        let mut count = 0;
        let mut scratch = Vec::new();
        for curve in self.mass_curves(washoff_filter) {
            scratch.clear();
            // A negative reservoir only truncates the curve.
            count += CurveDiscretizer::discretize(&curve, mass_per_particle, &mut scratch)?.emitted;
        }
        Ok(count)
    }
}

fn areal_curves<'a>(
    material: MaterialId,
    start:    Timestamp,
    end:      Timestamp,
    areas:    impl Iterator<Item = &'a AreaRecord>,
) -> Vec<MassCurve> {
    areas
        .filter(|a| a.has_valid_area())
        .map(|a| MassCurve::new(a.unit, material, vec![ReleaseInterval::new(start, end, a.mass())]))
        .collect()
}
