//! The hydraulic quantities a [`TimedArrayStore`](crate::TimedArrayStore)
//! can hold.
//!
//! All variants are always compiled in.  A store only allocates arrays for
//! the quantities the solver actually supplied (or that were marked
//! required), so an unused quantity costs nothing.

/// One time-varying, per-unit hydraulic quantity.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Quantity {
    /// Water level above the unit invert [m].
    WaterLevel,
    /// Mean flow velocity [m/s].
    Velocity,
    /// Discharge [m³/s].
    Discharge,
    /// Lateral inflow volume during the interval [m³].
    InflowVolume,
    /// Water volume held by the unit [m³].  Divisor for concentrations.
    Volume,
    /// Reference pollutant mass flux from the solver, if any [kg/s].
    ReferenceMassFlux,
    /// Reference pollutant concentration from the solver, if any [kg/m³].
    ReferenceConcentration,
}

impl Quantity {
    pub const COUNT: usize = 7;

    pub const ALL: [Quantity; Quantity::COUNT] = [
        Quantity::WaterLevel,
        Quantity::Velocity,
        Quantity::Discharge,
        Quantity::InflowVolume,
        Quantity::Volume,
        Quantity::ReferenceMassFlux,
        Quantity::ReferenceConcentration,
    ];

    /// Position in the store's fixed slot array.
    #[inline(always)]
    pub(crate) fn slot(self) -> usize {
        self as usize
    }

    /// Column-style label, used in log messages and output files.
    pub fn as_str(self) -> &'static str {
        match self {
            Quantity::WaterLevel             => "water_level",
            Quantity::Velocity               => "velocity",
            Quantity::Discharge              => "discharge",
            Quantity::InflowVolume           => "inflow_volume",
            Quantity::Volume                 => "volume",
            Quantity::ReferenceMassFlux      => "reference_mass_flux",
            Quantity::ReferenceConcentration => "reference_concentration",
        }
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
