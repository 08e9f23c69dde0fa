//! Chemical species definitions.

/// Bulk chemical species relevant for cabin-atmosphere and life-support
/// fluid networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    /// Oxygen (O₂)
    O2,
    /// Nitrogen (N₂)
    N2,
    /// Carbon dioxide (CO₂)
    CO2,
    /// Water vapor (H₂O)
    H2O,
    /// Argon (Ar)
    Ar,
    /// Helium (He)
    He,
    /// Hydrogen (H₂)
    H2,
    /// Methane (CH₄)
    CH4,
}

impl Species {
    pub const ALL: [Species; 8] = [
        Species::O2,
        Species::N2,
        Species::CO2,
        Species::H2O,
        Species::Ar,
        Species::He,
        Species::H2,
        Species::CH4,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Species::O2 => "O2",
            Species::N2 => "N2",
            Species::CO2 => "CO2",
            Species::H2O => "H2O",
            Species::Ar => "Ar",
            Species::He => "He",
            Species::H2 => "H2",
            Species::CH4 => "CH4",
        }
    }

    /// Get human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Species::O2 => "Oxygen",
            Species::N2 => "Nitrogen",
            Species::CO2 => "Carbon Dioxide",
            Species::H2O => "Water Vapor",
            Species::Ar => "Argon",
            Species::He => "Helium",
            Species::H2 => "Hydrogen",
            Species::CH4 => "Methane",
        }
    }

    /// Get molar mass [kg/kmol] for this species.
    ///
    /// Values sourced from standard reference data (e.g., NIST).
    pub fn molar_mass(&self) -> f64 {
        match self {
            Species::O2 => 31.999,
            Species::N2 => 28.014,
            Species::CO2 => 44.010,
            Species::H2O => 18.015,
            Species::Ar => 39.948,
            Species::He => 4.003,
            Species::H2 => 2.016,
            Species::CH4 => 16.043,
        }
    }

    /// Specific heat at constant pressure [J/(kg·K)], near 300 K.
    ///
    /// Frozen per-species values; mixture cp is mass-fraction weighted.
    pub fn cp(&self) -> f64 {
        match self {
            Species::O2 => 918.0,
            Species::N2 => 1040.0,
            Species::CO2 => 846.0,
            Species::H2O => 1864.0,
            Species::Ar => 520.3,
            Species::He => 5193.0,
            Species::H2 => 14_300.0,
            Species::CH4 => 2220.0,
        }
    }
}

impl std::str::FromStr for Species {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "O2" | "OXYGEN" => Ok(Species::O2),
            "N2" | "NITROGEN" => Ok(Species::N2),
            "CO2" | "CARBONDIOXIDE" | "CARBON DIOXIDE" => Ok(Species::CO2),
            "H2O" | "WATER" | "WATER VAPOR" => Ok(Species::H2O),
            "AR" | "ARGON" => Ok(Species::Ar),
            "HE" | "HELIUM" => Ok(Species::He),
            "H2" | "HYDROGEN" => Ok(Species::H2),
            "CH4" | "METHANE" => Ok(Species::CH4),
            _ => Err("unknown species"),
        }
    }
}

/// Trace compounds: tracked species whose amounts are assumed not to
/// affect bulk thermodynamic state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceCompound {
    /// Carbon monoxide (CO)
    CO,
    /// Ammonia (NH₃)
    NH3,
    /// Ozone (O₃)
    O3,
}

impl TraceCompound {
    pub const ALL: [TraceCompound; 3] =
        [TraceCompound::CO, TraceCompound::NH3, TraceCompound::O3];

    pub fn key(&self) -> &'static str {
        match self {
            TraceCompound::CO => "CO",
            TraceCompound::NH3 => "NH3",
            TraceCompound::O3 => "O3",
        }
    }

    /// Get molar mass [kg/kmol] for this compound.
    pub fn molar_mass(&self) -> f64 {
        match self {
            TraceCompound::CO => 28.010,
            TraceCompound::NH3 => 17.031,
            TraceCompound::O3 => 47.998,
        }
    }
}
